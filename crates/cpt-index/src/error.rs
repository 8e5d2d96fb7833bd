use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CptIndexError>;

#[derive(Error, Debug)]
pub enum CptIndexError {
    #[error("No target CPT codes supplied")]
    NoTargets,

    #[error("No procedure shard directories found under {}", .0.display())]
    NoShards(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    CsvError(#[from] csv::Error),
}
