use std::env;
use std::path::PathBuf;

pub const CORPUS_ROOT_ENV: &str = "CDI_CORPUS_ROOT";
pub const OUTPUT_DIR_ENV: &str = "CDI_OUTPUT_DIR";

/// Flag value, then `CDI_CORPUS_ROOT`, then the working directory.
pub(crate) fn corpus_root(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env_path(CORPUS_ROOT_ENV))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Directory for artifacts written under a default timestamped name.
pub(crate) fn output_dir() -> PathBuf {
    env_path(OUTPUT_DIR_ENV).unwrap_or_else(|| PathBuf::from("."))
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
