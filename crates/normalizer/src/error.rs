use cdi_protocol::ErrorEnvelope;
use thiserror::Error;

/// Failure reported by the external evaluation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Error surfaced to the display client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Evaluation failed: {message}")]
    Upstream { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::InvalidUpload(_) => "invalid_upload",
            ClientError::Upstream { .. } => "upstream_error",
            ClientError::IoError(_) => "internal",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let envelope = ErrorEnvelope::new(self.code(), self.to_string());
        match self {
            ClientError::InvalidUpload(_) => envelope.with_hint("upload a non-empty chart file"),
            _ => envelope,
        }
    }
}
