use async_trait::async_trait;
use cdi_protocol::ProcessingResult;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ClientError, EngineError};
use crate::normalize::{normalize, NormalizedResponse};

/// The external chart-evaluation engine.
///
/// Handed in by the caller; this crate holds no engine of its own.
#[async_trait]
pub trait EvaluationEngine: Send + Sync {
    async fn process_chart(&self, chart: &Path) -> Result<ProcessingResult, EngineError>;

    /// Evaluate several charts as one combined result.
    async fn process_charts(&self, charts: &[PathBuf]) -> Result<ProcessingResult, EngineError>;
}

/// Uploaded chart bytes parked in a temporary file for the engine to read.
///
/// The file is removed when the upload is dropped.
pub struct ChartUpload {
    display_name: String,
    file: NamedTempFile,
}

impl ChartUpload {
    pub fn create(file_name: &str, bytes: &[u8]) -> Result<Self, ClientError> {
        if bytes.is_empty() {
            return Err(ClientError::InvalidUpload(format!("{file_name} is empty")));
        }

        let name = Path::new(file_name);
        let suffix = name
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("cdi-chart-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        let display_name = name
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| file_name.to_string());

        Ok(Self { display_name, file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Evaluate one uploaded chart and normalize the engine's answer.
pub async fn evaluate_upload(
    engine: &dyn EvaluationEngine,
    file_name: &str,
    bytes: &[u8],
) -> Result<NormalizedResponse, ClientError> {
    let upload = ChartUpload::create(file_name, bytes)?;
    let display_name = upload.display_name().to_string();
    let outcome = engine.process_chart(upload.path()).await;
    drop(upload);

    finish(outcome, &display_name)
}

/// Evaluate a batch of uploads as one combined engine run.
pub async fn evaluate_uploads(
    engine: &dyn EvaluationEngine,
    uploads: &[(String, Vec<u8>)],
) -> Result<NormalizedResponse, ClientError> {
    if uploads.is_empty() {
        return Err(ClientError::InvalidUpload("no charts uploaded".to_string()));
    }

    let mut staged = Vec::with_capacity(uploads.len());
    for (file_name, bytes) in uploads {
        staged.push(ChartUpload::create(file_name, bytes)?);
    }
    let display_name = match staged.as_slice() {
        [single] => single.display_name().to_string(),
        many => format!("{} charts", many.len()),
    };
    let paths: Vec<PathBuf> = staged.iter().map(|u| u.path().to_path_buf()).collect();
    let outcome = engine.process_charts(&paths).await;
    drop(staged);

    finish(outcome, &display_name)
}

fn finish(
    outcome: Result<ProcessingResult, EngineError>,
    display_name: &str,
) -> Result<NormalizedResponse, ClientError> {
    let result = outcome.map_err(|err| {
        log::warn!("Evaluation engine failed for {display_name}: {err}");
        ClientError::Upstream {
            message: err.to_string(),
        }
    })?;
    if let Some(message) = &result.error {
        log::warn!("Evaluation engine reported an error for {display_name}: {message}");
        return Err(ClientError::Upstream {
            message: message.clone(),
        });
    }
    Ok(normalize(&result, display_name))
}
