//! Error types for recite-sync.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by an external collaborator (sheet, synthesizer, storage).
#[derive(Debug, Error)]
pub enum BackendError {
    /// Target sheet, range, or folder does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials missing, expired, or lacking permission.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network failure, timeout, throttling, or a 5xx from the service.
    #[error("transient I/O failure: {0}")]
    TransientIo(String),

    /// The service answered with a non-retryable error status.
    #[error("request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The service answered, but not with anything we can use.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Local filesystem failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`BackendError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BackendError {
    BackendError::Io {
        path: path.into(),
        source,
    }
}

/// Every way a run can stop. All of them are fatal: the row loop ends and
/// fingerprints are not persisted.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source rows or fingerprint history could not be read.
    #[error("failed to read {range} from sheet {sheet_id}: {source}")]
    Read {
        sheet_id: String,
        range: String,
        #[source]
        source: BackendError,
    },

    /// The synthesizer failed for a row (`row` is 0-based; messages are 1-based).
    #[error("speech synthesis failed for row {}: {source}", .row + 1)]
    Synthesis {
        row: usize,
        #[source]
        source: BackendError,
    },

    /// The run destination folder could not be created.
    #[error("failed to create output folder {name}: {source}")]
    Destination {
        name: String,
        #[source]
        source: BackendError,
    },

    /// An artifact upload failed.
    #[error("failed to upload {object} for row {}: {source}", .row + 1)]
    Upload {
        row: usize,
        object: String,
        #[source]
        source: BackendError,
    },

    /// The final fingerprint write failed.
    #[error("failed to write fingerprints to {range} in sheet {sheet_id}: {source}")]
    Persist {
        sheet_id: String,
        range: String,
        #[source]
        source: BackendError,
    },
}

impl PipelineError {
    /// Short operation label for reporting.
    pub fn operation(&self) -> &'static str {
        match self {
            PipelineError::Read { .. } => "read",
            PipelineError::Synthesis { .. } => "synthesize",
            PipelineError::Destination { .. } => "create-folder",
            PipelineError::Upload { .. } => "upload",
            PipelineError::Persist { .. } => "persist",
        }
    }

    /// The collaborator failure underneath.
    pub fn backend(&self) -> &BackendError {
        match self {
            PipelineError::Read { source, .. }
            | PipelineError::Synthesis { source, .. }
            | PipelineError::Destination { source, .. }
            | PipelineError::Upload { source, .. }
            | PipelineError::Persist { source, .. } => source,
        }
    }
}
