//! Collaborator seams: the three external services a run talks to.
//!
//! Implementations live in `recite-backends`; tests use recording fakes.
//! All methods take `&self` so one value can implement several traits and
//! keep a single ordered call log.

use recite_core::types::{ContainerId, SheetRange, SynthesisRequest};

use crate::error::BackendError;

/// A spreadsheet-like store addressed by whole-column ranges.
pub trait TabularStore {
    /// First-column values of `range`, top to bottom.
    ///
    /// An empty range is `Ok(vec![])`, not an error. Empty cells inside the
    /// range come back as `""`.
    fn read(&self, range: &SheetRange) -> Result<Vec<String>, BackendError>;

    /// Overwrite cells of `range` positionally from its start cell, column
    /// orientation, raw values. Returns the number of cells updated.
    fn write(&self, range: &SheetRange, values: &[String]) -> Result<usize, BackendError>;
}

/// Text-to-speech.
pub trait SpeechSynthesizer {
    /// Encoded audio for `request.text`.
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError>;
}

/// Folder-and-object storage for audio artifacts.
pub trait BlobStore {
    /// Create an output container named `name`.
    fn create_container(&self, name: &str) -> Result<ContainerId, BackendError>;

    /// Store `bytes` as `object_name` inside `container`.
    fn upload(
        &self,
        container: &ContainerId,
        object_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<(), BackendError>;
}
