//! recite-backends: concrete collaborators for the run pipeline.
//!
//! - [`google`]: Sheets v4, Cloud Text-to-Speech v1, Drive v3 over `ureq`.
//! - [`local`]: JSON workbook and directory storage for offline runs.
//!
//! [`Backends::from_config`] wires the configured pair of stores together
//! with the speech client.

mod http;

pub mod google;
pub mod local;

use std::time::Duration;

use recite_core::config::{BackendConfig, StorageBackend, TabularBackend};
use recite_sync::{BlobStore, Clock, Collaborators, SpeechSynthesizer, TabularStore};

use google::{GoogleDrive, GoogleSheets, GoogleTts, TokenSource};
use local::{LocalFolderStore, LocalWorkbook};

/// Owned collaborator set for one process.
pub struct Backends {
    pub store: Box<dyn TabularStore>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
    pub storage: Box<dyn BlobStore>,
}

impl Backends {
    /// Build the configured backends. Nothing touches the network or the
    /// filesystem until the first call.
    pub fn from_config(config: &BackendConfig) -> Self {
        let agent = http::build_agent(Duration::from_secs(config.google.timeout_secs));
        let token = TokenSource::Env(config.google.access_token_env.clone());

        let store: Box<dyn TabularStore> = match &config.tabular {
            TabularBackend::Google => Box::new(GoogleSheets::new(agent.clone(), token.clone())),
            TabularBackend::Local { path } => Box::new(LocalWorkbook::new(path.clone())),
        };
        let storage: Box<dyn BlobStore> = match &config.storage {
            StorageBackend::GoogleDrive { parent_folder_id } => Box::new(GoogleDrive::new(
                agent.clone(),
                token.clone(),
                parent_folder_id.clone(),
            )),
            StorageBackend::Local { dir } => Box::new(LocalFolderStore::new(dir.clone())),
        };
        tracing::debug!(
            "backends: tabular={}, storage={}",
            backend_label(&config.tabular),
            storage_label(&config.storage)
        );

        Self {
            store,
            synthesizer: Box::new(GoogleTts::new(agent, token)),
            storage,
        }
    }

    pub fn collaborators<'a>(&'a self, clock: &'a dyn Clock) -> Collaborators<'a> {
        Collaborators {
            store: self.store.as_ref(),
            synthesizer: self.synthesizer.as_ref(),
            storage: self.storage.as_ref(),
            clock,
        }
    }
}

fn backend_label(backend: &TabularBackend) -> &'static str {
    match backend {
        TabularBackend::Google => "google-sheets",
        TabularBackend::Local { .. } => "local-workbook",
    }
}

fn storage_label(backend: &StorageBackend) -> &'static str {
    match backend {
        StorageBackend::GoogleDrive { .. } => "google-drive",
        StorageBackend::Local { .. } => "local-folder",
    }
}
