//! recite core library: domain types, run configuration, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`ConfigError`]
//! - [`config`]: YAML run config load / validate

pub mod config;
pub mod error;
pub mod types;

pub use config::RunConfig;
pub use error::ConfigError;
pub use types::{
    AudioEncoding, ContainerId, Fingerprint, SheetRange, SsmlGender, SynthesisRequest,
    SynthesisSettings, VoiceParams,
};
