//! # recite-sync
//!
//! Change detection and run orchestration.
//!
//! Call [`run`] with a [`RunPlan`] and the run's [`Collaborators`]: rows whose
//! [`fingerprint`] differs from the aligned history are synthesized and
//! uploaded, then the new fingerprints are written back once.

pub mod align;
pub mod backend;
pub mod clock;
pub mod decision;
pub mod error;
pub mod fingerprint;
pub mod persist;
pub mod pipeline;

pub use backend::{BlobStore, SpeechSynthesizer, TabularStore};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{BackendError, PipelineError};
pub use fingerprint::fingerprint;
pub use pipeline::{run, Collaborators, RowOutcome, RunOptions, RunPlan, RunReport};
