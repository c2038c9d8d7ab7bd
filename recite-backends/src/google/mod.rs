//! Google Workspace / Cloud REST clients.
//!
//! All three share one blocking `ureq` agent and one [`TokenSource`]; the
//! token is resolved per request, so constructing a client never fails.

pub mod drive;
pub mod sheets;
pub mod tts;

pub use drive::GoogleDrive;
pub use sheets::GoogleSheets;
pub use tts::GoogleTts;

pub use crate::http::TokenSource;
