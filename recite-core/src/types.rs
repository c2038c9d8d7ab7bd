//! Domain types shared by the recite pipeline and its backends.
//!
//! Everything here is plain data: serializable via serde + serde_yaml, no I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Content fingerprint of a single row, as persisted in the history column.
///
/// Computed fingerprints are always 8 lowercase hex digits. Values read back
/// from a history column are taken verbatim, and the empty string marks a
/// slot with no recorded fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    /// The empty slot value.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Backend identifier of a created output container (Drive folder id,
/// local directory path, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Sheet ranges
// ---------------------------------------------------------------------------

/// A single spreadsheet column, read from `start_cell` down to the last row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRange {
    pub sheet_id: String,
    pub tab: String,
    /// A1-style start cell, e.g. `A1` or `AA3`.
    pub start_cell: String,
}

impl SheetRange {
    pub fn new(
        sheet_id: impl Into<String>,
        tab: impl Into<String>,
        start_cell: impl Into<String>,
    ) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            tab: tab.into(),
            start_cell: start_cell.into(),
        }
    }

    /// Column letters of the start cell (`"AA"` for `"AA3"`).
    pub fn column(&self) -> &str {
        split_cell(&self.start_cell).map_or("", |(col, _)| col)
    }

    /// 1-based row of the start cell, `None` when the cell is malformed.
    pub fn start_row(&self) -> Option<u32> {
        split_cell(&self.start_cell).map(|(_, row)| row)
    }

    /// Whole-column A1 notation: `Sheet1!A1:A`.
    pub fn a1_notation(&self) -> String {
        format!("{}!{}:{}", self.tab, self.start_cell, self.column())
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.a1_notation())
    }
}

/// Split an A1 cell into uppercase-letter column and 1-based row.
fn split_cell(cell: &str) -> Option<(&str, u32)> {
    let split = cell
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(cell.len());
    let (col, row) = cell.split_at(split);
    if col.is_empty() || row.is_empty() || !row.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match row.parse::<u32>() {
        Ok(n) if n > 0 => Some((col, n)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Voice / audio
// ---------------------------------------------------------------------------

/// SSML voice gender, serialized with the Cloud Text-to-Speech enum names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SsmlGender {
    #[serde(rename = "SSML_VOICE_GENDER_UNSPECIFIED")]
    Unspecified,
    #[default]
    #[serde(rename = "MALE")]
    Male,
    #[serde(rename = "FEMALE")]
    Female,
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

/// Voice selection passed through to the synthesizer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceParams {
    pub language_code: String,
    pub name: String,
    #[serde(default)]
    pub ssml_gender: SsmlGender,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            language_code: "ja-JP".to_string(),
            name: "ja-JP-Wavenet-C".to_string(),
            ssml_gender: SsmlGender::Male,
        }
    }
}

/// Output audio encoding. Determines artifact extension and MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    OggOpus,
    Linear16,
}

impl AudioEncoding {
    pub fn extension(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::OggOpus => "ogg",
            AudioEncoding::Linear16 => "wav",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mp3",
            AudioEncoding::OggOpus => "audio/ogg",
            AudioEncoding::Linear16 => "audio/wav",
        }
    }

    /// Content-addressed artifact name: `{fingerprint}.{ext}`.
    pub fn artifact_name(self, fingerprint: &Fingerprint) -> String {
        format!("{}.{}", fingerprint, self.extension())
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioEncoding::Mp3 => write!(f, "MP3"),
            AudioEncoding::OggOpus => write!(f, "OGG_OPUS"),
            AudioEncoding::Linear16 => write!(f, "LINEAR16"),
        }
    }
}

/// Fixed voice + encoding settings for a run; each row only supplies text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SynthesisSettings {
    #[serde(default)]
    pub voice: VoiceParams,
    #[serde(default)]
    pub encoding: AudioEncoding,
}

impl SynthesisSettings {
    /// Build the request for one row.
    pub fn request(&self, text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice: self.voice.clone(),
            encoding: self.encoding,
        }
    }
}

/// A single text-to-speech call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceParams,
    pub encoding: AudioEncoding,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
