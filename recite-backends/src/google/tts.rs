//! Cloud Text-to-Speech v1 `text:synthesize`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use recite_core::types::{AudioEncoding, SsmlGender, SynthesisRequest};
use recite_sync::{BackendError, SpeechSynthesizer};

use crate::http::{decode_json, from_ureq, TokenSource};

const TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

pub struct GoogleTts {
    agent: ureq::Agent,
    token: TokenSource,
    endpoint: String,
}

impl GoogleTts {
    pub fn new(agent: ureq::Agent, token: TokenSource) -> Self {
        Self {
            agent,
            token,
            endpoint: TTS_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: Input<'a>,
    voice: Voice<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct Input<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Voice<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: SsmlGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

fn synthesize_body(request: &SynthesisRequest) -> SynthesizeBody<'_> {
    SynthesizeBody {
        input: Input {
            text: &request.text,
        },
        voice: Voice {
            language_code: &request.voice.language_code,
            name: &request.voice.name,
            ssml_gender: request.voice.ssml_gender,
        },
        audio_config: AudioConfig {
            audio_encoding: request.encoding,
        },
    }
}

fn decode_audio(response: SynthesizeResponse) -> Result<Vec<u8>, BackendError> {
    if response.audio_content.is_empty() {
        return Err(BackendError::Malformed(
            "synthesize: response has no audioContent".to_string(),
        ));
    }
    BASE64
        .decode(response.audio_content.as_bytes())
        .map_err(|e| BackendError::Malformed(format!("synthesize: audioContent: {e}")))
}

impl SpeechSynthesizer for GoogleTts {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &self.token.authorization()?)
            .send_json(synthesize_body(request))
            .map_err(|e| from_ureq("synthesize", e))?;
        decode_audio(decode_json("synthesize", response)?)
    }
}
