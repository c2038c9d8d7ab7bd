//! Google Drive v3: run folders and multipart artifact uploads.

use serde::{Deserialize, Serialize};

use recite_core::types::ContainerId;
use recite_sync::{BackendError, BlobStore};

use crate::http::{decode_json, from_ureq, TokenSource};

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const BOUNDARY: &str = "recite-artifact-5f0c9d1e7b2a4d38";

pub struct GoogleDrive {
    agent: ureq::Agent,
    token: TokenSource,
    parent_folder_id: Option<String>,
}

impl GoogleDrive {
    /// Run folders are created under `parent_folder_id`, or the drive root.
    pub fn new(agent: ureq::Agent, token: TokenSource, parent_folder_id: Option<String>) -> Self {
        Self {
            agent,
            token,
            parent_folder_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    #[serde(default)]
    id: String,
}

/// `multipart/related` body: JSON metadata part, then the media part.
fn multipart_body(metadata: &[u8], mime_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + bytes.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn created_id(what: &str, file: CreatedFile) -> Result<ContainerId, BackendError> {
    if file.id.is_empty() {
        return Err(BackendError::Malformed(format!("{what}: response has no id")));
    }
    Ok(ContainerId(file.id))
}

impl BlobStore for GoogleDrive {
    fn create_container(&self, name: &str) -> Result<ContainerId, BackendError> {
        let metadata = FileMetadata {
            name,
            mime_type: Some(FOLDER_MIME),
            parents: self.parent_folder_id.as_deref().into_iter().collect(),
        };
        let response = self
            .agent
            .post(FILES_ENDPOINT)
            .set("Authorization", &self.token.authorization()?)
            .query("fields", "id")
            .query("supportsAllDrives", "true")
            .send_json(&metadata)
            .map_err(|e| from_ureq("create folder", e))?;
        created_id("create folder", decode_json("create folder", response)?)
    }

    fn upload(
        &self,
        container: &ContainerId,
        object_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<(), BackendError> {
        let metadata = FileMetadata {
            name: object_name,
            mime_type: Some(mime_type),
            parents: vec![container.0.as_str()],
        };
        let metadata = serde_json::to_vec(&metadata)
            .map_err(|e| BackendError::Malformed(format!("upload metadata: {e}")))?;
        let response = self
            .agent
            .post(UPLOAD_ENDPOINT)
            .set("Authorization", &self.token.authorization()?)
            .set(
                "Content-Type",
                &format!("multipart/related; boundary={BOUNDARY}"),
            )
            .query("uploadType", "multipart")
            .query("fields", "id")
            .query("supportsAllDrives", "true")
            .send_bytes(&multipart_body(&metadata, mime_type, bytes))
            .map_err(|e| from_ureq("upload", e))?;
        let id = created_id("upload", decode_json("upload", response)?)?;
        tracing::debug!("uploaded {object_name} as {id}");
        Ok(())
    }
}
