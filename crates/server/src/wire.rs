//! JSON bodies exchanged with the browser client.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use webterm_core::{FileUpload, HelpEntry};

use crate::error::ServerError;

/// Body of command, job and completion requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBody {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobQuery {
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    pub name: String,
    #[serde(default = "UploadBody::default_mime_type")]
    pub mime_type: String,
    /// Base64 file contents.
    pub data: String,
}

impl UploadBody {
    fn default_mime_type() -> String {
        "application/octet-stream".to_string()
    }

    pub fn into_upload(self) -> Result<FileUpload, ServerError> {
        let data = STANDARD
            .decode(self.data.trim())
            .map_err(|err| ServerError::bad_request(format!("data is not valid base64: {err}")))?;
        Ok(FileUpload {
            name: self.name,
            mime_type: self.mime_type,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsResponse {
    pub commands: Vec<HelpEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub matches: Vec<String>,
}

/// Parses a JSON body; an empty body yields the type's default.
pub(crate) fn parse_body<T>(bytes: &[u8]) -> Result<T, ServerError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes).map_err(ServerError::bad_request)
}

/// Parses a JSON body that must be present.
pub(crate) fn parse_required_body<T>(bytes: &[u8]) -> Result<T, ServerError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(ServerError::bad_request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_default_input() {
        let body: InputBody = parse_body(b"  ").unwrap();
        assert_eq!(body.input, "");
        let body: InputBody = parse_body(br#"{"input":"help"}"#).unwrap();
        assert_eq!(body.input, "help");
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_body::<InputBody>(b"{input").unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        let err = parse_required_body::<UploadBody>(br#"{"name":"a"}"#).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[test]
    fn upload_decodes_base64() {
        let raw = br#"{"name":"a.txt","mimeType":"text/plain","data":"aGk="}"#;
        let body: UploadBody = parse_required_body(raw).unwrap();
        let upload = body.into_upload().unwrap();
        assert_eq!(upload.data, b"hi");
        assert_eq!(upload.mime_type, "text/plain");

        let body = UploadBody {
            name: "a".into(),
            mime_type: "text/plain".into(),
            data: "***".into(),
        };
        assert!(matches!(body.into_upload(), Err(ServerError::BadRequest(_))));
    }
}
