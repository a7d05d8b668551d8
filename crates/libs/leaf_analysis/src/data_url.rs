use crate::AnalysisError;
use base64::{Engine as _, engine::general_purpose};
use regex::Regex;
use std::sync::LazyLock;

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([^;,\s]+)(?:;[^;,\s]+)*;base64,([A-Za-z0-9+/]+=*)$")
        .expect("data URL regex is valid")
});

/// Borrowed view of `data:<mime>[;<param>...];base64,<payload>`. Parameters are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    pub fn parse(data_url: &'a str) -> Result<Self, AnalysisError> {
        let captures = DATA_URL
            .captures(data_url)
            .ok_or(AnalysisError::MalformedImageEncoding)?;
        match (captures.get(1), captures.get(2)) {
            (Some(mime_type), Some(payload)) => Ok(Self {
                mime_type: mime_type.as_str(),
                payload: payload.as_str(),
            }),
            _ => Err(AnalysisError::MalformedImageEncoding),
        }
    }

    pub fn decode_payload(&self) -> Result<Vec<u8>, AnalysisError> {
        general_purpose::STANDARD
            .decode(self.payload)
            .map_err(|_| AnalysisError::MalformedImageEncoding)
    }
}

#[must_use]
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let b64 = general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{b64}")
}
