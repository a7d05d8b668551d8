#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

mod api;

pub use api::*;
use bon::bon;
pub use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const RATE_LIMIT_MESSAGE: &str = "Límite de solicitudes excedido. Intenta en unos minutos.";

#[derive(Error, Debug)]
pub enum GeminiError {
    /// Carries no request URL: the query string holds the API key.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,
    #[error("API error (status {status}): {message}")]
    Api { status: StatusCode, message: String },
}

impl GeminiError {
    fn http(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

pub type GeminiResult<T> = Result<T, GeminiError>;

/// Single-shot client for `models/{model}:generateContent`. No retries, no timeout.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[bon]
impl GeminiClient {
    #[builder(start_fn = with_api_key)]
    #[must_use]
    pub fn new(
        #[builder(start_fn)] api_key: &str,
        #[builder(into)] base_url: Option<String>,
        #[builder(into)] model: Option<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: api_key.to_string(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let endpoint = self.endpoint();
        debug!("POST {endpoint}");
        // The key goes in the query string; only `endpoint` is ever logged.
        let url = format!("{endpoint}?key={}", self.api_key);
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(GeminiError::http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {status}: {body}");
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(GeminiError::RateLimited);
            }
            return Err(GeminiError::Api {
                status,
                message: error_message(status, &body),
            });
        }

        let bytes = response.bytes().await.map_err(GeminiError::http)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Human readable message from an error body, `"Error <status>"` when there is none.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Error {}", status.as_u16()))
}
