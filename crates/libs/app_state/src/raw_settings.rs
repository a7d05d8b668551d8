use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub gemini: GeminiSettings,
    pub compression: CompressionSettings,
    pub logging: LoggingSettings,
    pub secrets: SecretSettings,
}

/// Where the vision model lives.
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    /// Scheme and host of the generative language API, without a trailing path.
    pub base_url: String,
    /// Model id used in `/v1beta/models/{model}:generateContent`.
    pub model: String,
}

/// How an image is shrunk before it is uploaded.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CompressionSettings {
    /// Longest side of the uploaded image in pixels. Must be above zero.
    pub max_dimension: u32,
    /// JPEG quality in `(0, 1]`.
    pub quality: f32,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Deserialize, Clone)]
pub struct SecretSettings {
    #[serde(default)]
    pub gemini_api_key: String,
}

impl std::fmt::Debug for SecretSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSettings")
            .field("gemini_api_key", &"<redacted>")
            .finish()
    }
}
