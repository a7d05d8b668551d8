use crate::{CompressionSettings, GeminiSettings, LoggingSettings, RawSettings, SecretSettings};
use color_eyre::eyre::{Report, bail};

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub gemini: GeminiSettings,
    pub compression: CompressionSettings,
    pub logging: LoggingSettings,
    pub secrets: SecretSettings,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = Report;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        if raw.secrets.gemini_api_key.trim().is_empty() {
            bail!("Missing Gemini API key, set APP__SECRETS__GEMINI_API_KEY");
        }
        if raw.gemini.model.trim().is_empty() {
            bail!("gemini.model cannot be empty");
        }
        if raw.compression.max_dimension == 0 {
            bail!("compression.max_dimension must be above zero");
        }
        let quality = raw.compression.quality;
        if !(quality > 0.0 && quality <= 1.0) {
            bail!("compression.quality must be in (0, 1], got {quality}");
        }

        let gemini = GeminiSettings {
            base_url: raw.gemini.base_url.trim_end_matches('/').to_string(),
            model: raw.gemini.model.trim().to_string(),
        };
        let secrets = SecretSettings {
            gemini_api_key: raw.secrets.gemini_api_key.trim().to_string(),
        };

        Ok(Self {
            gemini,
            compression: raw.compression,
            logging: raw.logging,
            secrets,
        })
    }
}
