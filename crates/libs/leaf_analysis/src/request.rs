use crate::data_url::DataUrl;
use crate::AnalysisError;
use language_model::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part};

pub const TEMPERATURE: f32 = 0.1;
pub const TOP_K: u32 = 32;
pub const TOP_P: f32 = 1.0;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// The model is asked for bare JSON, but fences and chatter still have to be
/// tolerated when reading the answer.
pub const CLASSIFICATION_PROMPT: &str = r#"Analiza esta imagen de hoja de papa. Responde SOLO con JSON válido (sin markdown, sin backticks):

{"label":"Tizón temprano"|"Tizón tardío"|"Saludable"|"No es hoja de papa","confidence":0.0-1.0,"explanation":"máximo 50 palabras","recommendations":["rec1","rec2","rec3"]}"#;

/// One classification call: the prompt plus the compressed image.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub prompt: &'static str,
    pub mime_type: String,
    pub data: String,
    pub generation_config: GenerationConfig,
}

pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: TEMPERATURE,
    top_k: TOP_K,
    top_p: TOP_P,
    max_output_tokens: MAX_OUTPUT_TOKENS,
};

impl AnalysisRequest {
    /// Builds the request from the data URL of the compressed image.
    pub fn from_data_url(data_url: &str) -> Result<Self, AnalysisError> {
        let parsed = DataUrl::parse(data_url)?;
        Ok(Self {
            prompt: CLASSIFICATION_PROMPT,
            mime_type: parsed.mime_type.to_string(),
            data: parsed.payload.to_string(),
            generation_config: GENERATION_CONFIG,
        })
    }
}

impl From<AnalysisRequest> for GenerateContentRequest {
    fn from(request: AnalysisRequest) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: request.prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type,
                            data: request.data,
                        },
                    },
                ],
            }],
            generation_config: request.generation_config,
        }
    }
}
