use language_model::{GeminiError, RATE_LIMIT_MESSAGE};
use thiserror::Error;

/// What went wrong, without the message. Handy for matching on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    RenderSurfaceUnavailable,
    MalformedImageEncoding,
    RateLimited,
    Remote,
    Transport,
    EmptyResponse,
    InvalidJson,
    IncompleteResponse,
    InvalidOptions,
}

/// Every way a single analysis can fail. `Display` is the text shown to the user.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Error cargando imagen")]
    Decode { detail: String },
    #[error("No se pudo crear canvas")]
    RenderSurfaceUnavailable { detail: String },
    #[error("Formato de imagen inválido")]
    MalformedImageEncoding,
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,
    #[error("Error de Gemini API: {message}")]
    Remote { status: u16, message: String },
    #[error("Error de comunicación con Gemini API: {0}")]
    Transport(#[source] GeminiError),
    #[error("La API no devolvió contenido")]
    EmptyResponse,
    #[error("Error procesando la respuesta de la IA")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Respuesta incompleta")]
    IncompleteResponse,
    #[error("Opciones de compresión inválidas: {0}")]
    InvalidOptions(String),
}

impl AnalysisError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::RenderSurfaceUnavailable { .. } => ErrorKind::RenderSurfaceUnavailable,
            Self::MalformedImageEncoding => ErrorKind::MalformedImageEncoding,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Transport(_) => ErrorKind::Transport,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::InvalidJson(_) => ErrorKind::InvalidJson,
            Self::IncompleteResponse => ErrorKind::IncompleteResponse,
            Self::InvalidOptions(_) => ErrorKind::InvalidOptions,
        }
    }

    pub(crate) fn decode(detail: impl ToString) -> Self {
        Self::Decode {
            detail: detail.to_string(),
        }
    }

    pub(crate) fn render(detail: impl ToString) -> Self {
        Self::RenderSurfaceUnavailable {
            detail: detail.to_string(),
        }
    }
}

impl From<GeminiError> for AnalysisError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::RateLimited => Self::RateLimited,
            GeminiError::Api { status, message } => Self::Remote {
                status: status.as_u16(),
                message,
            },
            other => Self::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_keep_status_and_message() {
        let err = AnalysisError::from(GeminiError::Api {
            status: language_model::StatusCode::FORBIDDEN,
            message: "API key not valid".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), "Error de Gemini API: API key not valid");
    }

    #[test]
    fn rate_limit_message_is_fixed() {
        let err = AnalysisError::from(GeminiError::RateLimited);
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn decode_detail_stays_out_of_the_message() {
        let err = AnalysisError::decode("unexpected EOF in PNG chunk");
        assert_eq!(err.to_string(), "Error cargando imagen");
    }
}
