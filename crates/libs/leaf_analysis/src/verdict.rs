use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_EXPLANATION: &str = "Sin explicación disponible";

/// Normalized answer of the model for one leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub label: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub explanation: String,
    /// Passed through as the model sent them; usually strings.
    pub recommendations: Vec<Value>,
}

impl AnalysisResult {
    #[must_use]
    pub fn diagnosis(&self) -> Diagnosis {
        Diagnosis::from_label(&self.label)
    }

    #[must_use]
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Recommendations as display text. Non-string entries are shown as JSON.
    #[must_use]
    pub fn recommendation_lines(&self) -> Vec<String> {
        self.recommendations
            .iter()
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnosis {
    EarlyBlight,
    LateBlight,
    Healthy,
    NotPotatoLeaf,
    Other(String),
}

impl Diagnosis {
    /// Maps the free-text label onto the known classes, ignoring case and accents on "tardío".
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("saludable") {
            Self::Healthy
        } else if lower.contains("temprano") {
            Self::EarlyBlight
        } else if lower.contains("tardío") || lower.contains("tardio") {
            Self::LateBlight
        } else if lower.contains("no es hoja") {
            Self::NotPotatoLeaf
        } else {
            Self::Other(label.to_string())
        }
    }

    /// Canonical label, as listed in the prompt.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::EarlyBlight => "Tizón temprano",
            Self::LateBlight => "Tizón tardío",
            Self::Healthy => "Saludable",
            Self::NotPotatoLeaf => "No es hoja de papa",
            Self::Other(label) => label,
        }
    }

    /// Hex colour used when rendering the verdict.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Healthy => "#4ade80",
            Self::EarlyBlight => "#fbbf24",
            Self::LateBlight => "#f87171",
            Self::NotPotatoLeaf | Self::Other(_) => "#87CEEB",
        }
    }
}
