//! Reads a verdict out of free-form model output.
//!
//! The model is told to answer with bare JSON but regularly wraps it in markdown
//! fences, adds prose around it, or breaks strings with raw newlines. Each step
//! below is a plain function over text so it can be tested on its own:
//!
//! 1. [`collect_text`] joins the text parts of the first candidate.
//! 2. [`isolate_json`] picks a fenced block, else the outermost `{...}`, else the text.
//! 3. [`sanitize`] blanks out control characters.
//! 4. [`parse_verdict`] parses, validates and normalizes the object.

use crate::verdict::FALLBACK_EXPLANATION;
use crate::{AnalysisError, AnalysisResult};
use language_model::GenerateContentResponse;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, error, warn};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("fenced block regex is valid")
});

/// Full pipeline from response envelope to verdict.
pub fn extract_verdict(
    response: &GenerateContentResponse,
) -> Result<AnalysisResult, AnalysisError> {
    let text = collect_text(response)?;
    parse_verdict(&text)
}

/// Concatenation of every text part of the first candidate, in order.
pub fn collect_text(response: &GenerateContentResponse) -> Result<String, AnalysisError> {
    let text: String = response
        .first_candidate_parts()
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.is_empty() {
        error!("Model returned no text: {response:?}");
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(text)
}

/// Inner content of the first markdown code fence, trimmed.
#[must_use]
pub fn fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str().trim())
}

/// From the first `{` to the last `}`, both included.
#[must_use]
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[must_use]
pub fn isolate_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(inner) = fenced_block(trimmed) {
        debug!("Using fenced block from model output");
        inner
    } else if let Some(span) = brace_span(trimmed) {
        debug!("Using brace span from model output");
        span
    } else {
        debug!("No JSON markers in model output, using it as is");
        trimmed
    }
}

/// Replaces ASCII control characters (0x00-0x1F, 0x7F) with spaces and trims.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c <= '\u{1f}' || c == '\u{7f}' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn parse_verdict(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let cleaned = sanitize(isolate_json(text));
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        warn!("Could not parse model output as JSON ({e}): {cleaned}");
        AnalysisError::InvalidJson(e)
    })?;
    let Value::Object(object) = value else {
        warn!("Model output is JSON but not an object: {cleaned}");
        return Err(AnalysisError::IncompleteResponse);
    };
    normalize(object)
}

fn normalize(mut object: Map<String, Value>) -> Result<AnalysisResult, AnalysisError> {
    let label = match object.remove("label") {
        Some(Value::String(label)) if !label.is_empty() => label,
        _ => return Err(AnalysisError::IncompleteResponse),
    };
    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or(AnalysisError::IncompleteResponse)?;

    let explanation = match object.remove("explanation") {
        Some(Value::String(text)) if !text.is_empty() => text,
        _ => FALLBACK_EXPLANATION.to_string(),
    };
    let recommendations = match object.remove("recommendations") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    Ok(AnalysisResult {
        label,
        confidence: confidence.clamp(0.0, 1.0),
        explanation,
        recommendations,
    })
}
