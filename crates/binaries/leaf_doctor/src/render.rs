use leaf_analysis::AnalysisResult;
use std::fmt::{self, Write};

/// Plain-text report of a verdict.
pub fn render_verdict(verdict: &AnalysisResult) -> Result<String, fmt::Error> {
    let diagnosis = verdict.diagnosis();
    let mut out = String::new();
    writeln!(
        out,
        "{} ({}% confianza) [{}]",
        verdict.label,
        verdict.confidence_percent(),
        diagnosis.color()
    )?;
    writeln!(out, "{}", verdict.explanation)?;

    let lines = verdict.recommendation_lines();
    if !lines.is_empty() {
        writeln!(out, "\nRecomendaciones:")?;
        for (i, line) in lines.iter().enumerate() {
            writeln!(out, "  {}. {line}", i + 1)?;
        }
    }
    Ok(out)
}
