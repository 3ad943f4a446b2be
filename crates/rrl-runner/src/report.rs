//! Text and JSON rendering of evaluation results.

use crate::{Classification, RunnerError};
use clap::ValueEnum;
use rrl_obstruction::{Category, CategoryCounts, Confidence, Evaluation, SegmentReport};
use serde::Serialize;
use std::fmt::Write;

/// Output format of the `rrl` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    name: Option<&'a str>,
    line_of_sight: bool,
    category_counts: CategoryCounts,
    worst_loss_db: Option<f64>,
    segments: &'a [SegmentReport],
}

/// Render a full evaluation.
pub fn render_evaluation(
    name: Option<&str>,
    evaluation: &Evaluation,
    format: OutputFormat,
) -> Result<String, RunnerError> {
    match format {
        OutputFormat::Json => {
            let report = JsonReport {
                name,
                line_of_sight: evaluation.is_line_of_sight(),
                category_counts: evaluation.category_counts(),
                worst_loss_db: evaluation.worst().map(|r| r.estimate.loss_db),
                segments: &evaluation.reports,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Text => Ok(evaluation_table(name, evaluation)),
    }
}

/// Render categories and merged segments.
pub fn render_classification(
    classification: &Classification,
    format: OutputFormat,
) -> Result<String, RunnerError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(classification)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let strip: String = classification
                .categories
                .iter()
                .map(|c| category_symbol(*c))
                .collect();
            let _ = writeln!(out, "{strip}");
            for segment in &classification.segments {
                let _ = writeln!(out, "{segment}");
            }
            Ok(out)
        }
    }
}

fn category_symbol(category: Category) -> char {
    match category {
        Category::Open => '.',
        Category::HalfOpen => 'h',
        Category::Closed => '#',
    }
}

fn evaluation_table(name: Option<&str>, evaluation: &Evaluation) -> String {
    let mut out = String::new();
    let counts = evaluation.category_counts();

    if let Some(name) = name {
        let _ = writeln!(out, "Link: {name}");
    }
    let _ = writeln!(
        out,
        "Samples: {} ({} open, {} half-open, {} closed)",
        evaluation.categories.len(),
        counts.open,
        counts.half_open,
        counts.closed
    );
    let _ = writeln!(
        out,
        "Line of sight: {}",
        if evaluation.is_line_of_sight() { "yes" } else { "no" }
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>6} {:>6}  {:<10} {:<7} {:>9}  {}",
        "start", "end", "category", "model", "loss dB", "notes"
    );

    for report in &evaluation.reports {
        let estimate = &report.estimate;
        let mut notes = Vec::new();
        if estimate.confidence == Confidence::Low {
            notes.push("low confidence".to_string());
        }
        if let Some(closed) = &report.closed {
            notes.push(format!("{} peak(s)", closed.peak_count));
        }
        if !estimate.faults.is_empty() {
            notes.push(format!("{} fault(s)", estimate.faults.len()));
        }
        let _ = writeln!(
            out,
            "{:>6} {:>6}  {:<10} {:<7} {:>9.2}  {}",
            report.segment.start,
            report.segment.end,
            report.segment.category.name(),
            estimate.model.to_string(),
            estimate.loss_db,
            notes.join(", ")
        );
    }

    if let Some(worst) = evaluation.worst() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Worst segment: {} with {:.2} dB",
            worst.segment, worst.estimate.loss_db
        );
    }
    out
}
