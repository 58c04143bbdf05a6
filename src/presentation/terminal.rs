//! ANSI rendering of result views for the CLI.

use colored::{ColoredString, Colorize};

use super::{DimensionBar, Gauge, ResultView, Severity};
use crate::chat::{ChatMessage, Sender};

/// Character width of a full bar.
const BAR_WIDTH: usize = 30;

fn paint(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Good => text.green(),
        Severity::Warning => text.yellow(),
        Severity::Critical => text.red(),
    }
}

fn bar(width_pct: f64) -> String {
    let filled = ((width_pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn render_gauge(gauge: &Gauge) -> String {
    format!(
        "  {} {}  {}",
        "DQS".bold(),
        paint(&gauge.label, gauge.severity).bold(),
        paint(&bar(gauge.quality), gauge.severity)
    )
}

pub fn render_dimension(dim: &DimensionBar) -> String {
    format!(
        "  {:<14} {} {}",
        dim.label,
        paint(&bar(dim.width_pct), dim.severity),
        paint(&dim.score_text, dim.severity)
    )
}

/// Full results screen as printed by `dqai evaluate`.
pub fn render_result(view: &ResultView) -> String {
    let mut out = Vec::new();

    out.push(format!(
        "{} {}",
        "Data Quality Report".bold().cyan(),
        format!("[{}]", view.profile.label()).dimmed()
    ));
    out.push("=".repeat(60));
    out.push(render_gauge(&view.gauge));
    out.push(String::new());

    out.push("Quality Dimensions".bold().cyan().to_string());
    if view.dimensions.is_empty() {
        out.push(format!("  {}", "no dimensions returned".dimmed()));
    }
    for dim in &view.dimensions {
        out.push(render_dimension(dim));
    }
    out.push(String::new());

    out.push("GenAI Analyst".bold().cyan().to_string());
    out.push(format!("  {}", view.insights));
    out.push(String::new());

    out.push("Suggested Fixes".bold().cyan().to_string());
    for rec in &view.recommendations {
        out.push(format!("  {:>2}. {}", rec.index + 1, rec.text));
        if let Some(ref fix) = rec.fix {
            out.push(format!("      {}", "AI Implementation Guide:".bold()));
            for line in fix {
                out.push(format!("      {line}"));
            }
        }
    }

    out.join("\n")
}

pub fn render_chat_message(msg: &ChatMessage) -> String {
    match msg.sender {
        Sender::User => format!("{} {}", "you>".bold(), msg.text),
        Sender::Ai => format!("{} {}", "ai> ".cyan().bold(), msg.text),
    }
}
