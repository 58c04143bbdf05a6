//! CLI command implementations for dqai.
//!
//! Provides subcommand handlers for:
//! - `dqai evaluate FILE`: score a CSV dataset and print the report
//! - `dqai fix ISSUE`: ask for a fix suggestion
//! - `dqai chat [MESSAGE]`: one-shot or interactive assistant chat
//! - `dqai profiles`: list governance profiles
//! - `dqai serve`: browser dashboard
//! - `dqai history`: request log summary
//! - `dqai health`: backend, config and log status
//! - `dqai config show|init|set|reset`: configuration management

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::logger;
use crate::analytics::reporter::{self, History};
use crate::backend::{AnalysisBackend, EVALUATE_FAILED_NOTICE, HttpBackend};
use crate::chat::ChatSession;
use crate::config;
use crate::loading::Spinner;
use crate::presentation::ResultView;
use crate::presentation::terminal::{render_chat_message, render_result};
use crate::profile::GovernanceProfile;
use crate::recommendations::fix_paragraphs;
use crate::session::{Dashboard, DashboardError};
use crate::upload::DatasetFile;
use crate::web::{self, AppState};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// dqai evaluate
// ---------------------------------------------------------------------------

/// Upload a dataset, print the report and optionally expand some fixes.
///
/// `fixes` holds 1-based recommendation numbers.
pub fn run_evaluate(
    path: &Path,
    profile: Option<GovernanceProfile>,
    format: OutputFormat,
    fixes: &[usize],
) -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg);

    let file = DatasetFile::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut dashboard = Dashboard::new(profile.unwrap_or(cfg.general.default_profile));
    dashboard.select_file(file)?;

    let spinner = (format == OutputFormat::Table).then(Spinner::start);
    let outcome = dashboard.analyze(&backend, None);
    if let Some(spinner) = spinner {
        spinner.stop();
    }

    match outcome {
        Ok(_) => {}
        Err(DashboardError::Evaluate(err)) => {
            return Err(anyhow::Error::new(err).context(EVALUATE_FAILED_NOTICE));
        }
        Err(e) => return Err(e.into()),
    }

    let len = dashboard
        .analysis()
        .map(|a| a.recommendations.len())
        .unwrap_or(0);
    for index in fix_indices(fixes, len)? {
        dashboard.toggle_recommendation_with(&backend, index)?;
    }

    let analysis = dashboard
        .analysis()
        .context("analysis finished without a result")?;
    let view = ResultView::new(&analysis.result, analysis.profile, &analysis.recommendations);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&view)?;
            println!("{json}");
        }
        OutputFormat::Table => println!("{}", render_result(&view)),
    }

    Ok(())
}

/// Distinct indices for the requested recommendation numbers. A repeated
/// number expands its row once.
fn fix_indices(numbers: &[usize], len: usize) -> Result<BTreeSet<usize>> {
    numbers.iter().map(|&n| fix_index(n, len)).collect()
}

/// Convert a 1-based recommendation number to an index.
fn fix_index(number: usize, len: usize) -> Result<usize> {
    if number == 0 || number > len {
        anyhow::bail!("no recommendation #{number} (the report lists {len})");
    }
    Ok(number - 1)
}

// ---------------------------------------------------------------------------
// dqai fix
// ---------------------------------------------------------------------------

/// Ask the backend how to fix one issue.
pub fn run_fix(issue: &str) -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg);

    let text = backend.fetch_fix_suggestion(issue);

    println!("{}", "AI Implementation Guide:".bold().cyan());
    for line in fix_paragraphs(&text) {
        println!("  {line}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// dqai chat
// ---------------------------------------------------------------------------

/// Send one message, or run an interactive session until EOF or `/quit`.
pub fn run_chat(message: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg);
    let mut session = ChatSession::new();

    if let Some(message) = message {
        let reply = session.send(&backend, message)?;
        println!("{reply}");
        return Ok(());
    }

    if let Some(greeting) = session.messages().first() {
        println!("{}", render_chat_message(greeting));
    }
    println!("{}", "Type /quit or press Ctrl+D to leave.".dimmed());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "you>".bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("failed to read from stdin")?;
        if line.trim() == "/quit" {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        session.send(&backend, &line)?;
        if let Some(reply) = session.messages().last() {
            println!("{}", render_chat_message(reply));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// dqai profiles
// ---------------------------------------------------------------------------

/// List the governance profiles, marking the configured default.
pub fn run_profiles() -> Result<()> {
    let default = config::load().general.default_profile;

    println!("{}", "Governance Profiles".bold().cyan());
    println!("{}", "=".repeat(50));
    for profile in GovernanceProfile::ALL {
        let marker = if profile == default {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!("  {} {:<10} {}", marker, profile.tag(), profile.label().dimmed());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// dqai serve
// ---------------------------------------------------------------------------

/// Run the browser dashboard until interrupted.
pub fn run_serve(addr: Option<&str>, no_browser: bool) -> Result<()> {
    let cfg = config::load();
    let backend: Arc<dyn AnalysisBackend> = Arc::new(HttpBackend::from_config(&cfg));
    let addr = addr.unwrap_or(&cfg.dashboard.addr);

    let state = AppState::new(backend, &cfg.backend.base_url, cfg.general.default_profile);
    web::serve(addr, state, cfg.dashboard.open_browser && !no_browser)
}

// ---------------------------------------------------------------------------
// dqai history
// ---------------------------------------------------------------------------

/// Summarize the request log.
pub fn run_history(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let history = reporter::compute_history(days);

    if history.total_requests == 0 {
        println!(
            "{}",
            "No requests logged yet. Run `dqai evaluate` to record some.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&history)?;
            println!("{json}");
        }
        OutputFormat::Table => print_history_table(&history, days),
    }

    Ok(())
}

fn print_history_table(history: &History, days: Option<u32>) {
    let scope = match days {
        Some(d) => format!("last {d} days"),
        None => "all time".to_string(),
    };
    println!(
        "{} {}",
        "dqai Request History".bold().cyan(),
        format!("({scope})").dimmed()
    );
    println!("{}", "=".repeat(60));
    println!("  {} {}", "Total requests:".bold(), history.total_requests);
    if let Some(ref last) = history.last_request {
        println!("  {} {}", "Last request:  ".bold(), last);
    }
    println!();

    println!(
        "  {:<10} {:>7} {:>9} {:>12} {:>12}",
        "Operation", "Count", "Failed", "Avg latency", "Max latency"
    );
    println!("  {}", "-".repeat(54));
    for stat in &history.operations {
        let failed = format!("{:.0}%", stat.failure_pct());
        let failed = if stat.failures > 0 {
            failed.red()
        } else {
            failed.green()
        };
        println!(
            "  {:<10} {:>7} {:>9} {:>12} {:>12}",
            stat.operation.to_string(),
            stat.count,
            failed,
            format_latency(stat.avg_latency_ms),
            format_latency(stat.max_latency_ms as f64),
        );
    }

    if !history.profiles.is_empty() {
        println!();
        println!("{}", "Evaluations by profile".bold().cyan());
        for (profile, count) in &history.profiles {
            println!("  {:<10} {}", profile.tag(), count);
        }
    }
}

/// `812ms`, `1.4s`.
fn format_latency(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.1}s", ms / 1000.0)
    } else {
        format!("{ms:.0}ms")
    }
}

// ---------------------------------------------------------------------------
// dqai health
// ---------------------------------------------------------------------------

/// Check backend reachability, config files and the request log.
pub fn run_health() -> Result<()> {
    println!("{}", "dqai Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // Config files
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.dqai/config.toml found"
        } else {
            "not found (run `dqai config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".dqai.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item("Default profile", true, cfg.general.default_profile.label());

    // Backend
    let backend = HttpBackend::from_config(&cfg);
    let reachable = backend.is_reachable();
    let detail = if reachable {
        format!("reachable at {}", backend.base_url())
    } else {
        format!("not reachable at {}", backend.base_url())
    };
    print_health_item("Backend", reachable, &detail);
    print_health_item(
        "Timeout",
        true,
        &match cfg.backend.timeout_ms {
            0 => "none".to_string(),
            ms => format!("{ms}ms"),
        },
    );

    // Request log
    let log_exists = logger::request_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    let detail = if !cfg.logging.enabled {
        "disabled".to_string()
    } else if log_exists {
        format!("{} entries", logger::read_all_entries().len())
    } else {
        "no log file yet".to_string()
    };
    print_health_item("Request log", log_exists || !cfg.logging.enabled, &detail);

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// dqai config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective dqai Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    // Show source info
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.dqai/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.dqai/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".dqai.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".dqai.toml (not found)".dimmed());
    }
    println!("  {} {}", "·".dimmed(), "DQAI_* environment variables".dimmed());

    Ok(())
}

/// Initialize a default config file at `~/.dqai/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point dqai at your backend.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_fix_index_is_one_based() {
        assert_eq!(fix_index(1, 3).unwrap(), 0);
        assert_eq!(fix_index(3, 3).unwrap(), 2);
        assert!(fix_index(0, 3).is_err());
        assert!(fix_index(4, 3).is_err());
        assert!(fix_index(1, 0).is_err());
    }

    #[test]
    fn test_fix_indices_dedupe_repeats() {
        let indices = fix_indices(&[2, 1, 2, 1], 3).unwrap();
        assert_eq!(indices.into_iter().collect::<Vec<_>>(), [0, 1]);
        assert!(fix_indices(&[1, 5], 3).is_err());
        assert!(fix_indices(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(0.0), "0ms");
        assert_eq!(format_latency(812.4), "812ms");
        assert_eq!(format_latency(1400.0), "1.4s");
    }
}
