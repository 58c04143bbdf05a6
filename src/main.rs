use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dqai::cli;
use dqai::profile::GovernanceProfile;

#[derive(Debug, Parser)]
#[command(name = "dqai")]
#[command(about = "DataQualityAI: score CSV datasets and get AI fix suggestions")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a CSV dataset for scoring and print the report
    Evaluate {
        /// Path to the CSV file
        file: PathBuf,
        /// Governance profile: analytics, kyc, fraud, merchant
        #[arg(long, short)]
        profile: Option<GovernanceProfile>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Expand recommendation N (1-based) with its AI fix; repeatable
        #[arg(long = "fix", value_name = "N")]
        fixes: Vec<usize>,
    },
    /// Ask the AI how to fix one data quality issue
    Fix {
        /// The issue text, e.g. "Dedupe IDs"
        #[arg(trailing_var_arg = true, required = true)]
        issue: Vec<String>,
    },
    /// Chat with the AI assistant (interactive without a message)
    Chat {
        /// Message to send; omit for an interactive session
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// List governance profiles
    Profiles,
    /// Run the browser dashboard
    Serve {
        /// Listen address (default from config: 127.0.0.1:8765)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_browser: bool,
    },
    /// Summarize logged backend requests
    History {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check backend reachability, config and request log
    Health,
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.dqai/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one dotted key, e.g. backend.base_url
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Evaluate {
            file,
            profile,
            format,
            fixes,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_evaluate(&file, profile, fmt, &fixes)
        }
        Commands::Fix { issue } => cli::run_fix(&issue.join(" ")),
        Commands::Chat { message } => {
            let message = message.join(" ");
            cli::run_chat((!message.trim().is_empty()).then_some(message.as_str()))
        }
        Commands::Profiles => cli::run_profiles(),
        Commands::Serve { addr, no_browser } => cli::run_serve(addr.as_deref(), no_browser),
        Commands::History { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
