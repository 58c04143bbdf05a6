/// Configuration schema and defaults for dqai.
///
/// Defines the TOML-serializable configuration structure with its sections:
/// `[general]`, `[backend]`, `[dashboard]` and `[logging]`.
///
/// Every field has a built-in default. Users only set what they want to
/// override.
use serde::{Deserialize, Serialize};

use crate::profile::GovernanceProfile;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level dqai configuration.
///
/// Maps to `~/.dqai/config.toml` and `.dqai.toml`. Missing sections and
/// fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DqaiConfig {
    pub general: GeneralConfig,
    pub backend: BackendConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Governance profile preselected in the CLI and the dashboard.
    pub default_profile: GovernanceProfile,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Analysis backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL the `/evaluate`, `/fix` and `/chat` paths are appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds. `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Embedded web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listen address for `dqai serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8765".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every backend request to `~/.dqai/request-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl DqaiConfig {
    /// Annotated default config file, written by `dqai config init`.
    pub fn default_toml() -> String {
        r#"# dqai Configuration
# Data quality dashboard client
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (DQAI_*)
#   2. Project config (.dqai.toml in current directory)
#   3. User global config (~/.dqai/config.toml)
#   4. Built-in defaults

[general]
default_profile = "analytics"   # analytics | kyc | fraud | merchant

[backend]
base_url = "http://127.0.0.1:5000"
timeout_ms = 0                  # 0 = wait indefinitely

[dashboard]
addr = "127.0.0.1:8765"
open_browser = true

[logging]
enabled = true                  # ~/.dqai/request-log.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
