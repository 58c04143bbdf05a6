/// Configuration system for dqai.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DqaiConfig::default()`]
/// 2. **User global config**: `~/.dqai/config.toml`
/// 3. **Project local config**: `.dqai.toml` in the current working directory
/// 4. **Environment variables**: `DQAI_*` overrides (highest precedence)
///
/// Later layers override earlier ones at the field level: a project file that
/// only sets `[dashboard]` keeps the global `[backend]` values.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DqaiConfig;

use crate::profile::GovernanceProfile;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration: defaults → global TOML → project
/// TOML → env vars.
pub fn load() -> DqaiConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the TOML files in order over the built-in defaults.
fn load_layers(paths: &[Option<PathBuf>]) -> DqaiConfig {
    let mut merged = toml::Table::new();
    for layer in paths.iter().filter_map(|path| load_toml_file(path.as_deref())) {
        merge_tables(&mut merged, layer);
    }
    toml::Value::Table(merged).try_into().unwrap_or_default()
}

/// Read a TOML config file as a raw table. Missing files, malformed TOML
/// and tables that do not fit the schema yield `None`, so the layer is
/// skipped.
fn load_toml_file(path: Option<&Path>) -> Option<toml::Table> {
    let content = fs::read_to_string(path?).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    toml::Value::Table(table.clone())
        .try_into::<DqaiConfig>()
        .ok()?;
    Some(table)
}

/// Recursively overlay `overlay` onto `base`. Sub-tables merge key by key;
/// any other value replaces the one below it.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(below)), toml::Value::Table(above)) => {
                merge_tables(below, above);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.dqai`, home of the global config and the request log.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dqai"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".dqai.toml"))
}

/// Path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `DQAI_BACKEND_URL`: backend base URL
/// - `DQAI_TIMEOUT_MS`: request timeout, `0` for none
/// - `DQAI_PROFILE`: default governance profile
/// - `DQAI_DASHBOARD_ADDR`: `dqai serve` listen address
/// - `DQAI_LOGGING`: request logging (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut DqaiConfig) {
    if let Ok(val) = std::env::var("DQAI_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("DQAI_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("DQAI_PROFILE")
        && let Ok(profile) = val.parse::<GovernanceProfile>()
    {
        config.general.default_profile = profile;
    }
    if let Ok(val) = std::env::var("DQAI_DASHBOARD_ADDR")
        && !val.is_empty()
    {
        config.dashboard.addr = val;
    }
    if let Ok(val) = std::env::var("DQAI_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.dqai/config.toml`.
///
/// Fails if the file exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.dqai/ directory")?;
    }

    fs::write(&path, DqaiConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set one dotted key (e.g. `backend.base_url`) in the global config file,
/// starting from defaults when the file does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DqaiConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that would make the file unloadable.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<DqaiConfig>(&rendered)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path, keeping the
/// type of the value it replaces.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected a section above '{leaf}' in '{key}'"))?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_value() -> toml::Value {
        toml::from_str(&toml::to_string_pretty(&DqaiConfig::default()).unwrap()).unwrap()
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root = defaults_value();
        set_toml_value(&mut root, "backend.base_url", "http://scorer:9000").unwrap();
        assert_eq!(
            root["backend"]["base_url"].as_str(),
            Some("http://scorer:9000")
        );
    }

    #[test]
    fn set_toml_value_updates_bool_and_integer() {
        let mut root = defaults_value();
        set_toml_value(&mut root, "logging.enabled", "off").unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "3000").unwrap();
        assert_eq!(root["logging"]["enabled"].as_bool(), Some(false));
        assert_eq!(root["backend"]["timeout_ms"].as_integer(), Some(3000));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root = defaults_value();
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.nope", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.timeout_ms", "soon").is_err());
    }

    fn write_layer(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dqai-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn partial_project_file_keeps_global_values() {
        let global = write_layer(
            "global-partial.toml",
            "[backend]\nbase_url = \"http://scorer:9000\"\ntimeout_ms = 3000\n",
        );
        let project = write_layer("project-partial.toml", "[dashboard]\naddr = \"0.0.0.0:9999\"\n");

        let config = load_layers(&[Some(global), Some(project)]);

        assert_eq!(config.backend.base_url, "http://scorer:9000");
        assert_eq!(config.backend.timeout_ms, 3000);
        assert_eq!(config.dashboard.addr, "0.0.0.0:9999");
    }

    #[test]
    fn project_file_overrides_single_global_field() {
        let global = write_layer(
            "global-field.toml",
            "[backend]\nbase_url = \"http://scorer:9000\"\ntimeout_ms = 3000\n",
        );
        let project = write_layer("project-field.toml", "[backend]\ntimeout_ms = 500\n");

        let config = load_layers(&[Some(global), Some(project)]);

        assert_eq!(config.backend.base_url, "http://scorer:9000");
        assert_eq!(config.backend.timeout_ms, 500);
    }

    #[test]
    fn unusable_layer_is_skipped() {
        let global = write_layer(
            "global-skip.toml",
            "[backend]\nbase_url = \"http://scorer:9000\"\n",
        );
        let broken = write_layer("project-broken.toml", "[backend\nbase_url = ");
        let mistyped = write_layer("project-mistyped.toml", "[backend]\ntimeout_ms = \"soon\"\n");

        let config = load_layers(&[Some(global), Some(broken), Some(mistyped), None]);

        assert_eq!(config.backend.base_url, "http://scorer:9000");
        assert_eq!(
            config.backend.timeout_ms,
            DqaiConfig::default().backend.timeout_ms
        );
    }

    #[test]
    fn show_effective_config_round_trips() {
        let toml_str = show_effective_config().unwrap();
        let _: DqaiConfig = toml::from_str(&toml_str).unwrap();
    }
}
