//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/smartlist/config.toml.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use smartlist_core::RuleStore;

use super::{CommandContext, CommandError, Result};
use crate::cli::Cli;

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# smartlist configuration

# Config schema version (do not modify)
version = 1

# JSON catalog of media records (can also use --catalog or SMARTLIST_CATALOG)
# catalog = "/path/to/catalog.json"

# Directory where generated playlists are written
# playlists_dir = "/path/to/playlists"

# Rule file (default: rules.json in the data directory)
# rules_file = "/path/to/rules.json"

# Default user for watch state in previews
# user = "alice"

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Catalog file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Playlist output directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlists_dir: Option<String>,

    /// Rule file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<String>,

    /// Default user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: None,
            playlists_dir: None,
            rules_file: None,
            user: None,
            output: OutputConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Paths and defaults resolved from flags, environment and the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Catalog file, if one is configured anywhere.
    pub catalog: Option<PathBuf>,
    /// Playlist output directory.
    pub playlists_dir: PathBuf,
    /// Rule file.
    pub rules_file: PathBuf,
    /// Default user.
    pub user: Option<String>,
}

impl Settings {
    /// Resolves settings with priority: flag/env > config file > built-in default.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let catalog = cli
            .catalog
            .as_ref()
            .or(config.catalog.as_ref())
            .map(PathBuf::from);

        let playlists_dir = match &config.playlists_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?.join("playlists"),
        };

        let rules_file = match &config.rules_file {
            Some(path) => PathBuf::from(path),
            None => RuleStore::default_path()?,
        };

        Ok(Self {
            catalog,
            playlists_dir,
            rules_file,
            user: config.user.clone(),
        })
    }

    /// Returns the catalog path or an error explaining how to set one.
    pub fn catalog(&self) -> Result<&Path> {
        self.catalog.as_deref().ok_or_else(|| {
            CommandError::Config(
                "No catalog configured. Pass --catalog, set SMARTLIST_CATALOG, or run 'smartlist config set catalog <path>'"
                    .to_string(),
            )
        })
    }

    /// Opens the rule store at the resolved path.
    pub fn rule_store(&self) -> RuleStore {
        RuleStore::with_path(self.rules_file.clone())
    }
}

/// Gets the data directory used for default playlist output.
fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "smartlist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CommandError::Config("Could not determine data directory".to_string()))
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/smartlist/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("smartlist"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("smartlist"))
        .ok_or_else(|| {
            CommandError::Config("Could not determine config directory".to_string())
        })
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("SMARTLIST_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    // Version 1 is the initial schema; later versions add steps here.
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Creates the parent directory of the config file.
fn ensure_config_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }
    Ok(())
}

/// Saves the configuration to disk.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;
    ensure_config_dir(&path)?;

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("Settings:");
            let entries = [
                ("catalog", &config.catalog),
                ("playlists_dir", &config.playlists_dir),
                ("rules_file", &config.rules_file),
                ("user", &config.user),
            ];
            for (key, value) in entries {
                if let Some(value) = value {
                    println!("  {}: {}", key, value);
                }
            }

            println!("\n[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }
        } else {
            println!("(No config file exists. Run 'smartlist config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    let created = if path.exists() && !force {
        false
    } else {
        ensure_config_dir(&path)?;
        fs::write(&path, DEFAULT_CONFIG)
            .map_err(|e| CommandError::Config(format!("Failed to create config file: {}", e)))?;
        true
    };

    if ctx.json_output {
        let output = serde_json::json!({
            "status": if created { "created" } else { "exists" },
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if created {
            println!("Created default config at: {}", path.display());
        } else {
            println!(
                "Config already exists at: {} (use --force to overwrite)",
                path.display()
            );
        }
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Applies a single `key = value` assignment to a config.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let (section, field) = match key.split_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };

    match (section, field) {
        (None, "catalog") => config.catalog = Some(value.to_string()),
        (None, "playlists_dir") => config.playlists_dir = Some(value.to_string()),
        (None, "rules_file") => config.rules_file = Some(value.to_string()),
        (None, "user") => config.user = Some(value.to_string()),
        (Some("output"), "color") => config.output.color = Some(parse_bool(value)?),
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: catalog, playlists_dir, rules_file, user, output.color",
                key
            )));
        }
    }

    Ok(())
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Points `SMARTLIST_CONFIG` at `path` for the duration of `f`.
    fn with_config_env<T>(path: &Path, f: impl FnOnce() -> T) -> T {
        let original = env::var("SMARTLIST_CONFIG").ok();
        env::set_var("SMARTLIST_CONFIG", path);
        let result = f();
        match original {
            Some(val) => env::set_var("SMARTLIST_CONFIG", val),
            None => env::remove_var("SMARTLIST_CONFIG"),
        }
        result
    }

    #[test]
    fn test_parse_bool_true_values() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("yes").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(parse_bool("on").unwrap());
    }

    #[test]
    fn test_parse_bool_false_values() {
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("No").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("off").unwrap());
    }

    #[test]
    fn test_parse_bool_invalid() {
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.catalog.is_none());
        assert!(config.user.is_none());
        assert!(config.output.color.is_none());
    }

    #[test]
    fn test_default_config_text_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1
catalog = "/srv/media/catalog.json"
user = "alice"

[output]
color = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog.as_deref(), Some("/srv/media/catalog.json"));
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.output.color, Some(false));
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.playlists_dir.is_none());
    }

    #[test]
    fn test_config_serialization_skips_unset() {
        let config = Config {
            catalog: Some("catalog.json".to_string()),
            ..Config::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("catalog = \"catalog.json\""));
        assert!(!toml_str.contains("rules_file"));
    }

    #[test]
    fn test_apply_setting_known_keys() {
        let mut config = Config::default();
        apply_setting(&mut config, "catalog", "/a.json").unwrap();
        apply_setting(&mut config, "playlists_dir", "/out").unwrap();
        apply_setting(&mut config, "rules_file", "/rules.json").unwrap();
        apply_setting(&mut config, "user", "bob").unwrap();
        apply_setting(&mut config, "output.color", "off").unwrap();

        assert_eq!(config.catalog.as_deref(), Some("/a.json"));
        assert_eq!(config.playlists_dir.as_deref(), Some("/out"));
        assert_eq!(config.rules_file.as_deref(), Some("/rules.json"));
        assert_eq!(config.user.as_deref(), Some("bob"));
        assert_eq!(config.output.color, Some(false));
    }

    #[test]
    fn test_apply_setting_unknown_key() {
        let mut config = Config::default();
        let err = apply_setting(&mut config, "output.width", "80").unwrap_err();
        assert!(err.to_string().contains("Unknown config key 'output.width'"));
    }

    #[test]
    fn test_settings_flag_overrides_config() {
        let cli = Cli::parse_from(["smartlist", "--catalog", "/flag.json", "rules"]);
        let config = Config {
            catalog: Some("/config.json".to_string()),
            rules_file: Some("/rules.json".to_string()),
            playlists_dir: Some("/out".to_string()),
            ..Config::default()
        };

        let settings = Settings::resolve(&cli, &config).unwrap();
        assert_eq!(settings.catalog().unwrap(), Path::new("/flag.json"));
        assert_eq!(settings.rules_file, PathBuf::from("/rules.json"));
        assert_eq!(settings.playlists_dir, PathBuf::from("/out"));
    }

    #[test]
    #[serial]
    fn test_settings_missing_catalog() {
        let original = env::var("SMARTLIST_CATALOG").ok();
        env::remove_var("SMARTLIST_CATALOG");
        let cli = Cli::parse_from(["smartlist", "rules"]);
        if let Some(val) = original {
            env::set_var("SMARTLIST_CATALOG", val);
        }

        let config = Config {
            rules_file: Some("/rules.json".to_string()),
            playlists_dir: Some("/out".to_string()),
            ..Config::default()
        };
        let settings = Settings::resolve(&cli, &config).unwrap();
        let err = settings.catalog().unwrap_err();
        assert!(err.to_string().contains("No catalog configured"));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");

        let resolved = with_config_env(&config_path, get_config_path).unwrap();
        assert_eq!(resolved, config_path);
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.toml");

        let config = with_config_env(&config_path, load_config).unwrap();
        assert!(config.catalog.is_none());
    }

    #[test]
    #[serial]
    fn test_save_then_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let loaded = with_config_env(&config_path, || {
            let mut config = Config::default();
            apply_setting(&mut config, "catalog", "/media/catalog.json")?;
            save_config(&config)?;
            load_config()
        })
        .unwrap();

        assert_eq!(loaded.catalog.as_deref(), Some("/media/catalog.json"));
    }

    #[test]
    #[serial]
    fn test_load_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "catalog = [").unwrap();

        let err = with_config_env(&config_path, load_config).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_migrate_config_sets_current_version() {
        let config = Config {
            version: 0,
            user: Some("alice".to_string()),
            ..Config::default()
        };
        let migrated = migrate_config(config).unwrap();
        assert_eq!(migrated.version, CONFIG_VERSION);
        assert_eq!(migrated.user.as_deref(), Some("alice"));
    }
}
