//! Configuration management for topparse.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use topparse::{CommandRule, ParseOptions, SortOrder, HEADER_LINES};
use tracing::info;

/// Upper bound accepted for `header_lines`.
pub const MAX_HEADER_LINES: usize = 1000;

/// Effective configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Parsing
    /// Summary lines skipped before the process table
    #[serde(alias = "header-lines")]
    pub header_lines: Option<usize>,
    /// "permissive" | "strict"
    #[serde(alias = "command-rule")]
    pub command_rule: Option<CommandRule>,

    // Reporting
    /// "ascending" | "descending"
    #[serde(alias = "sort-order")]
    pub sort_order: Option<SortOrder>,
    /// Default row limit for `walk`
    #[serde(alias = "walk-limit")]
    pub walk_limit: Option<usize>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_lines: Some(HEADER_LINES),
            command_rule: Some(CommandRule::Permissive),
            sort_order: Some(SortOrder::Descending),
            walk_limit: None,
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    /// Parse options derived from this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            header_lines: self.header_lines.unwrap_or(HEADER_LINES),
            command_rule: self.command_rule.unwrap_or_default(),
        }
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

/// Maps a config log level string onto the CLI enum.
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Some(LogLevel::Off),
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(n) = cfg.header_lines {
        if n > MAX_HEADER_LINES {
            return Err(format!(
                "header_lines {} exceeds maximum of {}",
                n, MAX_HEADER_LINES
            )
            .into());
        }
    }

    if cfg.walk_limit == Some(0) {
        return Err("walk_limit must be greater than 0 when set".into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if parse_log_level(level).is_none() {
            return Err(format!(
                "Invalid log_level '{}', expected off/error/warn/info/debug/trace",
                level
            )
            .into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(n) = args.header_lines {
        config.header_lines = Some(n);
    }
    if args.strict_commands {
        config.command_rule = Some(CommandRule::Strict);
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(format!("{:?}", level).to_lowercase());
    }

    Ok(config)
}

/// Configuration loading with multiple format support.
/// Keys missing from the file keep their default values.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        // Try default locations
        let defaults = [
            "/etc/topparse/topparse.yaml",
            "/etc/topparse/topparse.yml",
            "/etc/topparse/topparse.json",
            "./topparse.yaml",
            "./topparse.yml",
            "./topparse.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(merge_with_defaults(loaded))
}

fn merge_with_defaults(loaded: Config) -> Config {
    let defaults = Config::default();
    Config {
        header_lines: loaded.header_lines.or(defaults.header_lines),
        command_rule: loaded.command_rule.or(defaults.command_rule),
        sort_order: loaded.sort_order.or(defaults.sort_order),
        walk_limit: loaded.walk_limit.or(defaults.walk_limit),
        log_level: loaded.log_level.or(defaults.log_level),
    }
}

/// Renders configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_config(ext: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(ext)
            .tempfile()
            .expect("create temp config");
        file.write_all(content.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let cfg = Config::default();
        assert!(validate_effective_config(&cfg).is_ok());
        assert_eq!(cfg.parse_options(), ParseOptions::default());
        assert_eq!(cfg.sort_order(), SortOrder::Descending);
    }

    #[test]
    fn test_validate_rejects_large_header() {
        let cfg = Config {
            header_lines: Some(MAX_HEADER_LINES + 1),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_walk_limit() {
        let cfg = Config {
            walk_limit: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let cfg = Config {
            log_level: Some("loud".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_load_yaml_partial_keeps_defaults() {
        let file = write_config(".yaml", "command_rule: strict\nwalk-limit: 10\n");
        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.command_rule, Some(CommandRule::Strict));
        assert_eq!(cfg.walk_limit, Some(10));
        assert_eq!(cfg.header_lines, Some(HEADER_LINES));
        assert_eq!(cfg.sort_order, Some(SortOrder::Descending));
    }

    #[test]
    fn test_load_json_and_toml() {
        let json = write_config(".json", r#"{"sort_order": "ascending", "header_lines": 2}"#);
        let cfg = load_config(Some(json.path())).unwrap();
        assert_eq!(cfg.sort_order(), SortOrder::Ascending);
        assert_eq!(cfg.parse_options().header_lines, 2);

        let toml = write_config(".toml", "log_level = \"debug\"\n");
        let cfg = load_config(Some(toml.path())).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let cfg = load_config(Some(Path::new("/nonexistent/topparse.yaml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = write_config(".yaml", "header_lines: 6\ncommand_rule: permissive\n");
        let path = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "topparse",
            "-c",
            path.as_str(),
            "--header-lines",
            "3",
            "--strict-commands",
            "--log-level",
            "warn",
        ])
        .unwrap();
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.header_lines, Some(3));
        assert_eq!(cfg.command_rule, Some(CommandRule::Strict));
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_render_config_formats() {
        let cfg = Config::default();
        for format in [ConfigFormat::Yaml, ConfigFormat::Json, ConfigFormat::Toml] {
            let out = render_config(&cfg, &format).unwrap();
            assert!(out.contains("header_lines"));
        }
    }
}
