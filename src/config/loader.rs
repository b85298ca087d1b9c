//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::caller::CallerRegistry;
use crate::error::SelectorError;
use crate::config::schema::{CallerConfig, SelectorConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Caller file parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated configuration together with every caller rule it names.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: SelectorConfig,
    /// Inline rules first, then rules from `callers_file`.
    pub callers: Vec<CallerConfig>,
    /// `callers_file` resolved against the config file's directory.
    pub callers_path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Build an initialized registry from the loaded rules.
    pub fn build_registry(&self) -> crate::error::Result<CallerRegistry> {
        CallerRegistry::from_configs(&self.callers)
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = read(path)?;
    let config: SelectorConfig = toml::from_str(&content)?;

    let mut callers = config.callers.clone();
    let callers_path = config.callers_file.as_ref().map(|file| {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        base.join(file)
    });
    if let Some(callers_path) = &callers_path {
        callers.extend(load_callers_json(callers_path)?);
    }

    validate_config(&config, &callers).map_err(ConfigError::Validation)?;

    tracing::debug!(path = ?path, callers = callers.len(), "Configuration loaded");
    Ok(LoadedConfig {
        config,
        callers,
        callers_path,
    })
}

/// Load the configuration and build its registry in one step.
pub fn load_registry(path: &Path) -> Result<(LoadedConfig, CallerRegistry), SelectorError> {
    let loaded = load_config(path)?;
    let registry = loaded.build_registry()?;
    Ok((loaded, registry))
}

/// Load a JSON array of caller rules.
pub fn load_callers_json(path: &Path) -> Result<Vec<CallerConfig>, ConfigError> {
    let content = read(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_inline_and_file_callers() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "callers.json",
            r#"[{"note": "lab", "ip": "10.1.*.*", "enable": true, "pref": ["b"]}]"#,
        );
        let path = write(
            &dir,
            "selector.toml",
            r#"
                callers_file = "callers.json"

                [[callers]]
                ip = "10.1.2.3"
                enable = true
                pref = ["a"]
            "#,
        );

        let loaded = load_config(&path).unwrap();
        let ips: Vec<_> = loaded.callers.iter().map(|c| c.ip.as_str()).collect();
        assert_eq!(loaded.callers_path, Some(dir.path().join("callers.json")));
        assert_eq!(ips, vec!["10.1.2.3", "10.1.*.*"]);

        let registry = loaded.build_registry().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.find_by_ip("10.1.9.9").note, "lab");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_registry_wraps_config_errors() {
        let dir = TempDir::new().unwrap();
        let err = load_registry(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SelectorError::Config(ConfigError::Io { .. })));
        assert!(err.to_string().starts_with("Configuration error: IO error reading"));
    }

    #[test]
    fn test_regex_only_caller_row_is_rejected_readably() {
        // Rows written for a regex matcher, such as alternations, are refused
        // and the message names the row and the offending pattern.
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "callers.json",
            r#"[{"ip": "10.0.0.*", "enable": true}, {"ip": "(1|2).0.0.1", "enable": true}]"#,
        );
        let path = write(&dir, "selector.toml", "callers_file = \"callers.json\"");

        let err = load_registry(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Validation failed: caller #1: \
             ip pattern \"(1|2).0.0.1\" contains invalid character '('"
        );
    }

    #[test]
    fn test_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "selector.toml", "callers = 3");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bad_json() {
        let dir = TempDir::new().unwrap();
        write(&dir, "callers.json", "{");
        let path = write(&dir, "selector.toml", "callers_file = \"callers.json\"");
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_invalid_pattern_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "selector.toml",
            r#"
                [[callers]]
                ip = "10.0.0.(1"
            "#,
        );
        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
