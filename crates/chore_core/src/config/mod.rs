use crate::completion::{CompletionOptions, DEFAULT_ADAPTIVE_WINDOW};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "CHORES_CONFIG_PATH";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How many recent completions the adaptive estimator looks at.
    #[serde(default)]
    pub adaptive_history_window: Option<usize>,
    /// Seeds the random assignment strategies for reproducible runs.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Config {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            adaptive_window: self
                .adaptive_history_window
                .unwrap_or(DEFAULT_ADAPTIVE_WINDOW),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub adaptive_history_window: Option<usize>,
    pub random_seed: Option<u64>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("chores").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("chores")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config() -> Result<Config, AppError> {
    let path = config_path()?;
    load_config_from_path(&path)
}

/// Loads the config, falling back to defaults. A missing file is not an error.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), AppError> {
    if config.adaptive_history_window == Some(0) {
        return Err(AppError::invalid_data(
            "adaptive_history_window must be at least 1",
        ));
    }
    Ok(())
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(window) = overrides.adaptive_history_window {
        merged.adaptive_history_window = Some(window);
    }
    if let Some(seed) = overrides.random_seed {
        merged.random_seed = Some(seed);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, load_config_from_path, load_config_with_fallback_from_path,
        merge_overrides,
    };
    use crate::completion::DEFAULT_ADAPTIVE_WINDOW;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("chores-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.unwrap().code(), "invalid_data");
    }

    #[test]
    fn load_config_reads_valid_file() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "adaptive_history_window": 8,
            "random_seed": 99
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.adaptive_history_window, Some(8));
        assert_eq!(loaded.random_seed, Some(99));
        assert_eq!(loaded.completion_options().adaptive_window, 8);
    }

    #[test]
    fn load_config_rejects_zero_window() {
        let path = temp_path("zero-window.json");
        fs::write(&path, r#"{ "adaptive_history_window": 0 }"#).unwrap();

        let err = load_config_from_path(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.message(), "adaptive_history_window must be at least 1");
    }

    #[test]
    fn default_config_uses_default_window() {
        let options = Config::default().completion_options();

        assert_eq!(options.adaptive_window, DEFAULT_ADAPTIVE_WINDOW);
    }

    #[test]
    fn merge_overrides_replaces_only_given_fields() {
        let base = Config {
            adaptive_history_window: Some(3),
            random_seed: Some(1),
        };
        let overrides = ConfigOverrides {
            adaptive_history_window: None,
            random_seed: Some(7),
        };

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(merged.adaptive_history_window, Some(3));
        assert_eq!(merged.random_seed, Some(7));
        assert_eq!(base.random_seed, Some(1));
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            adaptive_history_window: Some(4),
            random_seed: None,
        };

        let merged = merge_overrides(&base, &ConfigOverrides::default());

        assert_eq!(merged, base);
    }
}
