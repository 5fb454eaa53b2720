use chore_core::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a completion and decide the next due date and assignee
    ///
    /// Example: chores complete laundry.json --by 2
    /// Example: chores complete laundry.json --by 2 --at 2025-01-02T00:15:00Z --apply
    Complete {
        file: PathBuf,
        #[arg(long = "by", value_name = "USER_ID")]
        performed_by: i64,
        /// RFC 3339 timestamp, defaults to now
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// Write the decision back to the file
        #[arg(long)]
        apply: bool,
    },
    /// Skip the current occurrence
    ///
    /// Example: chores skip laundry.json --by 2 --rotate
    Skip {
        file: PathBuf,
        #[arg(long = "by", value_name = "USER_ID")]
        performed_by: i64,
        #[arg(long)]
        at: Option<String>,
        /// Hand the chore to the next assignee instead of keeping it
        #[arg(long)]
        rotate: bool,
        #[arg(long)]
        apply: bool,
    },
    /// Remove a user from the chore's assignees
    ///
    /// Example: chores unassign laundry.json --user 3 --apply
    Unassign {
        file: PathBuf,
        #[arg(long = "user", value_name = "USER_ID")]
        user: i64,
        #[arg(long)]
        apply: bool,
    },
    /// Show a chore and its history
    ///
    /// Example: chores show laundry.json
    Show { file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverride {
    AdaptiveHistoryWindow(usize),
    RandomSeed(u64),
}

/// Parse a raw `KEY=VALUE` override string into a typed override.
pub fn parse_config_override(raw: &str) -> Result<ConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;
    let value = value_raw.trim();

    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    match field.as_str() {
        "adaptive_history_window" | "adaptive_window" => {
            let window = value
                .parse::<usize>()
                .ok()
                .filter(|window| *window > 0)
                .ok_or_else(|| format!("{field} must be a positive integer, got '{value}'"))?;
            Ok(ConfigOverride::AdaptiveHistoryWindow(window))
        }
        "random_seed" | "seed" => {
            let seed = value
                .parse::<u64>()
                .map_err(|_| format!("{field} must be an unsigned integer, got '{value}'"))?;
            Ok(ConfigOverride::RandomSeed(seed))
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every `--config-override` into one set; later values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        match parse_config_override(entry)? {
            ConfigOverride::AdaptiveHistoryWindow(window) => {
                overrides.adaptive_history_window = Some(window);
            }
            ConfigOverride::RandomSeed(seed) => overrides.random_seed = Some(seed),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigOverride, collect_config_overrides, parse_config_override};

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" Adaptive-History-Window = 8 ").unwrap();

        assert_eq!(parsed, ConfigOverride::AdaptiveHistoryWindow(8));
    }

    #[test]
    fn parse_config_override_reads_seed() {
        let parsed = parse_config_override("random_seed=42").unwrap();

        assert_eq!(parsed, ConfigOverride::RandomSeed(42));
    }

    #[test]
    fn parse_config_override_rejects_zero_window() {
        let err = parse_config_override("adaptive_history_window=0").unwrap_err();
        assert!(err.contains("must be a positive integer"));
    }

    #[test]
    fn parse_config_override_rejects_non_numeric_seed() {
        let err = parse_config_override("seed=abc").unwrap_err();
        assert!(err.contains("must be an unsigned integer"));
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("theme=noir").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("random_seed").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn collect_config_overrides_keeps_last_value() {
        let raw = vec![
            "random_seed=1".to_string(),
            "adaptive_window=3".to_string(),
            "random_seed=9".to_string(),
        ];

        let overrides = collect_config_overrides(&raw).unwrap();

        assert_eq!(overrides.adaptive_history_window, Some(3));
        assert_eq!(overrides.random_seed, Some(9));
    }
}
