// Configuration loading and parsing (config/protodraft.toml).
//
// The config file is optional; a missing file means built-in defaults. Both
// binaries share it: the importer reads [paths], the drafter reads both
// sections.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::draft::rules;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub rules: RulesConfig,
}

/// The `[paths]` table: where the catalog lives and where the importer
/// looks for the spreadsheet export when no arguments are given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog: String,
    pub import_csv: String,
}

/// The `[rules]` table: knobs for the Blind Elimination procedure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Pool size the random culling phase reduces to.
    pub cull_target: usize,
    /// Interactive eliminations per player before the standard turns.
    pub eliminations_per_player: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            paths: PathsConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            catalog: "protocols.json".to_string(),
            import_csv: "Protocols.csv".to_string(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            cull_target: 9,
            eliminations_per_player: 1,
        }
    }
}

impl RulesConfig {
    /// Smallest pool a set selection must yield before a draft can start.
    /// Covers both procedures: the cull target for Blind Elimination, and
    /// the standard schedule's total picks for Standard.
    pub fn min_pool(&self) -> usize {
        self.cull_target.max(rules::standard_pick_total())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load `config/protodraft.toml` relative to `base_dir`. A missing file is
/// not an error; defaults apply.
pub fn load_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("protodraft.toml");
    if !path.exists() {
        return Ok(Config::default());
    }

    let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working
/// directory.
pub fn load() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    load_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let r = &config.rules;

    if r.cull_target == 0 {
        return Err(ConfigError::Validation {
            field: "rules.cull_target".into(),
            message: "must be greater than 0".into(),
        });
    }

    // The pool left after culling and both players' eliminations must still
    // cover the standard schedule's six picks.
    let picks = rules::standard_pick_total();
    let eliminated = 2 * r.eliminations_per_player;
    if r.cull_target < eliminated + picks {
        return Err(ConfigError::Validation {
            field: "rules.cull_target".into(),
            message: format!(
                "must be at least {} ({} eliminations + {} standard picks), got {}",
                eliminated + picks,
                eliminated,
                picks,
                r.cull_target
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(dir.path()).unwrap();
        assert_eq!(config.paths.catalog, "protocols.json");
        assert_eq!(config.paths.import_csv, "Protocols.csv");
        assert_eq!(config.rules.cull_target, 9);
        assert_eq!(config.rules.eliminations_per_player, 1);
    }

    #[test]
    fn default_rules_pass_validation() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/protodraft.toml"),
            "[rules]\ncull_target = 12\n",
        )
        .unwrap();

        let config = load_from(dir.path()).unwrap();
        assert_eq!(config.rules.cull_target, 12);
        assert_eq!(config.rules.eliminations_per_player, 1);
        assert_eq!(config.paths.catalog, "protocols.json");
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/protodraft.toml"),
            "this is not valid [[[ toml",
        )
        .unwrap();

        let err = load_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn rejects_cull_target_too_small_for_schedule() {
        // 7 - 2*1 = 5 < 6 standard picks
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/protodraft.toml"),
            "[rules]\ncull_target = 7\n",
        )
        .unwrap();

        let err = load_from(dir.path()).unwrap_err();
        match &err {
            ConfigError::Validation { field, .. } => assert_eq!(field, "rules.cull_target"),
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[test]
    fn rejects_extra_eliminations_without_larger_cull_target() {
        // 9 - 2*2 = 5 < 6 standard picks
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/protodraft.toml"),
            "[rules]\neliminations_per_player = 2\n",
        )
        .unwrap();

        let err = load_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }), "got: {err}");
    }

    #[test]
    fn min_pool_covers_both_procedures() {
        let rules = RulesConfig::default();
        assert_eq!(rules.min_pool(), 9);

        let shrunk = RulesConfig {
            cull_target: 6,
            eliminations_per_player: 0,
        };
        // cull target 6 is valid with no eliminations; the standard picks
        // still require 6
        assert_eq!(shrunk.min_pool(), 6);
    }
}
