//! CLI configuration
//!
//! Stored as TOML, by default under the user's config directory. The
//! `[planner]` table holds the engine's tunable constants.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wayfinder_routing::PlannerConfig;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "WAYFINDER_CONFIG";

/// Top-level keys, in listing order
const TOP_LEVEL_KEYS: [&str; 4] = ["world", "format", "seed", "exact"];

/// Location of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wayfinder")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// World snapshot used when `--world` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world: Option<PathBuf>,

    /// Output format: table or json
    pub format: String,

    /// Fixed perception seed; unset means one stream per agent trip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Plan without perception error
    pub exact: bool,

    pub planner: PlannerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: None,
            format: "table".to_string(),
            seed: None,
            exact: false,
            planner: PlannerConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it is missing or unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Every settable key; planner constants are prefixed with `planner.`
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = TOP_LEVEL_KEYS.iter().map(|k| k.to_string()).collect();
        let planner = PlannerConfig::default().with_hull_buffer(0.0);
        if let Ok(toml::Value::Table(table)) = toml::Value::try_from(planner) {
            keys.extend(table.keys().map(|k| format!("planner.{}", k)));
        }
        keys
    }

    pub fn is_key(key: &str) -> bool {
        Self::keys().iter().any(|k| k == key)
    }

    /// Current value of `key`; `None` for unknown or unset keys
    pub fn get(&self, key: &str) -> Option<String> {
        if !Self::is_key(key) {
            return None;
        }
        let root = toml::Value::try_from(self).ok()?;
        let value = key.split('.').try_fold(&root, |value, part| value.get(part))?;
        Some(match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set `key` from its textual form, checking the result still parses
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if !Self::is_key(key) {
            anyhow::bail!("Unknown config key: {}", key);
        }

        let mut root = toml::Value::try_from(&*self)?;
        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        let table = match parent {
            Some(parent) => root.get_mut(parent),
            None => Some(&mut root),
        }
        .and_then(|v| v.as_table_mut())
        .with_context(|| format!("config table for {} is missing", key))?;
        table.insert(leaf.to_string(), parse_value(value));

        let updated: Config = root
            .try_into()
            .with_context(|| format!("invalid value for {}: {}", key, value))?;
        updated.planner.validate()?;
        *self = updated;
        Ok(())
    }

    /// Restore `key` to its default by dropping it and re-reading the rest
    pub fn unset(&mut self, key: &str) -> anyhow::Result<()> {
        if !Self::is_key(key) {
            anyhow::bail!("Unknown config key: {}", key);
        }
        let mut root = toml::Value::try_from(&*self)?;
        let (table, leaf) = match key.split_once('.') {
            Some((parent, leaf)) => (root.get_mut(parent).and_then(|v| v.as_table_mut()), leaf),
            None => (root.as_table_mut(), key),
        };
        if let Some(table) = table {
            table.remove(leaf);
        }
        *self = root.try_into()?;
        Ok(())
    }
}

/// Typed TOML value for a command-line string
fn parse_value(value: &str) -> toml::Value {
    if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else if let Ok(b) = value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else {
        toml::Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_cover_planner_table() {
        let keys = Config::keys();
        assert!(keys.contains(&"format".to_string()));
        assert!(keys.contains(&"planner.gateway_cone".to_string()));
        assert!(keys.contains(&"planner.hull_buffer".to_string()));
    }

    #[test]
    fn test_get_and_set() {
        let mut config = Config::default();
        assert_eq!(config.get("format").as_deref(), Some("table"));
        assert_eq!(config.get("seed"), None);
        assert_eq!(config.get("nonsense"), None);

        config.set("seed", "42").unwrap();
        assert_eq!(config.seed, Some(42));
        config.set("planner.visibility_threshold", "250").unwrap();
        assert_eq!(config.planner.visibility_threshold, 250.0);
        config.set("exact", "true").unwrap();
        assert!(config.exact);
        config.set("world", "city.json").unwrap();
        assert_eq!(config.world, Some(PathBuf::from("city.json")));
    }

    #[test]
    fn test_unset_restores_defaults() {
        let mut config = Config::default();
        config.set("world", "city.json").unwrap();
        config.set("planner.gateway_cone", "90").unwrap();

        config.unset("planner.gateway_cone").unwrap();
        assert_eq!(config.planner.gateway_cone, PlannerConfig::default().gateway_cone);
        config.unset("world").unwrap();
        assert_eq!(config.world, None);
        assert_eq!(config, Config::default());
        assert!(config.unset("colour").is_err());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("planner.salient_percentile", "3.5").is_err());
        assert!(config.set("planner.gateway_cone", "wide").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_round_trip_keeps_defaults() {
        let config: Config = toml::from_str("format = \"json\"\n[planner]\nperception_sd = 0.2\n").unwrap();
        assert_eq!(config.format, "json");
        assert_eq!(config.planner.perception_sd, 0.2);
        assert_eq!(config.planner.gateway_cone, 140.0);
    }
}
