//! # PMOSpotify Configuration Module
//!
//! This module provides configuration management for PMOSpotify, including:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Environment variable overrides
//! - Typed access to configuration sections
//!
//! The configuration is read once and kept in memory for the lifetime of the
//! process. Nothing is written back to disk.
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! let config = get_config();
//! let level = config.get_log_min_level()?;
//! println!("Log level: {}", level);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmospotify.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(Config::load_config("").unwrap_or_else(|err| {
        warn!(error = %err, "Failed to load PMOSpotify configuration, using embedded defaults");
        Config::embedded()
    }));
}

const ENV_CONFIG_DIR: &str = "PMOSPOTIFY_CONFIG";
const ENV_PREFIX: &str = "PMOSPOTIFY_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmospotify";
const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// In-memory configuration tree
///
/// Keys are case-insensitive: every key is lowercased when loaded and every
/// lookup path is lowercased before use.
#[derive(Debug)]
pub struct Config {
    config_dir: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Config {
    /// Finds the config directory by trying different locations in order
    ///
    /// 1. The provided `directory` if not empty
    /// 2. The `PMOSPOTIFY_CONFIG` environment variable
    /// 3. `.pmospotify` in the current directory
    /// 4. `.pmospotify` in the user's home directory
    fn find_config_dir(directory: &str) -> Option<PathBuf> {
        if !directory.is_empty() {
            return Some(PathBuf::from(directory));
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        let local = Path::new(CONFIG_DIR_NAME);
        if local.is_dir() {
            return Some(local.to_path_buf());
        }

        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .filter(|path| path.is_dir())
    }

    /// Loads the configuration
    ///
    /// The embedded defaults are merged with `config.yaml` from the config
    /// directory when it exists, then `PMOSPOTIFY_CONFIG__A__B=value`
    /// environment variables are applied on top.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);

        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match config_dir.as_ref().map(|dir| dir.join(CONFIG_FILE_NAME)) {
            Some(path) if path.is_file() => {
                let data = fs::read(&path)?;
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut value, &lower_keys_value(external));
                info!(config_file = %path.display(), "Loaded config file");
            }
            Some(path) => {
                info!(config_file = %path.display(), "Config file not found, using embedded defaults");
            }
            None => info!("No config directory found, using embedded defaults"),
        }

        let mut value = lower_keys_value(value);
        apply_overrides(&mut value, env::vars());

        Ok(Self {
            config_dir,
            data: Mutex::new(value),
        })
    }

    /// Builds a configuration from a YAML document merged over the defaults
    ///
    /// Environment variables are ignored, which makes this the entry point
    /// for tests and embedders that manage their own settings.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &lower_keys_value(external));

        Ok(Self {
            config_dir: None,
            data: Mutex::new(lower_keys_value(value)),
        })
    }

    /// The embedded default configuration alone
    pub fn embedded() -> Self {
        let value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap_or(Value::Mapping(Mapping::new()));
        Self {
            config_dir: None,
            data: Mutex::new(lower_keys_value(value)),
        }
    }

    /// Directory the configuration was loaded from, if any
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Sets a configuration value at the specified path
    ///
    /// Intermediate mappings are created as needed. The change lives in
    /// memory only.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))?;
        set_value_internal(&mut data, path, value)
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))?;
        get_value_internal(&data, path)
    }

    /// Deserializes the sub-tree at `path` into `T`
    ///
    /// Returns `Ok(None)` when the path is absent.
    pub fn get_section<T: DeserializeOwned>(&self, path: &[&str]) -> Result<Option<T>> {
        match self.get_value(path) {
            Ok(value) => Ok(Some(serde_yaml::from_value(value)?)),
            Err(_) => Ok(None),
        }
    }

    /// Gets a non-empty string value, `None` when absent, empty or not a string
    pub fn get_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    /// Minimum log level, used to build the tracing filter
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    pub fn set_log_min_level(&self, level: &str) -> Result<()> {
        self.set_value(
            &["host", "logger", "min_level"],
            Value::String(level.to_string()),
        )
    }
}

/// Returns the global configuration instance, loaded on first access
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        let Value::Mapping(map) = current else {
            return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
        };
        current = map
            .get(&Value::String(key.to_lowercase()))
            .ok_or_else(|| anyhow!("Path {} does not exist", path[..=i].join(".")))?;
    }
    Ok(current.clone())
}

/// Applies `PMOSPOTIFY_CONFIG__A__B=value` pairs to the tree
///
/// Values are parsed as YAML scalars so numbers and booleans keep their type.
fn apply_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path = stripped.split("__").collect::<Vec<_>>();
        if let Err(err) = set_value_internal(config, &key_path, convert_env_value(&value)) {
            warn!(variable = %key, error = %err, "Ignoring configuration override");
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
