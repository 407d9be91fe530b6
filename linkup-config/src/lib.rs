//! Loader for client settings with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, and `LINKUP_`-prefixed
//! environment variables always win (`LINKUP_API_KEY`, `LINKUP_BASE_URL`,
//! `LINKUP_TIMEOUT_SECS`). String values may reference other variables as
//! `${VAR}`; expansion happens after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "LINKUP_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.linkup.so";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientSettings {
    /// Reject settings no client could work with.
    ///
    /// ```
    /// use linkup_config::ClientSettings;
    ///
    /// let mut s = ClientSettings::default();
    /// assert!(s.validate().is_ok());
    /// s.base_url = "not a url".into();
    /// assert!(s.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Message(format!("invalid base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "base_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Message("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// The configured key, if present and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct SettingsLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Start with defaults; `LINKUP_` environment overrides are applied last.
    ///
    /// ```
    /// use linkup_config::SettingsLoader;
    ///
    /// let settings = SettingsLoader::new()
    ///     .with_yaml_str("timeout_secs: 12")
    ///     .load()
    ///     .expect("valid settings");
    ///
    /// assert_eq!(settings.timeout_secs, 12);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`SettingsLoader::with_file`], but a missing file is not an error.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into [`ClientSettings`].
    ///
    /// ```
    /// use linkup_config::SettingsLoader;
    ///
    /// unsafe { std::env::set_var("LINKUP_DOCTEST_KEY", "injected-from-env"); }
    ///
    /// let settings = SettingsLoader::new()
    ///     .with_yaml_str(r#"
    /// api_key: "${LINKUP_DOCTEST_KEY}"
    /// base_url: "http://localhost:8080"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(settings.api_key(), Some("injected-from-env"));
    /// assert_eq!(settings.base_url, "http://localhost:8080");
    ///
    /// unsafe { std::env::remove_var("LINKUP_DOCTEST_KEY"); }
    /// ```
    pub fn load(self) -> Result<ClientSettings, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("LINKUP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;

        // try_parsing would read keys like `0123` or `true` as numbers/bools
        if let Some(raw) = std::env::var_os(API_KEY_ENV) {
            v["api_key"] = Value::String(raw.to_string_lossy().into_owned());
        } else if let Some(Value::Number(n)) = v.get("api_key") {
            let key = n.to_string();
            v["api_key"] = Value::String(key);
        }
        expand_env_in_value(&mut v);

        let typed: ClientSettings =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
