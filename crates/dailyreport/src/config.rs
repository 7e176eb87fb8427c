//! Configuration management for dailyreport.
//!
//! Configuration is loaded with figment from (later sources win):
//! 1. Default values
//! 2. TOML config file at `~/.config/dailyreport/config.toml`
//! 3. Environment variables prefixed with `DAILYREPORT_` (nested with `__`)
//! 4. The `REPORT_*` variables understood by earlier report scripts
//!    (`REPORT_API_URL`, `REPORT_API_KEY`, `REPORT_STRIP_THINK`, ...)
//!
//! Empty strings are treated as unset throughout. Environment values arrive
//! loosely typed (`REPORT_STRIP_THINK=yes`, `DAILYREPORT_API__KEY=123456`),
//! so scalar settings accept strings, numbers and booleans alike.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config/data dirs.
const APP_DIR_NAME: &str = "dailyreport";

/// Default ledger database file name.
const LEDGER_FILE_NAME: &str = "ledger.db";

/// Response path used when none is configured.
pub const DEFAULT_RESPONSE_PATH: &str = "choices.0.message.content";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where notes and reports live.
    pub workspace: WorkspaceConfig,
    /// Completion API connection settings.
    pub api: ApiConfig,
    /// Prompting and post-processing settings.
    pub generation: GenerationConfig,
    /// Hash ledger settings.
    pub ledger: LedgerConfig,
}

/// Workspace layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root. Defaults to the current directory.
    pub root: Option<PathBuf>,
    /// Scratch notes directory, relative to the root unless absolute.
    pub notes_dir: PathBuf,
    /// Daily reports directory, relative to the root unless absolute.
    pub daily_dir: PathBuf,
    /// Weekly summaries directory, relative to the root unless absolute.
    pub weekly_dir: PathBuf,
}

/// Completion API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Endpoint receiving the POST request. Required for generation.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
    /// API key; no auth header is sent without one.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub key: Option<String>,
    /// Model name substituted into the payload.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub model: Option<String>,
    /// Request timeout in seconds.
    #[serde(deserialize_with = "lenient::seconds")]
    pub timeout: u64,
    /// Comma-separated response paths, tried in order.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub response_paths: Option<String>,
    /// Single response path, used when `response_paths` is unset.
    #[serde(deserialize_with = "lenient::string")]
    pub response_path: String,
    /// Header carrying the credentials.
    #[serde(deserialize_with = "lenient::string")]
    pub auth_header: String,
    /// Scheme prefixed to the key. Empty sends the raw key.
    #[serde(deserialize_with = "lenient::string")]
    pub auth_scheme: String,
    /// JSON object of additional headers.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub extra_headers_json: Option<String>,
    /// JSON request template with `{{model}}`, `{{system_prompt}}` and
    /// `{{user_prompt}}` placeholders.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub request_template_json: Option<String>,
}

/// Prompting and post-processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Replaces the built-in system prompt when set.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub system_prompt: Option<String>,
    /// Remove reasoning blocks from model output.
    #[serde(deserialize_with = "lenient::enabled_flag")]
    pub strip_think: bool,
    /// Sampling temperature for the default payload.
    pub temperature: f64,
    /// Nucleus sampling for the default payload.
    pub top_p: f64,
}

/// Ledger settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Path to the ledger database.
    /// Defaults to `~/.local/share/dailyreport/ledger.db`
    pub database_path: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: None,
            notes_dir: PathBuf::from("notes"),
            daily_dir: PathBuf::from("reports").join("daily"),
            weekly_dir: PathBuf::from("reports").join("weekly"),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            model: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            response_paths: None,
            response_path: DEFAULT_RESPONSE_PATH.to_string(),
            auth_header: "Authorization".to_string(),
            auth_scheme: "Bearer".to_string(),
            extra_headers_json: None,
            request_template_json: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            strip_think: true,
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}

/// Deserializers for settings that may come from environment variables.
mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::DEFAULT_TIMEOUT_SECS;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub(super) fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    pub(super) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
    }

    /// A whole number of seconds. Blank means the default.
    pub(super) fn seconds<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().ok_or_else(|| {
                D::Error::custom(format!("invalid timeout {n}, expected whole seconds"))
            }),
            Value::String(s) if s.trim().is_empty() => Ok(DEFAULT_TIMEOUT_SECS),
            Value::String(s) => s.trim().parse().map_err(|_| {
                D::Error::custom(format!("invalid timeout {s:?}, expected whole seconds"))
            }),
            Value::Null => Ok(DEFAULT_TIMEOUT_SECS),
            other => Err(D::Error::custom(format!(
                "invalid timeout {other}, expected whole seconds"
            ))),
        }
    }

    /// A switch that is on unless explicitly turned off. Blank means on.
    pub(super) fn enabled_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v.abs() > f64::EPSILON),
            Value::String(s) if s.trim().is_empty() => true,
            Value::String(s) => super::is_truthy(&s),
            Value::Null => true,
            other => {
                return Err(D::Error::custom(format!(
                    "invalid switch {other}, expected true or false"
                )))
            }
        })
    }
}

/// `1`, `true`, `yes` and `on`, in any case, switch a setting on.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Map a `REPORT_`-prefixed variable (prefix already stripped) onto a
/// config key.
fn legacy_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    match key.strip_prefix("api_") {
        Some(rest) => format!("api.{rest}"),
        None => format!("generation.{key}"),
    }
}

/// Build the override layer for the legacy `REPORT_*` variables from raw
/// name/value pairs.
///
/// Blank values are skipped, except `REPORT_API_AUTH_SCHEME` where an empty
/// scheme selects the raw key. `REPORT_STRIP_THINK` becomes a boolean and
/// `REPORT_API_TIMEOUT` a number when it parses as one.
fn legacy_env_overrides<I>(vars: I) -> serde_json::Value
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = serde_json::Map::new();
    for (name, raw) in vars {
        let upper = name.to_ascii_uppercase();
        let Some(stripped) = upper.strip_prefix("REPORT_") else {
            continue;
        };
        let short = stripped.to_ascii_lowercase();
        if !LEGACY_ENV_KEYS.contains(&short.as_str()) {
            continue;
        }
        if raw.trim().is_empty() && short != "api_auth_scheme" {
            continue;
        }

        let value = match short.as_str() {
            "strip_think" => serde_json::Value::Bool(is_truthy(&raw)),
            "api_timeout" => match raw.trim().parse::<u64>() {
                Ok(secs) => secs.into(),
                Err(_) => serde_json::Value::String(raw),
            },
            "system_prompt" => serde_json::Value::String(raw),
            _ => serde_json::Value::String(raw.trim().to_string()),
        };

        let key = legacy_env_key(&short);
        if let Some((section, field)) = key.split_once('.') {
            if let Some(table) = root
                .entry(section)
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
                .as_object_mut()
            {
                table.insert(field.to_string(), value);
            }
        }
    }
    serde_json::Value::Object(root)
}

/// Environment variables that are valid UTF-8.
fn process_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}

/// Legacy `REPORT_*` variables accepted for compatibility.
const LEGACY_ENV_KEYS: &[&str] = &[
    "api_url",
    "api_key",
    "api_model",
    "api_timeout",
    "api_response_paths",
    "api_response_path",
    "api_auth_header",
    "api_auth_scheme",
    "api_extra_headers_json",
    "api_request_template_json",
    "strip_think",
    "system_prompt",
];

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        Self::from_figment(Self::figment(&Self::resolve_path(config_path)))
    }

    /// The config file that will be read: `custom` when given, otherwise
    /// the default location.
    #[must_use]
    pub fn resolve_path(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::default_config_path)
    }

    /// Build the layered figment for the given config file.
    #[must_use]
    pub fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("DAILYREPORT_").split("__"))
            .merge(Serialized::defaults(legacy_env_overrides(process_env())))
    }

    /// Extract, normalize and validate a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: Config = figment.extract()?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Treat empty and whitespace-only optional strings as unset.
    fn normalize(&mut self) {
        fn clear_blank(value: &mut Option<String>) {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }

        clear_blank(&mut self.api.url);
        clear_blank(&mut self.api.key);
        clear_blank(&mut self.api.model);
        clear_blank(&mut self.api.response_paths);
        clear_blank(&mut self.api.extra_headers_json);
        clear_blank(&mut self.api.request_template_json);
        clear_blank(&mut self.generation.system_prompt);

        if self.api.response_path.trim().is_empty() {
            self.api.response_path = DEFAULT_RESPONSE_PATH.to_string();
        }
        if self.api.auth_header.trim().is_empty() {
            self.api.auth_header = "Authorization".to_string();
        }
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(APP_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout == 0 {
            return Err(Error::ConfigValidation {
                message: "api.timeout must be greater than 0".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "generation.temperature ({}) must be between 0 and 2",
                    self.generation.temperature
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "generation.top_p ({}) must be between 0 and 1",
                    self.generation.top_p
                ),
            });
        }

        for (name, json) in [
            ("api.extra_headers_json", &self.api.extra_headers_json),
            ("api.request_template_json", &self.api.request_template_json),
        ] {
            if let Some(json) = json {
                match serde_json::from_str::<serde_json::Value>(json) {
                    Ok(serde_json::Value::Object(_)) => {}
                    Ok(_) => {
                        return Err(Error::ConfigValidation {
                            message: format!("{name} must be a JSON object"),
                        })
                    }
                    Err(e) => {
                        return Err(Error::ConfigValidation {
                            message: format!("{name} is not valid JSON: {e}"),
                        })
                    }
                }
            }
        }

        Ok(())
    }

    /// The API URL, or an error naming the setting to configure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSetting`] if no URL is configured.
    pub fn api_url(&self) -> Result<&str> {
        self.api.url.as_deref().ok_or(Error::MissingSetting {
            name: "REPORT_API_URL",
        })
    }

    /// Response paths to try, before built-in fallbacks are added.
    #[must_use]
    pub fn response_paths(&self) -> Vec<String> {
        let csv = self
            .api
            .response_paths
            .as_deref()
            .unwrap_or(&self.api.response_path);
        csv.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }

    /// Request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }

    /// Workspace root, resolving to the current directory when unset.
    #[must_use]
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace
            .root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Get the ledger path, resolving defaults if not set.
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LEDGER_FILE_NAME))
    }
}
