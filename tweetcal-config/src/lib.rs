//! Service configuration: built-in defaults, an optional YAML file, and
//! `TWEETCAL__`-prefixed environment overrides, with `${VAR}` expansion.
//!
//! Secrets default to `${TWITTER_BEARER_TOKEN}`, `${OPENAI_ORGANIZATION}` and
//! `${OPENAI_API_KEY}`, so exporting those three variables is enough to run
//! without any file.
use config::{Config, Environment, File};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tweetcal_llm::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, DEFAULT_TEMPERATURE};
use tweetcal_social::twitter::DEFAULT_TWITTER_ENDPOINT;

pub use config::ConfigError;

/// Environment overrides are `TWEETCAL__<SECTION>__<KEY>`.
const ENV_PREFIX: &str = "TWEETCAL";
const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Secret placeholders filled in when neither the file nor `TWEETCAL__*`
/// overrides provide a value.
const SECRET_DEFAULTS: [(&str, &str, &str); 3] = [
    ("twitter", "bearer_token", "${TWITTER_BEARER_TOKEN}"),
    ("openai", "organization", "${OPENAI_ORGANIZATION}"),
    ("openai", "api_key", "${OPENAI_API_KEY}"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub twitter: TwitterConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Outbound request tuning shared by both API clients.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retries: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: 0,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    pub bearer_token: String,
    #[serde(default = "default_twitter_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub organization: Option<String>,
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
}

impl OpenAiConfig {
    /// Organization ID, or `None` when unset or left as an unresolved placeholder.
    pub fn organization(&self) -> Option<&str> {
        self.organization
            .as_deref()
            .map(str::trim)
            .filter(|org| is_resolved(org))
    }
}

impl ServiceConfig {
    /// Reject missing credentials before any request is served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("twitter.bearer_token", "TWITTER_BEARER_TOKEN", &self.twitter.bearer_token)?;
        require("openai.api_key", "OPENAI_API_KEY", &self.openai.api_key)?;
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::Message(format!(
                "openai.temperature must be within 0.0..=2.0, got {}",
                self.openai.temperature
            )));
        }
        Ok(())
    }
}

fn require(key: &str, env: &str, value: &str) -> Result<(), ConfigError> {
    if is_resolved(value.trim()) {
        Ok(())
    } else {
        Err(ConfigError::Message(format!(
            "{key} is not set (export {env} or configure it in the config file)"
        )))
    }
}

fn is_resolved(value: &str) -> bool {
    !value.is_empty() && !value.contains("${")
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_twitter_endpoint() -> String {
    DEFAULT_TWITTER_ENDPOINT.into()
}
fn default_openai_endpoint() -> String {
    DEFAULT_OPENAI_ENDPOINT.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn apply_secret_defaults(v: &mut Value) {
    if !v.is_object() {
        *v = Value::Object(Map::new());
    }
    let Some(root) = v.as_object_mut() else {
        return;
    };
    for (section, key, placeholder) in SECRET_DEFAULTS {
        let entry = root
            .entry(section)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(obj) = entry.as_object_mut() {
            obj.entry(key)
                .or_insert_with(|| Value::String(placeholder.to_string()));
        }
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
                        Err(_) => break,
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

/// Wraps the `config` crate wiring.
pub struct ServiceConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ServiceConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConfigLoader {
    /// Defaults plus environment overrides: `TWEETCAL__OPENAI__MODEL=gpt-4o`
    /// sets `openai.model`. Environment always wins over attached files.
    ///
    /// ```
    /// use tweetcal_config::ServiceConfigLoader;
    ///
    /// let cfg = ServiceConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  bearer_token: t\nopenai:\n  api_key: k\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.openai.model, "gpt-3.5-turbo");
    /// assert_eq!(cfg.server.bind.port(), 8787);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize.
    ///
    /// Unresolved secrets are left as placeholders; call
    /// [`ServiceConfig::validate`] to reject them.
    ///
    /// ```
    /// use tweetcal_config::ServiceConfigLoader;
    ///
    /// temp_env::with_vars(
    ///     [
    ///         ("TWITTER_BEARER_TOKEN", Some("bearer-from-env")),
    ///         ("OPENAI_API_KEY", Some("sk-from-env")),
    ///         ("OPENAI_ORGANIZATION", None),
    ///     ],
    ///     || {
    ///         let cfg = ServiceConfigLoader::new().load().expect("valid configuration");
    ///         assert_eq!(cfg.twitter.bearer_token, "bearer-from-env");
    ///         assert_eq!(cfg.openai.api_key, "sk-from-env");
    ///         assert_eq!(cfg.openai.organization(), None);
    ///         cfg.validate().expect("secrets resolved");
    ///     },
    /// );
    /// ```
    pub fn load(self) -> Result<ServiceConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        apply_secret_defaults(&mut v);
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
