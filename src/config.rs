use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer};
use tracing::Level;

use crate::domain::RuleSet;
use crate::error::{RetentionError, Result};
use crate::rules::{parse_rule_set, ListInput, RuleInputs};

/// Prefix of environment variables carrying inputs, e.g. `INPUT_REPOSITORY`
pub const ENV_PREFIX: &str = "INPUT_";

const LOCAL_CONFIG: &str = "./retention.toml";
const USER_CONFIG: &str = ".retention.toml";

/// Raw inputs as supplied by the configuration file and environment.
///
/// Nothing here is validated yet; see [Settings::from_inputs].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Inputs {
    #[serde(default, deserialize_with = "lenient_string")]
    pub repository: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,

    #[serde(default, rename = "match", deserialize_with = "lenient_string")]
    pub match_pattern: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub retention: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub minimum: Option<String>,

    #[serde(default)]
    pub multiple: Option<ListInput>,

    #[serde(default)]
    pub unless: Option<ListInput>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub dryrun: Option<String>,

    #[serde(default)]
    pub log: LogConfig,
}

impl Inputs {
    /// The rule-related subset of the inputs
    pub fn rule_inputs(&self) -> RuleInputs {
        RuleInputs {
            match_pattern: self.match_pattern.clone(),
            retention: self.retention.clone(),
            minimum: self.minimum.clone(),
            multiple: self.multiple.clone(),
            unless: self.unless.clone(),
        }
    }
}

/// Scalar values may arrive as text (environment) or typed (TOML)
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Boolean(b) => b.to_string(),
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    /// The minimum level logged for this crate
    #[serde(deserialize_with = "deserialize_log_level", default = "default_log_level")]
    pub level: Level,
    /// The format of the produced logs
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> Level {
    Level::INFO
}

fn deserialize_log_level<'de, D>(deserializer: D) -> std::result::Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse::<Level>()
        .map_err(|_| serde::de::Error::custom(format!("unknown log level '{}'", text)))
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Registry credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated settings for one retention run
#[derive(Debug, Clone)]
pub struct Settings {
    pub repository: String,
    /// Present only when both username and password were given
    pub credentials: Option<Credentials>,
    pub rules: RuleSet,
    pub dry_run: bool,
}

impl Settings {
    /// Validates raw inputs into settings.
    ///
    /// All configuration errors surface here, before any registry call.
    pub fn from_inputs(inputs: &Inputs) -> Result<Self> {
        let repository = non_blank(&inputs.repository)
            .ok_or_else(|| RetentionError::missing_fields("inputs", &["repository"]))?
            .to_string();

        let credentials = match (non_blank(&inputs.username), non_blank(&inputs.password)) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        };

        let dry_run = match non_blank(&inputs.dryrun) {
            None => false,
            Some(text) => parse_flag(text).ok_or_else(|| {
                RetentionError::invalid_field(
                    "inputs",
                    "dryrun",
                    format!("expected true or false, found '{}'", text),
                )
            })?,
        };

        let rules = parse_rule_set(&inputs.rule_inputs())?;

        Ok(Settings {
            repository,
            credentials,
            rules,
            dry_run,
        })
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

/// Locates the configuration file.
///
/// Looks in the following order:
/// 1. Custom path provided as parameter (must exist)
/// 2. `retention.toml` in current directory
/// 3. `.retention.toml` in the user config directory
fn config_file(config_path: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(path) = config_path {
        let path = PathBuf::from(path);
        if !path.is_file() {
            return Err(RetentionError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    if Path::new(LOCAL_CONFIG).is_file() {
        return Ok(Some(PathBuf::from(LOCAL_CONFIG)));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG))
        .filter(|path| path.is_file()))
}

/// `INPUT_*` environment variables keyed by lowercase input name.
///
/// Values are kept as text; they are validated with the rest of the inputs.
fn environment_inputs() -> BTreeMap<String, String> {
    std::env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_ascii_lowercase(), value))
        })
        .collect()
}

/// Loads raw inputs from the configuration file, overlaid with `INPUT_*`
/// environment variables.
///
/// # Arguments
/// * `config_path` - Optional path to a custom configuration file
///
/// # Returns
/// * `Ok(Inputs)` - Merged inputs; empty when neither source sets anything
/// * `Err` - If the file is missing, unreadable or malformed
pub fn load_inputs(config_path: Option<&str>) -> Result<Inputs> {
    let mut figment = Figment::new();
    if let Some(path) = config_file(config_path)? {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Serialized::defaults(environment_inputs()));

    figment
        .extract::<Inputs>()
        .map_err(|e| RetentionError::config(e.to_string()))
}
