use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable supplying the optional build identifier.
pub const BUILD_ID_ENV: &str = "HERALD_BUILD_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("invalid build id '{value}' in {var}: not an integer")]
    BuildId { var: String, value: String },
}

/// Operator configuration as decoded from the host, before validation.
///
/// Every field is optional at decode time; [`Config::from_raw`] enforces the
/// required-field invariant in one aggregate pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub artifact_name: String,
    #[serde(default)]
    pub artifact_type: String,
    #[serde(default)]
    pub artifact_type_override: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    #[serde(default)]
    pub aws_access_key: String,
    #[serde(default)]
    pub aws_secret_key: String,
    #[serde(default)]
    pub aws_token: String,

    #[serde(default)]
    pub kv_address: String,
    #[serde(default)]
    pub kv_scheme: String,
    #[serde(default)]
    pub kv_token: String,

    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub project_version: String,
}

/// Validated operator configuration, immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub artifact_name: String,
    pub artifact_type: String,
    pub type_override: bool,
    pub metadata: BTreeMap<String, String>,

    pub aws_access_key: String,
    pub aws_secret_key: String,
    pub aws_token: String,

    pub kv_address: String,
    pub kv_scheme: String,
    pub kv_token: String,

    pub project_name: String,
    pub project_version: String,

    /// From the environment at configure time; absent means unset, not zero.
    pub build_id: Option<i64>,
}

impl Config {
    /// Validate a raw configuration, reading the build id from
    /// [`BUILD_ID_ENV`].
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        Self::from_raw_with_build_env(raw, BUILD_ID_ENV)
    }

    /// Validate a raw configuration with an explicit build-id variable name.
    pub fn from_raw_with_build_env(raw: RawConfig, build_env: &str) -> Result<Self, ConfigError> {
        let required = [
            ("artifact_name", &raw.artifact_name),
            ("artifact_type", &raw.artifact_type),
            ("kv_address", &raw.kv_address),
            ("aws_access_key", &raw.aws_access_key),
            ("aws_secret_key", &raw.aws_secret_key),
            ("project_name", &raw.project_name),
            ("project_version", &raw.project_version),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| (*name).to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields(missing));
        }

        let build_id = read_build_id(build_env)?;

        let kv_scheme = if raw.kv_scheme.is_empty() {
            "http".to_owned()
        } else {
            raw.kv_scheme
        };

        Ok(Self {
            artifact_name: raw.artifact_name,
            artifact_type: raw.artifact_type,
            type_override: raw.artifact_type_override,
            metadata: raw.metadata,
            aws_access_key: raw.aws_access_key,
            aws_secret_key: raw.aws_secret_key,
            aws_token: raw.aws_token,
            kv_address: raw.kv_address,
            kv_scheme,
            kv_token: raw.kv_token,
            project_name: raw.project_name,
            project_version: raw.project_version,
            build_id,
        })
    }
}

fn read_build_id(var: &str) -> Result<Option<i64>, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => {
            let parsed = parse_build_id(&value).ok_or_else(|| ConfigError::BuildId {
                var: var.to_owned(),
                value,
            })?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

/// Base-flexible integer parse: decimal, `0x` hex, `0o` or legacy `0`-prefix
/// octal, and `0b` binary, with an optional leading sign.
pub fn parse_build_id(input: &str) -> Option<i64> {
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if digits.is_empty() {
        return None;
    }

    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if lower != "0" && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    let magnitude = i64::from_str_radix(body, radix).ok()?;
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

pub fn parse_config_str(input: &str) -> Result<RawConfig, ConfigError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_config_file(path: impl AsRef<Path>) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}
