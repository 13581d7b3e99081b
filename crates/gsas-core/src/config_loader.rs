// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`GovernanceEngine`](crate::engine::GovernanceEngine).
//!
//! Two load strategies:
//!
//! 1. **TOML file**: [`load_config`] reads and deserialises a TOML file into
//!    a [`Config`].
//! 2. **Environment variables**: [`load_config_from_env`] reads `GSAS_`-prefixed
//!    environment variables.
//!
//! # File format
//!
//! ```toml
//! trace_level                   = "standard"   # "minimal" | "standard" | "detailed"
//! validate_contract_on_register = false
//! ```
//!
//! # Environment variables
//!
//! | Variable                              | Type    | Default    |
//! |---------------------------------------|---------|------------|
//! | `GSAS_TRACE_LEVEL`                    | string  | "standard" |
//! | `GSAS_VALIDATE_CONTRACT_ON_REGISTER`  | boolean | false      |

#![cfg(feature = "config-loader")]

use std::fs;
use std::path::Path;

use crate::config::{Config, TraceLevel};

/// Environment variable holding the trace level.
pub const ENV_TRACE_LEVEL: &str = "GSAS_TRACE_LEVEL";
/// Environment variable toggling contract validation on registration.
pub const ENV_VALIDATE_CONTRACT: &str = "GSAS_VALIDATE_CONTRACT_ON_REGISTER";

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file \"{path}\": {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The TOML content could not be deserialised.
    #[error("failed to parse TOML config: {source}")]
    TomlParse {
        #[from]
        source: toml::de::Error,
    },
    /// A field could not be parsed to its expected type.
    #[error("field \"{field}\": cannot parse \"{value}\": {reason}")]
    ParseField {
        field: String,
        value: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load a [`Config`] from a TOML file.  Missing fields take their defaults.
///
/// # Errors
///
/// [`ConfigError::FileRead`] if the file cannot be read, or
/// [`ConfigError::TomlParse`] if its content does not match the schema.
///
/// # Example
///
/// ```rust,no_run
/// use gsas_core::config_loader::load_config;
///
/// let config = load_config("/etc/gsas/governance.toml").unwrap();
/// println!("trace level: {}", config.trace_level);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&content)
}

/// Parse TOML text into a [`Config`].
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str::<Config>(content)?)
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load a [`Config`] from `GSAS_`-prefixed environment variables.
///
/// Unset variables fall back to their defaults.
///
/// # Errors
///
/// [`ConfigError::ParseField`] if a variable is set to a value that cannot
/// be parsed.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

fn config_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let trace_level = match lookup(ENV_TRACE_LEVEL) {
        Some(value) => parse_trace_level(&value)?,
        None => defaults.trace_level,
    };

    let validate_contract_on_register = match lookup(ENV_VALIDATE_CONTRACT) {
        Some(value) => parse_bool(ENV_VALIDATE_CONTRACT, &value)?,
        None => defaults.validate_contract_on_register,
    };

    Ok(Config {
        trace_level,
        validate_contract_on_register,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn parse_trace_level(value: &str) -> Result<TraceLevel, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "minimal"  => Ok(TraceLevel::Minimal),
        "standard" => Ok(TraceLevel::Standard),
        "detailed" => Ok(TraceLevel::Detailed),
        other => Err(ConfigError::ParseField {
            field: ENV_TRACE_LEVEL.into(),
            value: other.into(),
            reason: "expected one of: minimal, standard, detailed".into(),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true"  | "1" | "yes" | "on"  => Ok(true),
        "false" | "0" | "no"  | "off" => Ok(false),
        other => Err(ConfigError::ParseField {
            field: key.to_owned(),
            value: other.to_owned(),
            reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
        }),
    }
}
