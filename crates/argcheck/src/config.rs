//! Checking configuration.
//!
//! Layers, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. A TOML document (`CheckConfig::from_toml_str`)
//! 3. Environment variables (`ARGCHECK_POLICY`, `ARGCHECK_MAX_REPR_LEN`)

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_POLICY: &str = "ARGCHECK_POLICY";
pub const ENV_MAX_REPR_LEN: &str = "ARGCHECK_MAX_REPR_LEN";

const DEFAULT_MAX_REPR_LEN: usize = 200;
const MIN_MAX_REPR_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid violation policy: {value}. Must be one of: fail-fast, collect-all")]
    InvalidPolicy { value: String },

    #[error("Invalid {field} value '{value}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

// ═══════════════════════════════════════════════════════════════════════════
// VIOLATION POLICY
// ═══════════════════════════════════════════════════════════════════════════

/// What a call does once it has found a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationPolicy {
    /// Stop at the first violation.
    #[default]
    FailFast,
    /// Check every parameter and report all violations together.
    CollectAll,
}

impl<'de> Deserialize<'de> for ViolationPolicy {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for ViolationPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail" => Ok(Self::FailFast),
            "collect-all" | "collectall" | "collect" | "all" => Ok(Self::CollectAll),
            _ => Err(ConfigError::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ViolationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::CollectAll => write!(f, "collect-all"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub policy: ViolationPolicy,
    /// Longest value rendering written to logs before it is cut off.
    pub max_repr_len: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            policy: ViolationPolicy::default(),
            max_repr_len: DEFAULT_MAX_REPR_LEN,
        }
    }
}

impl CheckConfig {
    #[must_use]
    pub const fn with_policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_max_repr_len(mut self, max_repr_len: usize) -> Self {
        self.max_repr_len = max_repr_len;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// ```toml
    /// policy = "collect-all"
    /// max_repr_len = 80
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ARGCHECK_*` environment variable overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup, e.g. the process environment.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // ARGCHECK_POLICY
        if let Some(value) = lookup(ENV_POLICY) {
            self.policy = value.parse()?;
        }

        // ARGCHECK_MAX_REPR_LEN
        if let Some(value) = lookup(ENV_MAX_REPR_LEN) {
            self.max_repr_len = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    field: ENV_MAX_REPR_LEN,
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_repr_len < MIN_MAX_REPR_LEN {
            return Err(ConfigError::InvalidValue {
                field: "max_repr_len",
                value: self.max_repr_len.to_string(),
                reason: format!("must be at least {MIN_MAX_REPR_LEN}"),
            });
        }
        Ok(())
    }
}
