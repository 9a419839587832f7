//! Environment snapshot and per-invocation configuration.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

use restamp_domain::{NAME_ENV_VAR, VERSION_ENV_VAR};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

/// Process environment captured once before any command runs.
#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) overrides: OverrideConfig,
    pub(crate) output: OutputConfig,
}

/// Environment-sourced override values; flags take precedence at resolution.
#[derive(Debug, Clone)]
pub struct OverrideConfig {
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dist_dir: String,
}

impl Config {
    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Self {
        Self {
            overrides: OverrideConfig {
                name: snapshot.var(NAME_ENV_VAR).map(ToOwned::to_owned),
                version: snapshot.var(VERSION_ENV_VAR).map(ToOwned::to_owned),
            },
            output: OutputConfig {
                dist_dir: snapshot
                    .var("RESTAMP_DIST_DIR")
                    .unwrap_or("dist")
                    .to_string(),
            },
        }
    }

    #[must_use]
    pub fn overrides(&self) -> &OverrideConfig {
        &self.overrides
    }

    #[must_use]
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}
