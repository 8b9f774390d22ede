//! Layered configuration
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Config file (explicit path, or `BLOCKRUN_CONFIG_PATH`)
//! 3. `BLOCKRUN_*` environment variables, `__` between nested keys
//! 4. Explicit builder overrides

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "BLOCKRUN";
pub const CONFIG_PATH_VAR: &str = "BLOCKRUN_CONFIG_PATH";

pub const DEFAULT_STEP_TIME_MS: u64 = 1000;
pub const MAX_STEP_TIME_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub interpreter: InterpreterSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterpreterSettings {
    /// Duration of one step, handed to every handler
    pub step_time_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpreter: InterpreterSettings {
                step_time_ms: DEFAULT_STEP_TIME_MS,
            },
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources with no overrides
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    fn validate(&self) -> Result<()> {
        if self.interpreter.step_time_ms > MAX_STEP_TIME_MS {
            bail!(
                "interpreter.step_time_ms must be at most {}, got {}",
                MAX_STEP_TIME_MS,
                self.interpreter.step_time_ms
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    step_time_ms: Option<u64>,
    /// Replaces the process environment when set
    vars: Option<HashMap<String, String>>,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn step_time_ms(mut self, step_time_ms: Option<u64>) -> Self {
        self.step_time_ms = step_time_ms;
        self
    }

    /// Read environment variables from `vars` instead of the process
    pub fn vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }

    pub fn build(self) -> Result<Config> {
        let config_path = self.config_path.clone().or_else(|| {
            self.var(CONFIG_PATH_VAR)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
        });

        let mut builder = config::Config::builder()
            .set_default("interpreter.step_time_ms", DEFAULT_STEP_TIME_MS as i64)
            .context("Failed to set configuration defaults")?;

        if let Some(path) = &config_path {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(self.vars.clone()),
        );

        if let Some(step_time_ms) = self.step_time_ms {
            let step_time_ms =
                i64::try_from(step_time_ms).context("step_time_ms override is out of range")?;
            builder = builder
                .set_override("interpreter.step_time_ms", step_time_ms)
                .context("Failed to apply step_time_ms override")?;
        }

        let config: Config = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}
