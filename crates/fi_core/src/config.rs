//! Environment-driven settings.
//!
//! [`Settings::from_env`] loads a `.env` file if one exists and reads the
//! `FI_MCP_*` variables. Every setting also has a `with_*` builder so the
//! command line can override the environment.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `FI_MCP_MODULE` | module name | `fi` |
//! | `FI_MCP_TOOL_PREFIX` | any string | empty |
//! | `FI_MCP_DOC_POLICY` | `exclude`, `degrade`, `strict` | `exclude` |
//! | `FI_MCP_UNKNOWN_ARGS` | `reject`, `ignore` | `reject` |
//! | `FI_MCP_DENYLIST` | comma separated names | empty |
//! | `FI_MCP_LOG_LEVEL` | `trace` .. `error` | `info` |
//! | `FI_MCP_LOG_FORMAT` | `pretty`, `compact`, `json` | `pretty` |
//! | `FI_MCP_LOG_FILTER` | `EnvFilter` directives | none |

use crate::tracing_setup::{TracingFormat, TracingSetup};
use fi_tools::{CatalogOptions, DocPolicy, UnknownArguments};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Module exposed when none is configured.
pub const DEFAULT_MODULE: &str = "fi";

/// Errors reading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A `.env` file exists but could not be read.
    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),
}

/// Server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Module to expose.
    pub module: String,
    /// Prefix for tool names.
    pub tool_prefix: String,
    /// Treatment of incompletely documented functions.
    pub doc_policy: DocPolicy,
    /// Treatment of undeclared arguments.
    pub unknown_arguments: UnknownArguments,
    /// Functions never exposed.
    pub denylist: Vec<String>,
    /// Log level.
    pub log_level: Level,
    /// Log output format.
    pub log_format: TracingFormat,
    /// Target-specific log filter directives.
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            tool_prefix: String::new(),
            doc_policy: DocPolicy::default(),
            unknown_arguments: UnknownArguments::default(),
            denylist: Vec::new(),
            log_level: Level::INFO,
            log_format: TracingFormat::default(),
            log_filter: None,
        }
    }
}

impl Settings {
    /// Loads `.env` (if present) and reads the process environment.
    ///
    /// # Errors
    ///
    /// Fails when `.env` is unreadable or a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Fails when a variable has an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(module) = get("FI_MCP_MODULE") {
            settings.module = module.trim().to_string();
        }
        if let Some(prefix) = get("FI_MCP_TOOL_PREFIX") {
            settings.tool_prefix = prefix.trim().to_string();
        }
        if let Some(policy) = get("FI_MCP_DOC_POLICY") {
            settings.doc_policy = parse("FI_MCP_DOC_POLICY", &policy)?;
        }
        if let Some(policy) = get("FI_MCP_UNKNOWN_ARGS") {
            settings.unknown_arguments = parse("FI_MCP_UNKNOWN_ARGS", &policy)?;
        }
        if let Some(list) = get("FI_MCP_DENYLIST") {
            settings.denylist = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(level) = get("FI_MCP_LOG_LEVEL") {
            settings.log_level = parse("FI_MCP_LOG_LEVEL", &level)?;
        }
        if let Some(format) = get("FI_MCP_LOG_FORMAT") {
            settings.log_format = parse("FI_MCP_LOG_FORMAT", &format)?;
        }
        settings.log_filter = get("FI_MCP_LOG_FILTER");

        Ok(settings)
    }

    /// Sets the module name.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Sets the tool-name prefix.
    #[must_use]
    pub fn with_tool_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tool_prefix = prefix.into();
        self
    }

    /// Sets the documentation policy.
    #[must_use]
    pub fn with_doc_policy(mut self, policy: DocPolicy) -> Self {
        self.doc_policy = policy;
        self
    }

    /// Sets the unknown-argument policy.
    #[must_use]
    pub fn with_unknown_arguments(mut self, policy: UnknownArguments) -> Self {
        self.unknown_arguments = policy;
        self
    }

    /// Adds names to the denylist.
    #[must_use]
    pub fn with_denylist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denylist.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Sets the log format.
    #[must_use]
    pub fn with_log_format(mut self, format: TracingFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Catalog options derived from these settings.
    #[must_use]
    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions::new(self.module.clone())
            .with_tool_prefix(self.tool_prefix.clone())
            .with_doc_policy(self.doc_policy)
            .with_unknown_arguments(self.unknown_arguments)
            .with_denylist(self.denylist.iter().cloned())
    }

    /// Tracing setup derived from these settings.
    #[must_use]
    pub fn tracing_setup(&self) -> TracingSetup {
        let setup = TracingSetup::new()
            .with_level(self.log_level)
            .with_format(self.log_format);
        match &self.log_filter {
            Some(filter) => setup.with_env_filter(filter.clone()),
            None => setup,
        }
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: err.to_string(),
        })
}
