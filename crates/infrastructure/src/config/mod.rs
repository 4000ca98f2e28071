//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. Defaults embedded from `config/default.toml`
//! 2. An optional TOML file
//! 3. Environment variables `STACKBASE__<SECTION>__<KEY>`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use stackbase_application::CachePolicy;
use thiserror::Error;
use url::Url;

const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/default.toml");

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "STACKBASE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the settings shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value was read but is not acceptable.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Where the identity client keeps its tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreMode {
    /// Cookie jar under the browser SDK's cookie names.
    #[default]
    Cookie,
}

/// Identity service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StackSettings {
    /// Project identifier.
    pub project_id: String,
    /// Publishable client key of the project.
    pub publishable_client_key: String,
    /// Base URL of the identity service.
    pub api_url: Url,
    /// Token storage mode.
    #[serde(default)]
    pub token_store: TokenStoreMode,
    /// Where the `OAuth` provider sends the browser back to.
    #[serde(default)]
    pub oauth_redirect_uri: Option<Url>,
}

/// REST backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RestSettings {
    /// Base URL of the REST backend.
    pub url: Url,
    /// API key identifying the application.
    pub anon_key: String,
    /// Database schema to address, if not the default one.
    #[serde(default)]
    pub schema: Option<String>,
}

/// Auth provider settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// Base path prepended to the set-password route.
    #[serde(default)]
    pub redirect_to: Option<String>,
    /// Session cache policy.
    #[serde(default)]
    pub cache: CachePolicy,
}

/// Complete application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Identity service.
    pub stack: StackSettings,
    /// REST backend.
    pub rest: RestSettings,
    /// Auth provider.
    #[serde(default)]
    pub auth: AuthSettings,
}

impl Settings {
    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("stack.project_id", &self.stack.project_id)?;
        require_non_empty(
            "stack.publishable_client_key",
            &self.stack.publishable_client_key,
        )?;
        require_http("stack.api_url", &self.stack.api_url)?;
        if let Some(uri) = &self.stack.oauth_redirect_uri {
            require_http("stack.oauth_redirect_uri", uri)?;
        }

        require_http("rest.url", &self.rest.url)?;
        require_non_empty("rest.anon_key", &self.rest.anon_key)?;
        if let Some(schema) = &self.rest.schema {
            require_non_empty("rest.schema", schema)?;
        }

        if let Some(base) = &self.auth.redirect_to
            && !base.starts_with('/')
        {
            return Err(ConfigError::Invalid {
                field: "auth.redirect_to",
                reason: format!("expected a path starting with '/', got {base:?}"),
            });
        }
        Ok(())
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn require_http(field: &'static str, url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// Builds [`Settings`] from the configuration layers.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    environment: Option<HashMap<String, String>>,
}

impl SettingsLoader {
    /// Creates a loader reading the embedded defaults and the process
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML file between the defaults and the environment.
    /// A missing file is an error.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads environment variables from `vars` instead of the process.
    #[must_use]
    pub fn with_environment(mut self, vars: HashMap<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    /// Loads and validates the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, a value has the wrong
    /// shape, or validation fails.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml));

        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }

        let mut environment = Environment::with_prefix(ENV_PREFIX).separator("__");
        if let Some(vars) = &self.environment {
            environment = environment.source(Some(vars.clone().into_iter().collect()));
        }
        builder = builder.add_source(environment);

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        tracing::debug!(
            project_id = %settings.stack.project_id,
            rest_url = %settings.rest.url,
            cache = ?settings.auth.cache,
            "configuration loaded"
        );
        Ok(settings)
    }
}
