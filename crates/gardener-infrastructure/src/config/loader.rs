//! Configuration loader
//!
//! Layered resolution: serde defaults, then an optional TOML file, then
//! `GARDENER_*` environment variables. Nested keys use `__` in the
//! environment (`GARDENER_LLM__HOST`); the handful of flat names the
//! documentation promises (`GARDENER_LLM_HOST`, `GARDENER_DATA_ROOT`, …)
//! are applied as explicit aliases on top.

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use gardener_domain::error::{Error, Result};

use super::data::Settings;

const ENV_PREFIX: &str = "GARDENER_";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loader service
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Optional explicit config file path (overrides discovery)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with default file discovery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit configuration file path.
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load settings.
    ///
    /// Resolution order, later wins:
    /// 1. built-in defaults
    /// 2. `<data_root>/config.toml` (or the explicit path)
    /// 3. `GARDENER_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an explicit path is missing or
    /// any layer fails to parse.
    pub fn load(&self) -> Result<Settings> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(Error::config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        } else if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                figment = figment.merge(Toml::file(default_path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut settings: Settings = figment
            .extract()
            .map_err(|e| Error::config(format!("invalid configuration: {e}")))?;

        apply_flat_aliases(&mut settings)?;
        validate(&settings)?;
        Ok(settings)
    }
}

/// Default config location: `<data_root>/config.toml`.
fn default_config_path() -> Option<PathBuf> {
    if let Ok(root) = env::var(format!("{ENV_PREFIX}DATA_ROOT")) {
        return Some(PathBuf::from(root).join(CONFIG_FILE_NAME));
    }
    dirs::home_dir().map(|home| {
        home.join(super::data::DATA_ROOT_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}

fn env_var(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        Error::config(format!("invalid value '{raw}' for {ENV_PREFIX}{name}"))
    })
}

/// The documented flat environment names.
fn apply_flat_aliases(settings: &mut Settings) -> Result<()> {
    if let Some(raw) = env_var("DATA_ROOT") {
        settings.data_root = Some(PathBuf::from(raw));
    }
    if let Some(raw) = env_var("LLM_HOST") {
        settings.llm.host = raw;
    }
    if let Some(raw) = env_var("LLM_MODEL") {
        settings.llm.model = raw;
    }
    if let Some(raw) = env_var("LOG_LEVEL") {
        settings.log_level = Some(raw);
    }
    if let Some(raw) = env_var("DEBUG") {
        settings.debug = parse_env("DEBUG", &raw)?;
    }
    if let Some(raw) = env_var("MAX_ADAPTER_MEMORY_BYTES") {
        settings.adapters.max_memory_bytes = parse_env("MAX_ADAPTER_MEMORY_BYTES", &raw)?;
    }
    if let Some(raw) = env_var("MAX_CACHED_ADAPTERS") {
        settings.adapters.max_cached = parse_env("MAX_CACHED_ADAPTERS", &raw)?;
    }
    if let Some(raw) = env_var("MAX_MESSAGES_PER_PROJECT") {
        settings.context.max_messages = parse_env("MAX_MESSAGES_PER_PROJECT", &raw)?;
    }
    if let Some(raw) = env_var("MAX_CONTEXTS_IN_MEMORY") {
        settings.context.max_in_memory = parse_env("MAX_CONTEXTS_IN_MEMORY", &raw)?;
    }
    if let Some(raw) = env_var("RETRIEVAL_TOP_K") {
        settings.retrieval.top_k = parse_env("RETRIEVAL_TOP_K", &raw)?;
    }
    if let Some(raw) = env_var("RETRIEVAL_MIN_SCORE") {
        settings.retrieval.min_score = parse_env("RETRIEVAL_MIN_SCORE", &raw)?;
    }
    if let Some(raw) = env_var("CHUNK_MIN_CHARS") {
        settings.chunking.min_chars = parse_env("CHUNK_MIN_CHARS", &raw)?;
    }
    if let Some(raw) = env_var("CHUNK_MAX_CHARS") {
        settings.chunking.max_chars = parse_env("CHUNK_MAX_CHARS", &raw)?;
    }
    Ok(())
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.adapters.max_memory_bytes == 0 {
        return Err(Error::config("adapter memory budget cannot be 0"));
    }
    if settings.adapters.max_cached == 0 {
        return Err(Error::config("adapter cache capacity cannot be 0"));
    }
    if settings.context.max_in_memory == 0 {
        return Err(Error::config("in-memory context capacity cannot be 0"));
    }
    if settings.context.max_messages == 0 {
        return Err(Error::config("message retention cap cannot be 0"));
    }
    if settings.chunking.min_chars >= settings.chunking.max_chars {
        return Err(Error::config(format!(
            "chunking window is inverted: min {} >= max {}",
            settings.chunking.min_chars, settings.chunking.max_chars
        )));
    }
    if settings.retrieval.top_k == 0 {
        return Err(Error::config("retrieval top_k cannot be 0"));
    }
    Ok(())
}
