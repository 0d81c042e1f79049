//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{fs, path::PathBuf, str::FromStr};

use config::{Config, Environment, File, Map};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::cleanup::DEFAULT_PRESERVED_EMAIL;

const LOCAL_CONFIG_BASENAME: &str = "ghost-admin";
const ENV_PREFIX: &str = "GHOST_ADMIN";

/// Values supplied on the command line (or through their bound env vars),
/// applied on top of file and `GHOST_ADMIN__*` sources.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub key_file: Option<PathBuf>,
    pub preserved_email: Option<String>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site: SiteSettings,
    pub cleanup: CleanupSettings,
    pub logging: LoggingSettings,
}

#[derive(Clone)]
pub struct SiteSettings {
    pub url: Url,
    pub api_key: String,
}

impl std::fmt::Debug for SiteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteSettings")
            .field("url", &self.url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CleanupSettings {
    pub preserved_email: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(overrides: &Overrides) -> Result<Settings, LoadError> {
    load_with_env(overrides, None)
}

/// Same as [`load`], reading `GHOST_ADMIN__*` values from `env` instead of the
/// process environment when provided.
pub fn load_with_env(
    overrides: &Overrides,
    env: Option<Map<String, String>>,
) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = overrides.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(env),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(overrides)?;

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    site: RawSiteSettings,
    cleanup: RawCleanupSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCleanupSettings {
    preserved_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), LoadError> {
        if let Some(url) = overrides.url.as_ref() {
            self.site.url = Some(url.clone());
        }
        if let Some(key) = overrides.api_key.as_ref() {
            self.site.api_key = Some(key.clone());
        }
        // A key file wins over an inline key from any source.
        if let Some(path) = overrides.key_file.as_ref() {
            let key = fs::read_to_string(path).map_err(|source| LoadError::KeyFile {
                path: path.display().to_string(),
                source,
            })?;
            self.site.api_key = Some(key.trim().to_string());
        }
        if let Some(email) = overrides.preserved_email.as_ref() {
            self.cleanup.preserved_email = Some(email.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        Ok(())
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            site,
            cleanup,
            logging,
        } = raw;

        Ok(Self {
            site: build_site_settings(site)?,
            cleanup: build_cleanup_settings(cleanup)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let url = non_empty(site.url)
        .ok_or_else(|| LoadError::invalid("site.url", "is required (set ADMIN_URL or --url)"))?;
    let url = Url::parse(&url)
        .map_err(|err| LoadError::invalid("site.url", format!("failed to parse: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.url",
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }

    let api_key = non_empty(site.api_key).ok_or_else(|| {
        LoadError::invalid("site.api_key", "is required (set ADMIN_KEY or ADMIN_KEY_FILE)")
    })?;

    Ok(SiteSettings { url, api_key })
}

fn build_cleanup_settings(cleanup: RawCleanupSettings) -> Result<CleanupSettings, LoadError> {
    let preserved_email = match cleanup.preserved_email {
        Some(email) => non_empty(Some(email)).ok_or_else(|| {
            LoadError::invalid("cleanup.preserved_email", "must not be empty")
        })?,
        None => DEFAULT_PRESERVED_EMAIL.to_string(),
    };

    Ok(CleanupSettings { preserved_email })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
