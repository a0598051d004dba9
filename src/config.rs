//! Service settings loaded from environment variables and an optional `.env` file.
//!
//! Settings are resolved once per process through [`get_settings`]; every later
//! call hands back the same instance (or the same error).

use std::collections::BTreeMap;
use std::ffi::OsString;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

/// Display name used when `API_TITLE` is not set.
pub const DEFAULT_API_TITLE: &str = "VisionVani API";

/// Version string used when `API_VERSION` is not set.
pub const DEFAULT_API_VERSION: &str = "0.1.0";

/// Environment label used when `ENVIRONMENT` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Validated, immutable service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Service display name.
    pub api_title: String,
    /// Semantic version.
    pub api_version: String,
    /// Environment name.
    pub environment: String,
    /// Allowed origin for CORS; `None` selects the development allow-list.
    pub frontend_origin: Option<Url>,
}

/// Settings exactly as found in the environment, before validation.
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default = "default_api_title")]
    api_title: String,

    #[serde(default = "default_api_version")]
    api_version: String,

    #[serde(default = "default_environment")]
    environment: String,

    #[serde(default)]
    frontend_origin: Option<String>,
}

fn default_api_title() -> String {
    DEFAULT_API_TITLE.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_title: default_api_title(),
            api_version: default_api_version(),
            environment: default_environment(),
            frontend_origin: None,
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first.
    ///
    /// Variables already present in the environment win over `.env` entries.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment file {}", path.display());
        }
        let settings = Self::from_vars(utf8_vars(std::env::vars_os()))?;
        info!(
            title = %settings.api_title,
            version = %settings.api_version,
            environment = %settings.environment,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Build settings from explicit key/value pairs. Keys are matched
    /// case-insensitively; when a key appears under several spellings the
    /// last pair wins.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let folded: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into().to_lowercase(), v.into()))
            .collect();
        let raw: RawSettings = envy::from_iter(folded)?;
        raw.validate()
    }

    /// Check if an explicit frontend origin was configured.
    pub fn has_frontend_origin(&self) -> bool {
        self.frontend_origin.is_some()
    }
}

impl RawSettings {
    /// Normalize blank values and validate the frontend origin.
    fn validate(self) -> Result<Settings, ConfigError> {
        let frontend_origin = match self.frontend_origin.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_http_url("frontend_origin", value)?),
        };

        Ok(Settings {
            api_title: non_blank_or(self.api_title, default_api_title),
            api_version: non_blank_or(self.api_version, default_api_version),
            environment: non_blank_or(self.environment, default_environment),
            frontend_origin,
        })
    }
}

/// Keep only the variables whose name and value are valid UTF-8.
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter().filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
        (Ok(k), Ok(v)) => Some((k, v)),
        (Err(k), _) => {
            debug!("Skipping environment variable with non UTF-8 name {:?}", k);
            None
        }
        (Ok(k), Err(_)) => {
            debug!("Skipping environment variable {} with non UTF-8 value", k);
            None
        }
    })
}

fn non_blank_or(value: String, fallback: fn() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value
    }
}

/// Parse an absolute `http`/`https` URL with a host.
fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidField {
        field,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("URL scheme {other:?} is not http or https"))),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("URL has no host".to_string()));
    }

    Ok(url)
}

/// Loader used by a [`SettingsProvider`] on first access.
pub type SettingsSource = fn() -> Result<Settings, ConfigError>;

/// Write-once cell around a settings source.
///
/// The first call to [`SettingsProvider::get`] runs the source; concurrent
/// callers block until it finishes and then observe the same result.
pub struct SettingsProvider {
    cell: OnceCell<Result<Settings, ConfigError>>,
    source: SettingsSource,
}

impl SettingsProvider {
    /// Create a provider that has not loaded anything yet.
    pub const fn new(source: SettingsSource) -> Self {
        Self {
            cell: OnceCell::new(),
            source,
        }
    }

    /// Return the cached settings, loading them on first access.
    pub fn get(&self) -> Result<&Settings, ConfigError> {
        match self.cell.get_or_init(self.source) {
            Ok(settings) => Ok(settings),
            Err(err) => Err(err.clone()),
        }
    }

    /// Check whether the source has already run.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

static SETTINGS: SettingsProvider = SettingsProvider::new(Settings::load);

/// Cached settings loader for the process.
pub fn get_settings() -> Result<&'static Settings, ConfigError> {
    SETTINGS.get()
}
