use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "POCKET_ENV";
const CONFIG_DIR_ENV: &str = "POCKET_CONFIG_DIR";
const ENV_PREFIX: &str = "POCKET";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub fines: FineSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay and
    /// `POCKET_*` variables (`__` separates nested keys).
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Remote catalog and proximity defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "CatalogSettings::default_search_endpoint")]
    pub search_endpoint: String,
    #[serde(default = "CatalogSettings::default_result_limit")]
    pub result_limit: u32,
    /// Upper bound for a whole remote search round trip.
    #[serde(default = "CatalogSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "CatalogSettings::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "CatalogSettings::default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "CatalogSettings::default_longitude")]
    pub default_longitude: f64,
    #[serde(default = "CatalogSettings::default_radius_km")]
    pub default_radius_km: f64,
    /// Serve everything from the bundled sample data.
    #[serde(default)]
    pub offline: bool,
}

impl CatalogSettings {
    fn default_search_endpoint() -> String {
        "https://openlibrary.org/search.json".to_string()
    }

    fn default_result_limit() -> u32 {
        20
    }

    fn default_request_timeout_ms() -> u64 {
        10_000
    }

    fn default_user_agent() -> String {
        format!("pocket-library/{}", env!("CARGO_PKG_VERSION"))
    }

    fn default_latitude() -> f64 {
        33.882
    }

    fn default_longitude() -> f64 {
        -117.885
    }

    fn default_radius_km() -> f64 {
        25.0
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search_endpoint: Self::default_search_endpoint(),
            result_limit: Self::default_result_limit(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            user_agent: Self::default_user_agent(),
            default_latitude: Self::default_latitude(),
            default_longitude: Self::default_longitude(),
            default_radius_km: Self::default_radius_km(),
            offline: false,
        }
    }
}

/// Where the fine history is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct FineSettings {
    /// JSON preferences file shared with other local state.
    #[serde(default = "FineSettings::default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "FineSettings::default_preferences_key")]
    pub preferences_key: String,
}

impl FineSettings {
    fn default_storage_path() -> PathBuf {
        PathBuf::from("pocket-library-preferences.json")
    }

    fn default_preferences_key() -> String {
        "FineHistory".to_string()
    }
}

impl Default for FineSettings {
    fn default() -> Self {
        Self {
            storage_path: Self::default_storage_path(),
            preferences_key: Self::default_preferences_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_catalog_points_at_open_library() {
        let settings = Settings::default();
        assert_eq!(
            settings.catalog.search_endpoint,
            "https://openlibrary.org/search.json"
        );
        assert_eq!(settings.catalog.result_limit, 20);
        assert_eq!(settings.catalog.request_timeout_ms, 10_000);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn files_are_layered_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[catalog]\nresult_limit = 5\n\n[server]\nport = 9000\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("staging.toml"), "[server]\nport = 9100\n").unwrap();

        let settings = Settings::load_from(dir.path(), "staging").unwrap();

        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.catalog.result_limit, 5);
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.fines.preferences_key, "FineHistory");
    }
}
