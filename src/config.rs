//! Exporter settings.
//!
//! Settings come from an optional configuration file, overlaid by a `.env`
//! file in the working directory, overlaid by the process environment. Keys
//! are the environment names lowercased (`PORT` in the environment or `.env`,
//! `port` in a configuration file).
//!
//! ```text
//! PORT=8080
//! SCRAPE_INTERVAL=30s
//! TRH_URL=http://bdx.local/trh_monitoring_dashboard.php
//! LIQUID_URL=http://bdx.local/liquid_cooling_overview.php
//! CDU_URLS=http://bdx.local/cdu_dashboard.php?cabinetid=1,http://bdx.local/cdu_dashboard.php?cabinetid=2
//! SESS_MAP=...
//! PHPSESSID=...
//! ```

use std::path::Path;
use std::time::Duration;

use bdx_adapters::Session;
use bdx_extract::liquid::{LiquidMarkers, DEFAULT_CDU_MARKER, DEFAULT_RACK_MARKER};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::duration::{parse_duration, DurationError};

/// Errors that make the configuration unusable. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("invalid duration for {key}: {source}")]
    InvalidDuration {
        key: &'static str,
        #[source]
        source: DurationError,
    },

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid pattern for {key}: {source}")]
    InvalidPattern {
        key: &'static str,
        #[source]
        source: regex::Error,
    },
}

const DOTENV_FILE: &str = ".env";

/// Variables of a dotenv file as an environment source. A missing file adds
/// nothing; an unreadable or malformed one is an error.
fn dotenv_source(path: &Path) -> Result<Environment, ConfigError> {
    let mut vars = Map::new();
    match dotenvy::from_path_iter(path) {
        Ok(iter) => {
            for item in iter {
                let (key, value) = item?;
                vars.insert(key, value);
            }
            debug!("Loaded {} variables from {}", vars.len(), path.display());
        }
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }
    Ok(Environment::default().source(Some(vars)))
}

/// Values exactly as they appear in the file or environment.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSettings {
    port: String,
    scrape_interval: String,
    http_timeout: String,
    scrape_timeout: String,
    trh_url: String,
    liquid_url: String,
    cdu_urls: String,
    sess_map: String,
    phpsessid: String,
    referer: String,
    liquid_cdu_marker: String,
    liquid_rack_marker: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            port: "8080".to_string(),
            scrape_interval: "30s".to_string(),
            http_timeout: "10s".to_string(),
            scrape_timeout: "30s".to_string(),
            trh_url: String::new(),
            liquid_url: String::new(),
            cdu_urls: String::new(),
            sess_map: String::new(),
            phpsessid: String::new(),
            referer: String::new(),
            liquid_cdu_marker: DEFAULT_CDU_MARKER.to_string(),
            liquid_rack_marker: DEFAULT_RACK_MARKER.to_string(),
        }
    }
}

/// Validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub scrape_interval: Duration,
    /// Timeout of the sensor endpoint POST.
    pub http_timeout: Duration,
    /// Timeout of each page fetch.
    pub scrape_timeout: Duration,
    /// Sensor endpoint; `None` disables the source.
    pub trh_url: Option<String>,
    /// Liquid-cooling overview page; `None` disables the source.
    pub liquid_url: Option<String>,
    pub cdu_urls: Vec<String>,
    pub session: Session,
    /// Referer sent with the sensor POST.
    pub referer: String,
    pub liquid_markers: LiquidMarkers,
}

impl Default for Settings {
    fn default() -> Self {
        // Defaults are constants that always validate.
        Self::from_raw(RawSettings::default()).expect("default settings are valid")
    }
}

impl Settings {
    /// Load from an optional file, then `./.env`, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Path::new(DOTENV_FILE), Environment::default())
    }

    fn load_with(
        path: Option<&Path>,
        dotenv: &Path,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(dotenv_source(dotenv)?)
            .add_source(environment)
            .build()?;
        Self::from_config(&config)
    }

    /// Validate an already-built configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let raw: RawSettings = config.clone().try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let port = raw
            .port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ConfigError::InvalidPort(raw.port.clone()))?;

        let duration = |key: &'static str, value: &str| {
            parse_duration(value).map_err(|source| ConfigError::InvalidDuration { key, source })
        };
        let scrape_interval = duration("SCRAPE_INTERVAL", &raw.scrape_interval)?;
        if scrape_interval.is_zero() {
            return Err(ConfigError::InvalidDuration {
                key: "SCRAPE_INTERVAL",
                source: DurationError::Empty,
            });
        }
        let http_timeout = duration("HTTP_TIMEOUT", &raw.http_timeout)?;
        let scrape_timeout = duration("SCRAPE_TIMEOUT", &raw.scrape_timeout)?;

        let liquid_markers = LiquidMarkers::new(&raw.liquid_cdu_marker, &raw.liquid_rack_marker)
            .map_err(|source| ConfigError::InvalidPattern {
                key: "LIQUID_CDU_MARKER/LIQUID_RACK_MARKER",
                source,
            })?;

        let trh_url = non_empty(raw.trh_url);
        let referer = non_empty(raw.referer)
            .or_else(|| trh_url.clone())
            .unwrap_or_default();

        Ok(Settings {
            port,
            scrape_interval,
            http_timeout,
            scrape_timeout,
            trh_url,
            liquid_url: non_empty(raw.liquid_url),
            cdu_urls: split_list(&raw.cdu_urls),
            session: Session::new(raw.sess_map, raw.phpsessid),
            referer,
            liquid_markers,
        })
    }

    /// Listen address of the HTTP server.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Whether at least one source is configured.
    pub fn has_sources(&self) -> bool {
        self.trh_url.is_some() || self.liquid_url.is_some() || !self.cdu_urls.is_empty()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Comma-separated list, entries trimmed, empty entries dropped.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::io::Write;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(&config)
    }

    const NO_DOTENV: &str = "/nonexistent/.env";

    /// An environment source that matches nothing in the test process.
    fn no_env() -> Environment {
        Environment::with_prefix("BDX_EXPORTER_TEST_UNSET")
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = from_toml("").unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.scrape_interval, Duration::from_secs(30));
        assert_eq!(settings.http_timeout, Duration::from_secs(10));
        assert_eq!(settings.scrape_timeout, Duration::from_secs(30));
        assert_eq!(settings.trh_url, None);
        assert_eq!(settings.liquid_url, None);
        assert!(settings.cdu_urls.is_empty());
        assert!(settings.session.is_incomplete());
        assert!(!settings.has_sources());
        assert_eq!(settings.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn values_are_parsed_and_lists_split() {
        let settings = from_toml(
            r#"
            port = 9100
            scrape_interval = "1m30s"
            http_timeout = "500ms"
            trh_url = "http://bdx.local/trh"
            liquid_url = "  "
            cdu_urls = " http://bdx.local/cdu?id=1 ,, http://bdx.local/cdu?id=2,"
            sess_map = "m"
            phpsessid = "p"
            "#,
        )
        .unwrap();

        assert_eq!(settings.port, 9100);
        assert_eq!(settings.scrape_interval, Duration::from_secs(90));
        assert_eq!(settings.http_timeout, Duration::from_millis(500));
        assert_eq!(settings.trh_url.as_deref(), Some("http://bdx.local/trh"));
        assert_eq!(settings.liquid_url, None);
        assert_eq!(
            settings.cdu_urls,
            ["http://bdx.local/cdu?id=1", "http://bdx.local/cdu?id=2"]
        );
        assert_eq!(settings.session.cookie_header(), "sess_map=m; PHPSESSID=p");
        assert_eq!(settings.referer, "http://bdx.local/trh");
    }

    #[test]
    fn explicit_referer_wins() {
        let settings = from_toml(
            r#"
            trh_url = "http://bdx.local/trh"
            referer = "http://bdx.local/dashboard"
            "#,
        )
        .unwrap();
        assert_eq!(settings.referer, "http://bdx.local/dashboard");
    }

    #[test]
    fn malformed_duration_is_fatal() {
        let err = from_toml(r#"scrape_timeout = "thirty""#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration {
                key: "SCRAPE_TIMEOUT",
                ..
            }
        ));
        assert!(matches!(
            from_toml(r#"scrape_interval = "0s""#),
            Err(ConfigError::InvalidDuration { key: "SCRAPE_INTERVAL", .. })
        ));
    }

    #[test]
    fn malformed_port_is_fatal() {
        assert!(matches!(
            from_toml(r#"port = "http""#),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(from_toml("port = 70000"), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(from_toml("port = 0"), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn malformed_marker_is_fatal() {
        assert!(matches!(
            from_toml(r#"liquid_rack_marker = "COMPARTMENT ([A-Z""#),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn custom_marker_is_used() {
        let settings = from_toml(r#"liquid_cdu_marker = 'UNIT-(\d+) STATUS'"#).unwrap();
        assert!(settings.liquid_markers.cdu.is_match("UNIT-4 STATUS"));
    }

    #[test]
    fn loads_from_file_on_disk() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 9200").unwrap();
        writeln!(file, "cdu_urls = \"http://a,http://b\"").unwrap();

        let settings =
            Settings::load_with(Some(file.path()), Path::new(NO_DOTENV), no_env()).unwrap();
        assert_eq!(settings.port, 9200);
        assert_eq!(settings.cdu_urls.len(), 2);
        assert!(settings.has_sources());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load_with(
            Some(Path::new("/nonexistent/bdx.toml")),
            Path::new(NO_DOTENV),
            no_env(),
        );
        assert!(matches!(err, Err(ConfigError::Source(_))));
    }

    #[test]
    fn dotenv_file_configures_the_process() {
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(".env");
        std::fs::write(
            &dotenv,
            "# upstream\nTRH_URL=http://bdx.local/trh\nCDU_URLS=\"http://a,http://b\"\nSCRAPE_INTERVAL=1m\n",
        )
        .unwrap();

        let settings = Settings::load_with(None, &dotenv, no_env()).unwrap();
        assert_eq!(settings.trh_url.as_deref(), Some("http://bdx.local/trh"));
        assert_eq!(settings.cdu_urls, ["http://a", "http://b"]);
        assert_eq!(settings.scrape_interval, Duration::from_secs(60));
    }

    #[test]
    fn dotenv_sits_between_file_and_environment() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bdx.toml");
        std::fs::write(&file, "port = 9100\nliquid_url = \"http://file/liquid\"\n").unwrap();
        let dotenv = dir.path().join(".env");
        std::fs::write(&dotenv, "PORT=9200\nLIQUID_URL=http://dotenv/liquid\n").unwrap();

        let mut env = Map::new();
        env.insert("PORT".to_string(), "9300".to_string());
        let environment = Environment::default().source(Some(env));

        let settings = Settings::load_with(Some(&file), &dotenv, environment).unwrap();
        assert_eq!(settings.port, 9300);
        assert_eq!(settings.liquid_url.as_deref(), Some("http://dotenv/liquid"));
    }

    #[test]
    fn missing_dotenv_is_ignored_but_malformed_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_with(None, &dir.path().join(".env"), no_env()).unwrap();
        assert_eq!(settings.port, 8080);

        let dotenv = dir.path().join(".env");
        std::fs::write(&dotenv, "PORT='9100\n").unwrap();
        assert!(matches!(
            Settings::load_with(None, &dotenv, no_env()),
            Err(ConfigError::Dotenv(_))
        ));
    }

    #[test]
    fn default_settings_match_empty_config() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.scrape_interval, Duration::from_secs(30));
    }
}
