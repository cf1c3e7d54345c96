//! Process-wide configuration, resolved once at startup.
//!
//! Every option is read here and nowhere else; the resulting [`Config`] is
//! immutable and passed into each component at construction.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default source: the NOAA LA/Oxnard surf forecast product.
pub const DEFAULT_SOURCE_URL: &str = "https://forecast.weather.gov/product.php?site=LOX&issuedby=LOX&product=SRF&format=CI&version=1&glossary=1&highlight=on";

/// Default forecast zone: San Luis Obispo County Beaches.
pub const DEFAULT_ZONE: &str = "CAZ340";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_INTERVAL_SECS: u64 = 900;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// CLI flag values layered on top of the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub source_url: Option<String>,
    pub zone: Option<String>,
    pub port: Option<u16>,
    pub interval_secs: Option<u64>,
    pub public_dir: Option<PathBuf>,
}

/// Immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bulletin page to snapshot.
    pub source_url: Url,
    /// Zone token as configured, for display.
    pub zone: String,
    /// Case-insensitive pattern compiled from the zone token.
    pub zone_pattern: Regex,
    /// Header label rendered above the zone text.
    pub header: String,
    /// HTTP listen port.
    pub port: u16,
    /// Directory the artifact is published into.
    pub public_dir: PathBuf,
    /// Time between scheduled pipeline passes.
    pub interval: Duration,
    /// Hard bound on the fetch step.
    pub fetch_timeout: Duration,
    /// Reference time zone for rendered timestamps.
    pub timezone: chrono_tz::Tz,
    /// Explicit Chromium executable, if configured.
    pub chromium_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the environment with CLI overrides on top.
    ///
    /// Precedence per option: CLI flag, then environment variable, then the
    /// built-in default.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let raw_url = overrides
            .source_url
            .or_else(|| read_env_string("SHORECAST_SOURCE_URL"))
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let source_url =
            Url::parse(&raw_url).with_context(|| format!("invalid source URL: {raw_url}"))?;

        let zone = overrides
            .zone
            .or_else(|| read_env_string("SHORECAST_ZONE"))
            .unwrap_or_else(|| DEFAULT_ZONE.to_string());
        let zone_pattern = RegexBuilder::new(&zone)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("zone token is not a valid pattern: {zone}"))?;

        let header =
            read_env_string("SHORECAST_HEADER").unwrap_or_else(|| default_header(&zone));

        let port = overrides
            .port
            .or_else(|| read_env_parsed("SHORECAST_PORT"))
            .or_else(|| read_env_parsed("PORT"))
            .unwrap_or(DEFAULT_PORT);

        let public_dir = overrides
            .public_dir
            .or_else(|| read_env_string("SHORECAST_PUBLIC_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR));

        let interval_secs = overrides
            .interval_secs
            .or_else(|| read_env_parsed("SHORECAST_INTERVAL_SECS"))
            .unwrap_or(DEFAULT_INTERVAL_SECS)
            .max(1);

        let fetch_timeout_secs = read_env_parsed("SHORECAST_FETCH_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
            .max(1);

        let tz_name = read_env_string("SHORECAST_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = tz_name
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("unknown time zone {tz_name}: {e}"))?;

        let chromium_path = read_env_string("SHORECAST_CHROMIUM_PATH").map(PathBuf::from);

        Ok(Self {
            source_url,
            zone,
            zone_pattern,
            header,
            port,
            public_dir,
            interval: Duration::from_secs(interval_secs),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            timezone,
            chromium_path,
        })
    }

    /// The single fixed path the artifact is published at.
    pub fn snapshot_path(&self) -> PathBuf {
        self.public_dir.join("latest.png")
    }
}

/// Zone-label rule carried from the source bulletin's zone scheme: CAZ
/// tokens refer to the default product's beach zone, anything else is shown
/// verbatim. `SHORECAST_HEADER` overrides both cases.
fn default_header(zone: &str) -> String {
    if zone.to_ascii_uppercase().starts_with("CAZ") {
        "San Luis Obispo County Beaches".to_string()
    } else {
        zone.to_string()
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
