//! Command line flags and the optional JSON settings file.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use ecoleta_core::model::Coordinate;
use ecoleta_provider_backend::DEFAULT_BASE_URL as DEFAULT_API_URL;
use ecoleta_provider_geoip::DEFAULT_LOOKUP_URL;
use ecoleta_provider_ibge::DEFAULT_BASE_URL as DEFAULT_GEO_URL;
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(
    name = "ecoleta",
    version,
    about = "Register waste collection points from the terminal"
)]
pub(crate) struct Cli {
    /// JSON settings file (defaults to <config dir>/ecoleta/config.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Ecoleta backend
    #[arg(long, env = "ECOLETA_API_URL")]
    pub api_url: Option<String>,

    /// Base URL of the IBGE localities API
    #[arg(long, env = "ECOLETA_GEO_URL")]
    pub geo_url: Option<String>,

    /// Where to write the log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Center the map on a fixed position instead of looking it up, as LAT,LON
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    pub position: Option<Coordinate>,

    /// Never look up the current position
    #[arg(long, conflicts_with = "position")]
    pub no_geolocation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
/// How the initial map center is found.
pub(crate) enum GeolocationSetting {
    /// Ask an IP geolocation service.
    Auto {
        #[serde(default = "default_lookup_url")]
        lookup_url: String,
    },
    /// Always use this position.
    Fixed { latitude: f64, longitude: f64 },
    /// Keep the default center.
    Disabled,
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub api_url: String,
    pub geo_url: String,
    pub geolocation: GeolocationSetting,
    /// Map center used until (or unless) a position is found.
    pub default_center: Coordinate,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            geo_url: DEFAULT_GEO_URL.to_owned(),
            geolocation: GeolocationSetting::Auto {
                lookup_url: default_lookup_url(),
            },
            default_center: Coordinate::UNSET,
            request_timeout_secs: 10,
            user_agent: format!("ecoleta/{}", env!("CARGO_PKG_VERSION")),
            log_file: None,
        }
    }
}

impl Config {
    /// Read the settings file (if any) and apply command line overrides.
    pub(crate) fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) if !path.exists() => bail!("config file {} not found", path.display()),
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ecoleta").join("config.json"))
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(api_url) = &cli.api_url {
            self.api_url.clone_from(api_url);
        }
        if let Some(geo_url) = &cli.geo_url {
            self.geo_url.clone_from(geo_url);
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = Some(log_file.clone());
        }
        if let Some(position) = cli.position {
            self.geolocation = GeolocationSetting::Fixed {
                latitude: position.latitude,
                longitude: position.longitude,
            };
        }
        if cli.no_geolocation {
            self.geolocation = GeolocationSetting::Disabled;
        }
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join("ecoleta")
                .join("ecoleta.log")
        })
    }
}

fn parse_position(raw: &str) -> Result<Coordinate, String> {
    let Some((lat, lon)) = raw.split_once(',') else {
        return Err("expected LAT,LON".to_owned());
    };
    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid latitude {lat:?}: {err}"))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid longitude {lon:?}: {err}"))?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {latitude} is out of range"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {longitude} is out of range"));
    }
    Ok(Coordinate::new(latitude, longitude))
}
