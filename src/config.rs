//! Mostly hard-coded config. The few knobs that differ between deployments
//! (which geocoder to talk to, and how) are read from the environment.

use anyhow::{bail, Context, Result};
use std::{env, time::Duration};

/// Address queries shorter than this never leave the process. Some older
/// forms used 4; 3 is enough for Nominatim to return useful matches.
pub const MIN_QUERY_LEN: usize = 3;

/// How many suggestions we ask the geocoder for.
pub const SUGGESTION_LIMIT: usize = 5;

pub const FREE_PROPERTY_CAP: usize = 1;
pub const FREE_LOG_CAP: usize = 3;
pub const FREE_REMINDER_CAP: usize = 1;

/// Value-added target, in dollars, for the milestone progress bar.
pub const MILESTONE_TARGET: f64 = 10_000.0;

/// The setup form caps addresses at this many characters.
pub const ADDRESS_MAX_LEN: usize = 100;

pub const DEFAULT_PROPERTY_NAME: &str = "My Home";
pub const DEFAULT_USER_ID: &str = "user1";
pub const DEFAULT_USER_EMAIL: &str = "demo@example.com";

pub const DEFAULT_MAP_ZOOM: u8 = 15;
pub const DEFAULT_MAP_HEIGHT: u32 = 180;
pub const TILE_URL_TEMPLATE: &str =
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const MAPBOX_URL: &str =
    "https://api.mapbox.com/geocoding/v5/mapbox.places";
/// Nominatim's usage policy requires an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "zing-home-app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocoderKind {
    Nominatim,
    Mapbox { access_token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    pub kind: GeocoderKind,
    pub endpoint: String,
    pub user_agent: String,
    /// `None` means no timeout at all, which is what the browser `fetch`
    /// calls we replaced did.
    pub timeout: Option<Duration>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            kind: GeocoderKind::Nominatim,
            endpoint: NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl GeocoderConfig {
    /// Read geocoder settings from the environment, loading a `.env` file
    /// first if one is around.
    ///
    /// - `ZING_GEOCODER`: `nominatim` (default) or `mapbox`
    /// - `ZING_GEOCODER_URL`: override the provider's base URL
    /// - `ZING_USER_AGENT`: defaults to `zing-home-app`
    /// - `MAPBOX_ACCESS_TOKEN`: required when using mapbox
    /// - `ZING_GEOCODER_TIMEOUT_SECS`: optional request timeout
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GeocoderConfig::from_env`], but reading variables through
    /// `lookup` so callers (and tests) don't have to touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = lookup("ZING_GEOCODER")
            .map(|p| p.trim().to_lowercase())
            .unwrap_or_else(|| "nominatim".to_string());
        let (kind, default_endpoint) = match &provider[..] {
            "nominatim" | "osm" => (GeocoderKind::Nominatim, NOMINATIM_URL),
            "mapbox" => {
                let access_token = lookup("MAPBOX_ACCESS_TOKEN")
                    .filter(|t| !t.trim().is_empty())
                    .context("MAPBOX_ACCESS_TOKEN must be set to use mapbox")?;
                (GeocoderKind::Mapbox { access_token }, MAPBOX_URL)
            }
            other => bail!("unknown geocoder {other:?}"),
        };
        let endpoint = lookup("ZING_GEOCODER_URL")
            .unwrap_or_else(|| default_endpoint.to_string())
            .trim_end_matches('/')
            .to_string();
        let user_agent = lookup("ZING_USER_AGENT")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout = match lookup("ZING_GEOCODER_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(
                secs.trim().parse().with_context(|| {
                    format!("ZING_GEOCODER_TIMEOUT_SECS={secs:?} is not a number")
                })?,
            )),
            None => None,
        };

        Ok(Self {
            kind,
            endpoint,
            user_agent,
            timeout,
        })
    }
}
