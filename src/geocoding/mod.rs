//! Geocoders turn free text into address suggestions. Each provider speaks
//! its own wire format; they all hand back the same [`Suggestion`] shape so
//! that the lookup service does not care which one is configured.
//!
//! - `nominatim`: OpenStreetMap's search API, the default
//! - `mapbox`: Mapbox forward geocoding, needs an access token

mod label;
pub mod mapbox;
pub mod nominatim;

pub use label::{compose_label, AddressParts};

use crate::{
    config::{GeocoderConfig, GeocoderKind},
    models::Suggestion,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::str::FromStr;

/// ISO 3166-1 alpha-2 country code, stored lower-case since that is what
/// the providers want.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 2 || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("{s:?} is not a two-letter country code");
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub country: Option<CountryCode>,
    pub limit: usize,
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// One round trip to the provider. Records without usable coordinates
    /// are left out; the rest keep the provider's order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Suggestion>>;

    /// Fill in whatever `search` could not provide for the suggestion the
    /// user actually picked. Providers whose search results already carry
    /// coordinates have nothing to add.
    async fn resolve_details(
        &self,
        suggestion: &Suggestion,
    ) -> Result<Suggestion> {
        Ok(suggestion.clone())
    }
}

#[async_trait]
impl<T> GeocodingProvider for Box<T>
where
    T: GeocodingProvider + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Suggestion>> {
        (**self).search(query).await
    }
    async fn resolve_details(
        &self,
        suggestion: &Suggestion,
    ) -> Result<Suggestion> {
        (**self).resolve_details(suggestion).await
    }
}

/// Shared by providers; `timeout` is left unset unless configured.
pub(crate) fn build_client(config: &GeocoderConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

pub fn provider_from_config(
    config: &GeocoderConfig,
) -> Result<Box<dyn GeocodingProvider>> {
    let client = build_client(config)?;
    Ok(match &config.kind {
        GeocoderKind::Nominatim => Box::new(nominatim::Nominatim::new(
            client,
            &config.endpoint,
            &config.user_agent,
        )),
        GeocoderKind::Mapbox { access_token } => Box::new(
            mapbox::Mapbox::new(client, &config.endpoint, access_token),
        ),
    })
}

/// Lenient coordinate parsing: providers send numbers, numeric strings, or
/// nothing at all.
pub(crate) fn parse_coordinate(value: Option<&serde_json::Value>) -> Option<f64> {
    let parsed = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
