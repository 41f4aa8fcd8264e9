//! [Nominatim](https://nominatim.org/release-docs/latest/api/Search/) is the
//! free OpenStreetMap geocoder. Its usage policy asks for an identifying
//! user agent and no more than one request per second; debouncing
//! keystrokes is up to the caller.

use super::{
    compose_label, parse_coordinate, AddressParts, GeocodingProvider,
    SearchQuery,
};
use crate::models::Suggestion;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub struct Nominatim {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
}

/// The subset of Nominatim's `address` object (from `addressdetails=1`)
/// that we use for labels.
#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    pedestrian: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl From<NominatimAddress> for AddressParts {
    fn from(a: NominatimAddress) -> Self {
        AddressParts {
            house_number: a.house_number,
            street: a.road.or(a.pedestrian),
            locality: a.city.or(a.town).or(a.village).or(a.hamlet).or(a.suburb),
            state: a.state,
            postcode: a.postcode,
        }
    }
}

impl Nominatim {
    pub fn new(client: reqwest::Client, endpoint: &str, user_agent: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    fn build_request(&self, query: &SearchQuery) -> Result<reqwest::Request> {
        let mut params = vec![
            ("q", query.text.clone()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(country) = &query.country {
            params.push(("countrycodes", country.to_string()));
        }
        Ok(self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&params)
            .header(USER_AGENT, &self.user_agent)
            .build()?)
    }
}

#[async_trait]
impl GeocodingProvider for Nominatim {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Suggestion>> {
        let request = self.build_request(query)?;
        let body: Value = self
            .client
            .execute(request)
            .await
            .and_then(|res| res.error_for_status())
            .context("Failed to fetch address suggestions")?
            .json()
            .await
            .context("Address suggestions were not valid JSON")?;
        normalize(body)
    }
}

/// Map a Nominatim response body onto suggestions. The body is normally a
/// JSON array, but some Nominatim-compatible servers wrap it in
/// `{"results": [...]}`.
pub fn normalize(body: Value) -> Result<Vec<Suggestion>> {
    let records = match body {
        Value::Array(records) => records,
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(records)) => records,
            _ => bail!("Unexpected response from the address service"),
        },
        _ => bail!("Unexpected response from the address service"),
    };
    let total = records.len();
    let suggestions: Vec<Suggestion> =
        records.into_iter().filter_map(to_suggestion).collect();
    debug!(
        total,
        kept = suggestions.len(),
        "normalized nominatim results"
    );
    Ok(suggestions)
}

fn to_suggestion(record: Value) -> Option<Suggestion> {
    let latitude = parse_coordinate(record.get("lat"))?;
    let longitude = parse_coordinate(record.get("lon"))?;
    let address: NominatimAddress = record
        .get("address")
        .and_then(|a| serde_json::from_value(a.clone()).ok())
        .unwrap_or_default();
    let label = compose_label(
        &address.into(),
        record.get("display_name").and_then(Value::as_str),
    )?;
    Some(Suggestion {
        label,
        latitude,
        longitude,
        raw_source: record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place(display_name: &str, lat: Value, lon: Value) -> Value {
        json!({
            "place_id": 1234,
            "display_name": display_name,
            "lat": lat,
            "lon": lon,
        })
    }

    #[test]
    fn test_drops_records_without_coordinates() {
        let body = json!([
            place("1 First St, Austin, Texas", json!("30.26"), json!("-97.74")),
            { "display_name": "2 Second St, Austin, Texas", "lon": "-97.75" },
            place("3 Third St, Austin, Texas", json!(30.27), json!(-97.76)),
        ]);
        let suggestions = normalize(body).expect("array body");
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].label, "1 First St, Austin, Texas");
        assert_eq!(suggestions[1].label, "3 Third St, Austin, Texas");
        for s in &suggestions {
            assert!(s.latitude.is_finite() && s.longitude.is_finite());
        }
    }

    #[test]
    fn test_keeps_provider_order_and_raw_record() {
        let body = json!([
            place("B", json!("1"), json!("1")),
            place("A", json!("2"), json!("2")),
        ]);
        let suggestions = normalize(body).expect("array body");
        let labels: Vec<_> = suggestions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["B", "A"]);
        assert_eq!(suggestions[0].raw_source["place_id"], json!(1234));
        assert_eq!(suggestions[1].latitude, 2.0);
    }

    #[test]
    fn test_builds_label_from_address_details() {
        let body = json!({
            "results": [{
                "display_name": "1600, Pennsylvania Avenue Northwest, Ward 2, Washington, District of Columbia, 20500, United States",
                "lat": "38.8977",
                "lon": "-77.0365",
                "address": {
                    "house_number": "1600",
                    "road": "Pennsylvania Avenue Northwest",
                    "city": "Washington",
                    "state": "District of Columbia",
                    "postcode": "20500",
                    "country": "United States"
                }
            }]
        });
        let suggestions = normalize(body).expect("wrapped body");
        assert_eq!(
            suggestions[0].label,
            "1600 Pennsylvania Avenue Northwest, Washington, District of Columbia 20500"
        );
        assert_eq!(suggestions[0].longitude, -77.0365);
    }

    #[test]
    fn test_town_is_used_when_there_is_no_city() {
        let body = json!([{
            "display_name": "Main Street, Stowe, Vermont",
            "lat": "44.46",
            "lon": "-72.68",
            "address": { "road": "Main Street", "town": "Stowe", "state": "Vermont" }
        }]);
        let suggestions = normalize(body).expect("array body");
        assert_eq!(suggestions[0].label, "Main Street, Stowe, Vermont");
    }

    #[test]
    fn test_rejects_unexpected_shapes() {
        assert!(normalize(json!({ "error": "Unable to geocode" })).is_err());
        assert!(normalize(json!("nope")).is_err());
        assert!(normalize(json!([])).expect("empty array").is_empty());
    }

    #[test]
    fn test_request_parameters() {
        let nominatim = Nominatim::new(
            reqwest::Client::new(),
            "https://nominatim.example.org/",
            "zing-home-app",
        );
        let request = nominatim
            .build_request(&SearchQuery {
                text: "12 Elm St".into(),
                country: Some("US".parse().expect("valid code")),
                limit: 5,
            })
            .expect("request builds");
        assert_eq!(request.url().path(), "/search");
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("q"), Some("12 Elm St"));
        assert_eq!(get("format"), Some("json"));
        assert_eq!(get("addressdetails"), Some("1"));
        assert_eq!(get("limit"), Some("5"));
        assert_eq!(get("countrycodes"), Some("us"));
        assert_eq!(
            request.headers().get(USER_AGENT).map(|v| v.as_bytes()),
            Some(&b"zing-home-app"[..])
        );
    }

    #[test]
    fn test_request_without_country() {
        let nominatim = Nominatim::new(
            reqwest::Client::new(),
            "https://nominatim.example.org",
            "zing-home-app",
        );
        let request = nominatim
            .build_request(&SearchQuery {
                text: "12 Elm St".into(),
                country: None,
                limit: 5,
            })
            .expect("request builds");
        assert!(request
            .url()
            .query_pairs()
            .all(|(k, _)| k != "countrycodes"));
        assert!(request.url().query_pairs().any(|(k, v)| k == "q" && v == "12 Elm St"));
    }
}
