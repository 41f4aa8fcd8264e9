use super::{
    compose_label, parse_coordinate, AddressParts, GeocodingProvider,
    SearchQuery,
};
use crate::models::Suggestion;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Mapbox forward geocoding, restricted to street addresses.
pub struct Mapbox {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl Mapbox {
    pub fn new(client: reqwest::Client, endpoint: &str, access_token: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// The query goes in the path (`/{query}.json`), everything else in the
    /// query string.
    fn build_request(&self, query: &SearchQuery) -> Result<reqwest::Request> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("bad mapbox endpoint {:?}", self.endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("mapbox endpoint cannot take a path"))?
            .pop_if_empty()
            .push(&format!("{}.json", query.text));

        let mut params = vec![
            ("access_token", self.access_token.clone()),
            ("autocomplete", "true".to_string()),
            ("types", "address".to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(country) = &query.country {
            params.push(("country", country.to_string()));
        }
        Ok(self.client.get(url).query(&params).build()?)
    }
}

#[async_trait]
impl GeocodingProvider for Mapbox {
    fn name(&self) -> &'static str {
        "mapbox"
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
        Ok(normalize(body))
    }
}

/// A missing `features` array just means no matches.
pub fn normalize(body: Value) -> Vec<Suggestion> {
    let features = match body {
        Value::Object(mut obj) => match obj.remove("features") {
            Some(Value::Array(features)) => features,
            _ => vec![],
        },
        _ => vec![],
    };
    let total = features.len();
    let suggestions: Vec<Suggestion> =
        features.into_iter().filter_map(to_suggestion).collect();
    debug!(total, kept = suggestions.len(), "normalized mapbox results");
    suggestions
}

/// Context entries look like `{"id": "place.1234", "text": "Denver"}`; the
/// prefix says what kind of area it is.
fn context_text(feature: &Value, kind: &str) -> Option<String> {
    feature
        .get("context")?
        .as_array()?
        .iter()
        .find(|c| {
            c.get("id")
                .and_then(Value::as_str)
                .and_then(|id| id.split('.').next())
                == Some(kind)
        })?
        .get("text")?
        .as_str()
        .map(String::from)
}

fn to_suggestion(feature: Value) -> Option<Suggestion> {
    // [longitude, latitude]
    let coordinates = feature.get("geometry")?.get("coordinates")?;
    let longitude = parse_coordinate(coordinates.get(0))?;
    let latitude = parse_coordinate(coordinates.get(1))?;

    let parts = AddressParts {
        house_number: feature.get("address").and_then(Value::as_str).map(String::from),
        street: feature.get("text").and_then(Value::as_str).map(String::from),
        locality: context_text(&feature, "place")
            .or_else(|| context_text(&feature, "locality")),
        state: context_text(&feature, "region"),
        postcode: context_text(&feature, "postcode"),
    };
    let label = compose_label(
        &parts,
        feature.get("place_name").and_then(Value::as_str),
    )?;
    Some(Suggestion {
        label,
        latitude,
        longitude,
        raw_source: feature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_features() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "id": "address.1",
                    "place_name": "1550 Wewatta Street, Denver, Colorado 80202, United States",
                    "text": "Wewatta Street",
                    "address": "1550",
                    "geometry": { "type": "Point", "coordinates": [-105.0, 39.75] },
                    "context": [
                        { "id": "postcode.7", "text": "80202" },
                        { "id": "place.3", "text": "Denver" },
                        { "id": "region.2", "text": "Colorado" },
                        { "id": "country.1", "text": "United States" }
                    ]
                },
                {
                    "id": "address.2",
                    "place_name": "Nowhere",
                    "geometry": { "type": "Point", "coordinates": [] }
                },
                {
                    "id": "address.3",
                    "place_name": "Somewhere Else, Boulder, Colorado",
                    "geometry": { "coordinates": [-105.27, 40.01] }
                }
            ]
        });
        let suggestions = normalize(body);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(
            suggestions[0].label,
            "1550 Wewatta Street, Denver, Colorado 80202"
        );
        assert_eq!(suggestions[0].latitude, 39.75);
        assert_eq!(suggestions[0].longitude, -105.0);
        assert_eq!(suggestions[1].label, "Somewhere Else, Boulder, Colorado");
    }

    #[test]
    fn test_missing_features_is_empty() {
        assert!(normalize(json!({ "message": "Not Authorized" })).is_empty());
        assert!(normalize(json!([])).is_empty());
    }

    #[test]
    fn test_request_puts_query_in_path() {
        let mapbox = Mapbox::new(
            reqwest::Client::new(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/",
            "pk.token",
        );
        let request = mapbox
            .build_request(&SearchQuery {
                text: "12 Elm St".into(),
                country: None,
                limit: 5,
            })
            .expect("request builds");
        assert_eq!(
            request.url().path(),
            "/geocoding/v5/mapbox.places/12%20Elm%20St.json"
        );
        let query = request.url().query().unwrap_or_default();
        assert!(query.contains("access_token=pk.token"));
        assert!(query.contains("types=address"));
        assert!(query.contains("limit=5"));
        assert!(!query.contains("country="));
    }
}
