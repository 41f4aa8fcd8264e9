//! Address autocomplete state. Callers feed it whatever is in the address
//! box; it talks to the configured geocoder and keeps the latest
//! suggestions, whether a request is in flight, and the last error.
//!
//! Nothing here debounces. Every `search` that passes the length check is
//! one request. Requests are not cancelled either, so a slow response can
//! arrive after a newer one; each request is tagged with a generation and
//! only the newest generation is allowed to touch the state.

use crate::{
    config::{MIN_QUERY_LEN, SUGGESTION_LIMIT},
    errors::LookupError,
    geocoding::{CountryCode, GeocodingProvider, SearchQuery},
    models::Suggestion,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupState {
    pub suggestions: Vec<Suggestion>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    state: LookupState,
    generation: u64,
}

pub struct AddressLookup<P> {
    provider: P,
    inner: RwLock<Inner>,
}

impl<P: GeocodingProvider> AddressLookup<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn state(&self) -> LookupState {
        self.inner.read().await.state.clone()
    }

    /// Look up `query`, optionally only within `region`, and return the
    /// state as it stands when this call is done. Provider failures end up
    /// in `error`; this never fails.
    pub async fn search(
        &self,
        query: &str,
        region: Option<&CountryCode>,
    ) -> LookupState {
        let text = query.trim();
        if text.chars().count() < MIN_QUERY_LEN {
            let mut inner = self.inner.write().await;
            // Anything still in flight was for a longer query that is no
            // longer in the box.
            inner.generation += 1;
            inner.state.suggestions.clear();
            inner.state.loading = false;
            return inner.state.clone();
        }

        let search = SearchQuery {
            text: text.to_string(),
            country: region.cloned(),
            limit: SUGGESTION_LIMIT,
        };
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.state.loading = true;
            inner.state.error = None;
            inner.generation
        };
        debug!(
            provider = self.provider.name(),
            generation,
            query_len = search.text.chars().count(),
            country = ?search.country,
            "searching for address"
        );

        let result = self
            .provider
            .search(&search)
            .await
            .map_err(LookupError::from);

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            debug!(
                generation,
                current = inner.generation,
                "discarding stale address results"
            );
            return inner.state.clone();
        }
        inner.state.loading = false;
        match result {
            Ok(suggestions) => {
                debug!(generation, count = suggestions.len(), "address results");
                inner.state.suggestions = suggestions;
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "address lookup failed");
                inner.state.suggestions.clear();
                inner.state.error = Some(e.user_message());
            }
        }
        inner.state.clone()
    }

    /// Forget suggestions and errors, and ignore any request still in
    /// flight.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.state = LookupState::default();
    }

    /// Resolve the suggestion the user picked. This is the only place a
    /// provider may make a second round trip; the result is `None` (with
    /// `error` set) if that fails or yields unusable coordinates.
    pub async fn select(&self, suggestion: &Suggestion) -> Option<Suggestion> {
        let resolved = self
            .provider
            .resolve_details(suggestion)
            .await
            .map_err(LookupError::from)
            .and_then(|s| {
                if s.coordinates().is_valid() {
                    Ok(s)
                } else {
                    Err(LookupError::from(anyhow::anyhow!(
                        "That address has no usable location"
                    )))
                }
            });
        match resolved {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "could not resolve address");
                self.inner.write().await.state.error = Some(e.user_message());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use futures::join;
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };
    use tokio::sync::oneshot;

    fn suggestion(label: &str) -> Suggestion {
        Suggestion {
            label: label.to_string(),
            latitude: 40.0,
            longitude: -75.0,
            raw_source: json!({ "display_name": label }),
        }
    }

    /// Answers every query with one suggestion labelled after the query.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
        seen: Mutex<Vec<SearchQuery>>,
    }

    #[async_trait]
    impl GeocodingProvider for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }
        async fn search(&self, query: &SearchQuery) -> Result<Vec<Suggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(query.clone());
            }
            Ok(vec![suggestion(&query.text)])
        }
    }

    struct Failing;

    #[async_trait]
    impl GeocodingProvider for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Suggestion>> {
            bail!("Failed to fetch address suggestions")
        }
        async fn resolve_details(&self, _s: &Suggestion) -> Result<Suggestion> {
            bail!("Failed to get place details")
        }
    }

    /// Holds each search until the test releases it, so that responses can
    /// be made to arrive in any order.
    struct Gated {
        gates: Mutex<Vec<(String, oneshot::Receiver<()>)>>,
    }

    #[async_trait]
    impl GeocodingProvider for Gated {
        fn name(&self) -> &'static str {
            "gated"
        }
        async fn search(&self, query: &SearchQuery) -> Result<Vec<Suggestion>> {
            let gate = self.gates.lock().ok().and_then(|mut gates| {
                let idx = gates.iter().position(|(q, _)| *q == query.text)?;
                Some(gates.remove(idx).1)
            });
            if let Some(gate) = gate {
                gate.await.ok();
            }
            Ok(vec![suggestion(&query.text)])
        }
    }

    #[tokio::test]
    async fn test_short_queries_never_reach_the_provider() {
        let lookup = AddressLookup::new(Echo::default());
        for query in ["", "a", "ab", "  ab  ", "é1"] {
            let state = lookup.search(query, None).await;
            assert!(state.suggestions.is_empty());
            assert!(!state.loading);
        }
        assert_eq!(lookup.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_length_counts_characters() {
        let lookup = AddressLookup::new(Echo::default());
        let state = lookup.search("Åre", None).await;
        assert_eq!(state.suggestions.len(), 1);
        assert_eq!(lookup.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_query_clears_previous_suggestions() {
        let lookup = AddressLookup::new(Echo::default());
        let state = lookup.search("12 Elm", None).await;
        assert_eq!(state.suggestions.len(), 1);
        let state = lookup.search("12", None).await;
        assert!(state.suggestions.is_empty());
        assert_eq!(lookup.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_passes_query_and_region() {
        let lookup = AddressLookup::new(Echo::default());
        let us: CountryCode = "US".parse().expect("valid");
        let state = lookup.search("  12 Elm St ", Some(&us)).await;
        assert_eq!(state.suggestions[0].label, "12 Elm St");
        assert!(!state.loading);
        assert_eq!(state.error, None);

        let seen = lookup.provider().seen.lock().expect("not poisoned");
        assert_eq!(
            seen[0],
            SearchQuery {
                text: "12 Elm St".into(),
                country: Some(us),
                limit: 5,
            }
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let lookup = AddressLookup::new(Failing);
        let state = lookup.search("12 Elm St", None).await;
        assert!(state.suggestions.is_empty());
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch address suggestions")
        );

        lookup.clear().await;
        assert_eq!(lookup.state().await, LookupState::default());
    }

    #[tokio::test]
    async fn test_new_search_clears_old_error() {
        let lookup = AddressLookup::new(Echo::default());
        lookup.inner.write().await.state.error = Some("old".into());
        let state = lookup.search("12 Elm St", None).await;
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_slow_earlier_response_does_not_win() {
        let (release_slow, slow_gate) = oneshot::channel();
        let (release_fast, fast_gate) = oneshot::channel();
        let lookup = AddressLookup::new(Gated {
            gates: Mutex::new(vec![
                ("12 El".to_string(), slow_gate),
                ("12 Elm St".to_string(), fast_gate),
            ]),
        });

        let slow = lookup.search("12 El", None);
        let fast = async {
            // Let the slow search register first, then finish the fast one
            // before releasing the slow one.
            tokio::task::yield_now().await;
            release_fast.send(()).ok();
            let state = lookup.search("12 Elm St", None).await;
            release_slow.send(()).ok();
            state
        };
        let (slow_state, fast_state) = join!(slow, fast);

        assert_eq!(fast_state.suggestions[0].label, "12 Elm St");
        assert_eq!(slow_state.suggestions[0].label, "12 Elm St");
        let state = lookup.state().await;
        assert_eq!(state.suggestions.len(), 1);
        assert_eq!(state.suggestions[0].label, "12 Elm St");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_clear_discards_in_flight_results() {
        let (release, gate) = oneshot::channel();
        let lookup = AddressLookup::new(Gated {
            gates: Mutex::new(vec![("12 Elm St".to_string(), gate)]),
        });
        let search = lookup.search("12 Elm St", None);
        let clear = async {
            tokio::task::yield_now().await;
            assert!(lookup.state().await.loading);
            lookup.clear().await;
            release.send(()).ok();
        };
        join!(search, clear);
        assert_eq!(lookup.state().await, LookupState::default());
    }

    #[tokio::test]
    async fn test_select() {
        let lookup = AddressLookup::new(Echo::default());
        let picked = suggestion("12 Elm St");
        assert_eq!(lookup.select(&picked).await, Some(picked.clone()));

        let mut nowhere = picked.clone();
        nowhere.latitude = f64::NAN;
        assert_eq!(lookup.select(&nowhere).await, None);
        assert!(lookup.state().await.error.is_some());

        let lookup = AddressLookup::new(Failing);
        assert_eq!(lookup.select(&picked).await, None);
        assert_eq!(
            lookup.state().await.error.as_deref(),
            Some("Failed to get place details")
        );
    }
}
