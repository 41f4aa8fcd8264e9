use super::{
    config::GeocoderConfig,
    geocoding::{provider_from_config, GeocodingProvider},
    lookup::AddressLookup,
    models::{Property, Suggestion},
    store::Store,
};
use anyhow::Result;
use tracing::info;

/// Everything one run of the app needs: the user's data and the address
/// lookup. The store is dropped with the session; nothing is saved.
pub struct Session<P> {
    pub store: Store,
    pub lookup: AddressLookup<P>,
}

impl Session<Box<dyn GeocodingProvider>> {
    /// A fresh store with a geocoder picked from the environment.
    pub fn from_env() -> Result<Self> {
        let config = GeocoderConfig::from_env()?;
        let provider = provider_from_config(&config)?;
        info!(provider = provider.name(), "starting session");
        Ok(Self::new(Store::default(), provider))
    }
}

impl<P: GeocodingProvider> Session<P> {
    pub fn new(store: Store, provider: P) -> Self {
        Self {
            store,
            lookup: AddressLookup::new(provider),
        }
    }

    /// Use the picked suggestion as the address of `property_id`, keeping
    /// its name. Suggestions are cleared once the address is saved. `None`
    /// if the property does not exist or the suggestion could not be
    /// resolved (in which case the lookup state says why).
    pub async fn commit_selection(
        &mut self,
        property_id: &str,
        suggestion: &Suggestion,
    ) -> Option<&Property> {
        let name = self.store.property(property_id)?.name.clone();
        let resolved = self.lookup.select(suggestion).await?;
        self.lookup.clear().await;
        self.store
            .update_property(property_id, Some(resolved.label), name)
    }
}
