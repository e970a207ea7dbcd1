//! Scripted provider for unit tests.

use super::providers::GeocodeProvider;
use super::types::{AddressComponent, Coordinate, GeocodeCandidate, GeocodeResult, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns canned results and counts calls.
#[derive(Clone, Default)]
pub struct MockProvider {
    forward: Option<GeocodeResult>,
    reverse: Option<GeocodeResult>,
    pub forward_calls: Arc<AtomicUsize>,
    pub reverse_calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Every call fails with a network error.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_forward(mut self, result: GeocodeResult) -> Self {
        self.forward = Some(result);
        self
    }

    pub fn with_reverse(mut self, result: GeocodeResult) -> Self {
        self.reverse = Some(result);
        self
    }

    pub fn forward_count(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub fn reverse_count(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeProvider for MockProvider {
    async fn forward(&self, _address: &str) -> Result<GeocodeResult, ProviderError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        self.forward
            .clone()
            .ok_or_else(|| ProviderError::Network("connection refused".into()))
    }

    async fn reverse(&self, _coord: Coordinate) -> Result<GeocodeResult, ProviderError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        self.reverse
            .clone()
            .ok_or_else(|| ProviderError::Network("connection refused".into()))
    }
}

/// A candidate whose only named component is tagged `locality`.
pub fn locality_candidate(name: &str) -> GeocodeCandidate {
    GeocodeCandidate {
        formatted_address: format!("{}, Sverige", name),
        location: None,
        address_components: vec![
            AddressComponent::new(name, &["locality", "political"]),
            AddressComponent::new("Sverige", &["country", "political"]),
        ],
    }
}

/// A reverse-geocode response with one locality candidate per name, in rank order.
pub fn localities(names: &[&str]) -> GeocodeResult {
    GeocodeResult {
        candidates: names.iter().map(|n| locality_candidate(n)).collect(),
    }
}
