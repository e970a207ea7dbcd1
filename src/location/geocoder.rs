//! Geocoding client: forward and reverse lookups with a forward-lookup memo.
//!
//! Provider failures never reach callers. They are logged with the input that
//! caused them and reported as `None`.

use super::cache::ForwardGeocodeCache;
use super::position::{self, PositionSource};
use super::providers::GeocodeProvider;
use super::types::{Coordinate, GeocodeResult, Position, PositionError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-facing geocoding operations over one provider and one cache.
#[derive(Clone)]
pub struct GeocodingClient {
    provider: Arc<dyn GeocodeProvider>,
    cache: ForwardGeocodeCache,
    position: Option<Arc<dyn PositionSource>>,
}

impl GeocodingClient {
    pub fn new(provider: Arc<dyn GeocodeProvider>, cache: ForwardGeocodeCache) -> Self {
        Self {
            provider,
            cache,
            position: None,
        }
    }

    /// Attach the platform position source used by [`Self::get_current_position`].
    pub fn with_position_source(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.position = Some(source);
        self
    }

    pub fn cache(&self) -> &ForwardGeocodeCache {
        &self.cache
    }

    /// Address → coordinate of the top candidate.
    ///
    /// Blank input never touches the network. A cached address is served from
    /// memory, so each distinct address costs at most one provider call.
    pub async fn geocode_address(&self, address: &str) -> Option<Coordinate> {
        if address.trim().is_empty() {
            return None;
        }
        if let Some(coord) = self.cache.get(address) {
            debug!(address, "forward geocode cache hit");
            return Some(coord);
        }

        let result = match self.provider.forward(address).await {
            Ok(r) => r,
            Err(e) => {
                warn!(address, error = %e, "forward geocode failed");
                return None;
            }
        };

        match result.top().and_then(|c| c.location) {
            Some(coord) => {
                self.cache.put(address, coord);
                Some(coord)
            }
            None => {
                warn!(
                    address,
                    candidates = result.candidates.len(),
                    "forward geocode returned no usable candidate"
                );
                None
            }
        }
    }

    /// Coordinate → the provider's best formatted address. Not cached.
    pub async fn reverse_geocode(&self, coord: Coordinate) -> Option<String> {
        let result = self.reverse_geocode_candidates(coord).await?;
        match result.top() {
            Some(top) if !top.formatted_address.is_empty() => Some(top.formatted_address.clone()),
            _ => {
                debug!(%coord, "reverse geocode returned no address");
                None
            }
        }
    }

    /// Coordinate → all ranked candidates, or `None` when the provider failed.
    pub async fn reverse_geocode_candidates(&self, coord: Coordinate) -> Option<GeocodeResult> {
        match self.provider.reverse(coord).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(%coord, error = %e, "reverse geocode failed");
                None
            }
        }
    }

    /// Current device position. Unsupported platform, denial and timeout surface as errors.
    pub async fn get_current_position(&self) -> Result<Position, PositionError> {
        position::get_current_position(self.position.as_deref()).await
    }
}
