//! Core types for the location subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// One typed address component of a geocoding candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn new(long_name: impl Into<String>, types: &[&str]) -> Self {
        let long_name = long_name.into();
        Self {
            short_name: long_name.clone(),
            long_name,
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// One ranked match returned by a geocoding query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub formatted_address: String,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// A provider response: candidates in rank order, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub candidates: Vec<GeocodeCandidate>,
}

impl GeocodeResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn top(&self) -> Option<&GeocodeCandidate> {
        self.candidates.first()
    }
}

/// A device position fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub coordinate: Coordinate,
    /// Accuracy radius in meters, when the source reports one.
    pub accuracy_m: Option<f64>,
    pub fixed_at: DateTime<Utc>,
}

/// Options handed to a position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// Errors surfaced by `get_current_position`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Geolocation is not supported on this platform")]
    Unsupported,
    #[error("Permission to read the device location was denied")]
    PermissionDenied,
    #[error("No position fix within {0:?}")]
    Timeout(Duration),
    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// Failures inside the geocoding provider layer. Never leaves the client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    Http(u16),
    #[error("Provider returned status {0}")]
    Status(String),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("Request task failed: {0}")]
    Join(String),
}
