//! Location providers: Google Geocoding, Nominatim, and IP geolocation.
//!
//! All HTTP goes through a blocking `ureq` agent moved onto tokio's blocking pool,
//! so callers only ever see async methods.

use super::position::PositionSource;
use super::types::{
    AddressComponent, Coordinate, GeocodeCandidate, GeocodeResult, Position, PositionError,
    PositionOptions, ProviderError,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// The two-call contract every geocoding backend satisfies.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Free-text address → ranked candidates.
    async fn forward(&self, address: &str) -> Result<GeocodeResult, ProviderError>;

    /// Coordinate → ranked candidates.
    async fn reverse(&self, coord: Coordinate) -> Result<GeocodeResult, ProviderError>;
}

// ─── HTTP plumbing ──────────────────────────────────────────────

/// Shared HTTP settings for every provider.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("EventLocator/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpSettings {
    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
    }
}

/// GET `url` with `query` on the blocking pool and decode the JSON body.
async fn get_json<T>(
    agent: ureq::Agent,
    url: String,
    query: Vec<(&'static str, String)>,
) -> Result<T, ProviderError>
where
    T: DeserializeOwned + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut request = agent.get(&url);
        for (key, value) in &query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => ProviderError::Http(code),
            ureq::Error::Transport(t) => ProviderError::Network(t.to_string()),
        })?;
        response
            .into_json::<T>()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    })
    .await
    .map_err(|e| ProviderError::Join(e.to_string()))?
}

// ─── Google Geocoding ───────────────────────────────────────────

pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Deserialize, Debug)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GoogleResult>,
}

#[derive(Deserialize, Debug)]
struct GoogleResult {
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    geometry: Option<GoogleGeometry>,
}

#[derive(Deserialize, Debug)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Deserialize, Debug)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

impl GoogleResponse {
    fn into_result(self) -> Result<GeocodeResult, ProviderError> {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(GeocodeResult::empty()),
            other => {
                let detail = match self.error_message {
                    Some(msg) => format!("{}: {}", other, msg),
                    None => other.to_string(),
                };
                return Err(ProviderError::Status(detail));
            }
        }
        let candidates = self
            .results
            .into_iter()
            .map(|r| GeocodeCandidate {
                formatted_address: r.formatted_address,
                location: r.geometry.map(|g| Coordinate::new(g.location.lat, g.location.lng)),
                address_components: r.address_components,
            })
            .collect();
        Ok(GeocodeResult { candidates })
    }
}

/// Google Maps Geocoding API client.
pub struct GoogleGeocoder {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    language: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>, http: &HttpSettings) -> Self {
        Self {
            agent: http.agent(),
            base_url: GOOGLE_GEOCODE_URL.to_string(),
            api_key: api_key.into(),
            language: None,
        }
    }

    /// Point the client at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Preferred response language, e.g. `"sv"` to get "Göteborg" over "Gothenburg".
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn params(&self, first: (&'static str, String)) -> Vec<(&'static str, String)> {
        let mut params = vec![first, ("key", self.api_key.clone())];
        if let Some(lang) = &self.language {
            params.push(("language", lang.clone()));
        }
        params
    }

    async fn fetch(&self, params: Vec<(&'static str, String)>) -> Result<GeocodeResult, ProviderError> {
        let response: GoogleResponse =
            get_json(self.agent.clone(), self.base_url.clone(), params).await?;
        response.into_result()
    }
}

#[async_trait]
impl GeocodeProvider for GoogleGeocoder {
    async fn forward(&self, address: &str) -> Result<GeocodeResult, ProviderError> {
        self.fetch(self.params(("address", address.to_string()))).await
    }

    async fn reverse(&self, coord: Coordinate) -> Result<GeocodeResult, ProviderError> {
        let latlng = format!("{},{}", coord.latitude, coord.longitude);
        self.fetch(self.params(("latlng", latlng))).await
    }
}

// ─── Nominatim ──────────────────────────────────────────────────

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// OSM address keys mapped onto component types, in output order.
const OSM_COMPONENT_TYPES: &[(&str, &[&str])] = &[
    ("road", &["route"]),
    ("hamlet", &["sublocality"]),
    ("neighbourhood", &["sublocality", "neighborhood"]),
    ("quarter", &["sublocality"]),
    ("suburb", &["sublocality", "sublocality_level_1"]),
    ("city_district", &["sublocality"]),
    ("village", &["locality", "political"]),
    ("town", &["locality", "political"]),
    ("city", &["locality", "political"]),
    ("municipality", &["administrative_area_level_2", "political"]),
    ("county", &["administrative_area_level_1", "political"]),
    ("state", &["administrative_area_level_1", "political"]),
    ("postcode", &["postal_code"]),
    ("country", &["country", "political"]),
];

#[derive(Deserialize, Debug)]
struct NominatimPlace {
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: HashMap<String, String>,
    #[serde(default)]
    error: Option<String>,
}

impl NominatimPlace {
    fn into_candidate(self) -> GeocodeCandidate {
        let location = match (self.lat.as_deref(), self.lon.as_deref()) {
            (Some(lat), Some(lon)) => match (lat.parse(), lon.parse()) {
                (Ok(lat), Ok(lon)) => Some(Coordinate::new(lat, lon)),
                _ => None,
            },
            _ => None,
        };
        let address_components = OSM_COMPONENT_TYPES
            .iter()
            .filter_map(|(key, types)| {
                self.address
                    .get(*key)
                    .map(|name| AddressComponent::new(name.as_str(), types))
            })
            .collect();
        GeocodeCandidate {
            formatted_address: self.display_name,
            location,
            address_components,
        }
    }
}

/// OpenStreetMap Nominatim client.
pub struct NominatimGeocoder {
    agent: ureq::Agent,
    base_url: String,
    language: Option<String>,
    limit: usize,
}

impl NominatimGeocoder {
    pub fn new(http: &HttpSettings) -> Self {
        Self {
            agent: http.agent(),
            base_url: NOMINATIM_URL.to_string(),
            language: None,
            limit: 5,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
        ];
        if let Some(lang) = &self.language {
            params.push(("accept-language", lang.clone()));
        }
        params
    }
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    async fn forward(&self, address: &str) -> Result<GeocodeResult, ProviderError> {
        let mut params = self.common_params();
        params.push(("q", address.to_string()));
        params.push(("limit", self.limit.to_string()));

        let places: Vec<NominatimPlace> =
            get_json(self.agent.clone(), format!("{}/search", self.base_url), params).await?;
        Ok(GeocodeResult {
            candidates: places.into_iter().map(NominatimPlace::into_candidate).collect(),
        })
    }

    async fn reverse(&self, coord: Coordinate) -> Result<GeocodeResult, ProviderError> {
        let mut params = self.common_params();
        params.push(("lat", coord.latitude.to_string()));
        params.push(("lon", coord.longitude.to_string()));

        let place: NominatimPlace =
            get_json(self.agent.clone(), format!("{}/reverse", self.base_url), params).await?;
        // Nominatim answers unmapped points with 200 + {"error": "Unable to geocode"}.
        if let Some(err) = &place.error {
            debug!(error = %err, "nominatim reverse returned no place");
            return Ok(GeocodeResult::empty());
        }
        Ok(GeocodeResult {
            candidates: vec![place.into_candidate()],
        })
    }
}

// ─── IP-based geolocation ───────────────────────────────────────

pub const IP_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Position source backed by an IP geolocation service.
///
/// City-level precision at best; the high-accuracy hint cannot be honoured.
pub struct IpPositionSource {
    agent: ureq::Agent,
    url: String,
}

impl IpPositionSource {
    pub fn new(http: &HttpSettings) -> Self {
        Self {
            agent: http.agent(),
            url: IP_GEOLOCATION_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

fn position_error(e: ProviderError) -> PositionError {
    match e {
        ProviderError::Http(401) | ProviderError::Http(403) => PositionError::PermissionDenied,
        other => PositionError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl PositionSource for IpPositionSource {
    async fn locate(&self, opts: &PositionOptions) -> Result<Position, PositionError> {
        if opts.high_accuracy {
            debug!("ip geolocation ignores the high-accuracy hint");
        }
        let r: IpApiResult = get_json(self.agent.clone(), self.url.clone(), Vec::new())
            .await
            .map_err(position_error)?;

        if r.error {
            return Err(PositionError::Unavailable(
                r.reason.unwrap_or_else(|| "ip lookup refused".into()),
            ));
        }
        match (r.latitude, r.longitude) {
            (Some(lat), Some(lon)) => Ok(Position {
                coordinate: Coordinate::new(lat, lon),
                accuracy_m: None,
                fixed_at: chrono::Utc::now(),
            }),
            _ => Err(PositionError::Unavailable("no coordinates in ip lookup".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::locality::extract_locality;

    #[test]
    fn test_google_ok_response() {
        let json = r#"{
            "status": "OK",
            "results": [{
                "formatted_address": "Frösundaleden 2, 169 70 Solna, Sverige",
                "address_components": [
                    {"long_name": "Solna", "short_name": "Solna", "types": ["locality", "political"]},
                    {"long_name": "Solna kommun", "short_name": "Solna kommun", "types": ["administrative_area_level_2", "political"]},
                    {"long_name": "Sverige", "short_name": "SE", "types": ["country", "political"]}
                ],
                "geometry": {"location": {"lat": 59.3725, "lng": 18.0002}, "location_type": "ROOFTOP"}
            }]
        }"#;
        let resp: GoogleResponse = serde_json::from_str(json).unwrap();
        let result = resp.into_result().unwrap();
        let top = result.top().unwrap();
        assert_eq!(top.location, Some(Coordinate::new(59.3725, 18.0002)));
        assert_eq!(extract_locality(top), Some("Solna"));
        assert_eq!(top.address_components[2].short_name, "SE");
    }

    #[test]
    fn test_google_zero_results_is_empty() {
        let resp: GoogleResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(resp.into_result().unwrap().is_empty());
    }

    #[test]
    fn test_google_denied_is_error() {
        let resp: GoogleResponse = serde_json::from_str(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "results": []}"#,
        )
        .unwrap();
        match resp.into_result() {
            Err(ProviderError::Status(msg)) => assert!(msg.starts_with("REQUEST_DENIED")),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_nominatim_address_mapping() {
        let json = r#"{
            "lat": "57.7781", "lon": "11.9985",
            "display_name": "Hisings Kärra, Göteborg, Göteborgs Stad, Västra Götalands län, Sverige",
            "address": {
                "suburb": "Hisings Kärra",
                "city": "Göteborg",
                "municipality": "Göteborgs Stad",
                "county": "Västra Götalands län",
                "country": "Sverige",
                "country_code": "se"
            }
        }"#;
        let place: NominatimPlace = serde_json::from_str(json).unwrap();
        let candidate = place.into_candidate();
        assert_eq!(candidate.location, Some(Coordinate::new(57.7781, 11.9985)));
        assert_eq!(extract_locality(&candidate), Some("Göteborg"));
        let suburb = &candidate.address_components[0];
        assert_eq!(suburb.long_name, "Hisings Kärra");
        assert!(suburb.has_type("sublocality"));
        // country_code has no mapping and is dropped
        assert_eq!(candidate.address_components.len(), 5);
    }

    #[test]
    fn test_nominatim_village_is_locality() {
        let place: NominatimPlace = serde_json::from_str(
            r#"{"lat": "56.0", "lon": "13.0", "display_name": "x", "address": {"village": "Dalby", "municipality": "Lunds kommun"}}"#,
        )
        .unwrap();
        assert_eq!(extract_locality(&place.into_candidate()), Some("Dalby"));
    }

    #[test]
    fn test_nominatim_error_payload() {
        let place: NominatimPlace =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(place.error.as_deref(), Some("Unable to geocode"));
        assert!(place.into_candidate().location.is_none());
    }

    #[test]
    fn test_position_error_mapping() {
        assert_eq!(position_error(ProviderError::Http(403)), PositionError::PermissionDenied);
        assert!(matches!(
            position_error(ProviderError::Network("dns".into())),
            PositionError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let http = HttpSettings {
            timeout: Duration::from_secs(2),
            ..HttpSettings::default()
        };
        let geocoder = GoogleGeocoder::new("key", &http).with_base_url("http://127.0.0.1:1/geocode");
        let err = geocoder.forward("Avenyn 1").await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)), "got {:?}", err);
    }
}
