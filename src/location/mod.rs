//! Location resolution engine.
//!
//! Turns coordinates or free-text addresses into a coordinate and a canonical
//! city name from a caller-supplied allow-list, tolerating diacritics, spelling
//! variants and suburbs that belong to a larger city.

pub mod cache;
pub mod cities;
pub mod distance;
pub mod geocoder;
pub mod locality;
pub mod normalize;
pub mod position;
pub mod providers;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use cache::ForwardGeocodeCache;
pub use cities::{canonical_spelling, supported_city_list, supported_city_names, CityInfo, CityTables};
pub use distance::{haversine_km, nearest_first};
pub use geocoder::GeocodingClient;
pub use locality::extract_locality;
pub use normalize::normalize;
pub use position::{get_current_position, FixedPositionSource, PositionSource, POSITION_TIMEOUT};
pub use providers::{GeocodeProvider, GoogleGeocoder, HttpSettings, IpPositionSource, NominatimGeocoder};
pub use resolver::{CityMatch, CityResolver, MatchRule};
pub use types::{
    AddressComponent, Coordinate, GeocodeCandidate, GeocodeResult, Position, PositionError,
    PositionOptions, ProviderError,
};
