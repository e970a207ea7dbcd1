use crate::location::CityResolver;

pub struct AppState {
    pub resolver: CityResolver,
    /// Allow-list used when a request does not send one.
    pub default_cities: Vec<String>,
}
