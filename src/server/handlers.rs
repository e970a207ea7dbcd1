use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::location::{haversine_km, supported_city_list, CityInfo, Coordinate};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn bad_request(msg: impl Into<String>) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, msg.into())
}

fn checked_coordinate(lat: Option<f64>, lng: Option<f64>) -> Result<Coordinate, ApiError> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(bad_request("Provide 'lat' and 'lng' parameters"));
    };
    let coord = Coordinate::new(lat, lng);
    if !coord.is_valid() {
        return Err(bad_request("Invalid coordinates. Lat: -90..90, Lng: -180..180"));
    }
    Ok(coord)
}

/// Parse "lat,lng".
fn parse_coordinate(s: &str) -> Result<Coordinate, ApiError> {
    let invalid = || bad_request(format!("Invalid coordinate '{}', expected 'lat,lng'", s));
    let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    checked_coordinate(Some(lat), Some(lng))
}

// ─── GET /api/geocode ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct GeocodeResponse {
    pub coordinate: Option<Coordinate>,
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let address = params
        .address
        .ok_or_else(|| bad_request("Missing 'address' parameter"))?;
    let coordinate = state.resolver.client().geocode_address(&address).await;
    Ok(Json(GeocodeResponse { coordinate }))
}

// ─── GET /api/reverse ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CoordQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Serialize)]
pub struct ReverseResponse {
    pub address: Option<String>,
}

pub async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoordQuery>,
) -> Result<Json<ReverseResponse>, ApiError> {
    let coord = checked_coordinate(params.lat, params.lng)?;
    let address = state.resolver.client().reverse_geocode(coord).await;
    Ok(Json(ReverseResponse { address }))
}

// ─── GET /api/city ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CityQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Comma-separated allow-list; defaults to the supported cities.
    pub allowed: Option<String>,
}

#[derive(Serialize)]
pub struct CityResponse {
    pub city: Option<String>,
}

pub async fn city(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityQuery>,
) -> Result<Json<CityResponse>, ApiError> {
    let start = Instant::now();
    let coord = checked_coordinate(params.lat, params.lng)?;

    let allowed: Vec<String> = match params.allowed.as_deref() {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => state.default_cities.clone(),
    };

    let city = state.resolver.reverse_geocode_city(coord, &allowed).await;
    info!(
        %coord,
        city = city.as_deref().unwrap_or("-"),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/city"
    );
    Ok(Json(CityResponse { city }))
}

// ─── GET /api/distance ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct DistanceQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct DistanceResponse {
    pub km: f64,
}

pub async fn distance(Query(params): Query<DistanceQuery>) -> Result<Json<DistanceResponse>, ApiError> {
    let (Some(from), Some(to)) = (params.from.as_deref(), params.to.as_deref()) else {
        return Err(bad_request("Provide 'from' and 'to' as 'lat,lng'"));
    };
    let km = haversine_km(parse_coordinate(from)?, parse_coordinate(to)?);
    Ok(Json(DistanceResponse { km }))
}

// ─── GET /api/cities ─────────────────────────────────────────────

pub async fn city_list() -> Json<Vec<CityInfo>> {
    Json(supported_city_list())
}
