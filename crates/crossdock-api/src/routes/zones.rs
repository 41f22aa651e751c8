//! # Zone API Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/zones` | `create_zone` |
//! | `GET` | `/v1/zones` | `list_zones` |
//! | `GET` | `/v1/zones/resolve/{country}` | `resolve_country` |
//! | `POST` | `/v1/zones/{zone_id}/countries` | `add_country` |
//! | `DELETE` | `/v1/zones/{zone_id}/countries/{country}` | `remove_country` |

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use crossdock_core::{CountryCode, ZoneId};
use crossdock_rates::NewZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request to create a zone.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateZoneRequest {
    /// Zone display name, unique among zones.
    pub name: String,
    /// ISO 3166-1 alpha-2 country codes; each may belong to at most one
    /// active zone.
    pub countries: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to add a country to an existing zone.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddCountryRequest {
    pub country: String,
}

/// Result of resolving a country to its zone.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveZoneResponse {
    #[schema(value_type = String, format = Uuid)]
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub country: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the zone router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/zones", post(create_zone).get(list_zones))
        .route("/v1/zones/resolve/{country}", get(resolve_country))
        .route("/v1/zones/{zone_id}/countries", post(add_country))
        .route(
            "/v1/zones/{zone_id}/countries/{country}",
            delete(remove_country),
        )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/zones — Create a zone.
#[utoipa::path(
    post,
    path = "/v1/zones",
    request_body = CreateZoneRequest,
    responses(
        (status = 201, description = "Zone created"),
        (status = 409, description = "Country already zoned or duplicate name", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid country code or empty name", body = crate::error::ErrorBody),
    ),
    tag = "zones"
)]
pub async fn create_zone(
    State(state): State<AppState>,
    Json(req): Json<CreateZoneRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut countries = BTreeSet::new();
    for code in &req.countries {
        countries.insert(CountryCode::new(code)?);
    }
    let zone = state.zones.create_zone(NewZone {
        name: req.name,
        active: req.active,
        countries,
    })?;
    let value = serde_json::to_value(&zone)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// GET /v1/zones — List all zones.
#[utoipa::path(
    get,
    path = "/v1/zones",
    responses((status = 200, description = "List of zones")),
    tag = "zones"
)]
pub async fn list_zones(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let zones = state.zones.list();
    let values: Vec<serde_json::Value> = zones
        .iter()
        .filter_map(|z| serde_json::to_value(z).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "zones": values, "total": values.len() }),
    ))
}

/// GET /v1/zones/resolve/{country} — Resolve a country to its zone.
#[utoipa::path(
    get,
    path = "/v1/zones/resolve/{country}",
    params(("country" = String, Path, description = "ISO 3166-1 alpha-2 country code")),
    responses(
        (status = 200, description = "Zone serving the country", body = ResolveZoneResponse),
        (status = 404, description = "No active zone covers the country", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed country code", body = crate::error::ErrorBody),
    ),
    tag = "zones"
)]
pub async fn resolve_country(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = CountryCode::new(&country)?;
    let zone = state.zones.resolve(&code)?;
    Ok(Json(ResolveZoneResponse {
        zone_id: zone.id,
        zone_name: zone.name,
        country: code.to_string(),
    }))
}

/// POST /v1/zones/{zone_id}/countries — Add a country to a zone.
#[utoipa::path(
    post,
    path = "/v1/zones/{zone_id}/countries",
    params(("zone_id" = Uuid, Path, description = "Zone UUID")),
    request_body = AddCountryRequest,
    responses(
        (status = 200, description = "Country added"),
        (status = 404, description = "Zone not found", body = crate::error::ErrorBody),
        (status = 409, description = "Country already in another zone", body = crate::error::ErrorBody),
    ),
    tag = "zones"
)]
pub async fn add_country(
    State(state): State<AppState>,
    Path(zone_id): Path<uuid::Uuid>,
    Json(req): Json<AddCountryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let code = CountryCode::new(&req.country)?;
    let zone = state.zones.add_country(ZoneId::from_uuid(zone_id), code)?;
    let value = serde_json::to_value(&zone)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}

/// DELETE /v1/zones/{zone_id}/countries/{country} — Remove a country.
#[utoipa::path(
    delete,
    path = "/v1/zones/{zone_id}/countries/{country}",
    params(
        ("zone_id" = Uuid, Path, description = "Zone UUID"),
        ("country" = String, Path, description = "ISO 3166-1 alpha-2 country code"),
    ),
    responses(
        (status = 200, description = "Country removed"),
        (status = 404, description = "Zone not found", body = crate::error::ErrorBody),
    ),
    tag = "zones"
)]
pub async fn remove_country(
    State(state): State<AppState>,
    Path((zone_id, country)): Path<(uuid::Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let code = CountryCode::new(&country)?;
    let zone = state.zones.remove_country(ZoneId::from_uuid(zone_id), &code)?;
    let value = serde_json::to_value(&zone)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}
