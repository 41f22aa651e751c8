//! # Rate & Quote API Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/rates` | `publish_rate` |
//! | `GET` | `/v1/rates` | `list_rates` |
//! | `POST` | `/v1/quotes` | `create_quote` |

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use crossdock_core::weight::{chargeable_weight, volumetric_weight};
use crossdock_core::{
    CountryCode, Currency, EffectivePeriod, PackageDimensions, ServiceLevel, WarehouseId,
    WeightKg, ZoneId,
};
use crossdock_rates::{NewShippingRate, QuoteRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Physical dimensions in centimeters.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DimensionsInput {
    #[schema(value_type = f64)]
    pub length_cm: Decimal,
    #[schema(value_type = f64)]
    pub width_cm: Decimal,
    #[schema(value_type = f64)]
    pub height_cm: Decimal,
}

impl DimensionsInput {
    pub(crate) fn to_dimensions(self) -> Result<PackageDimensions, AppError> {
        Ok(PackageDimensions::new(
            self.length_cm,
            self.width_cm,
            self.height_cm,
        )?)
    }
}

/// Request to publish a shipping rate row.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PublishRateRequest {
    #[schema(value_type = String, format = Uuid)]
    pub warehouse_id: WarehouseId,
    #[schema(value_type = String, format = Uuid)]
    pub zone_id: ZoneId,
    /// "economy", "standard", or "express".
    #[schema(value_type = String)]
    pub service_level: ServiceLevel,
    #[schema(value_type = f64)]
    pub base_rate: Decimal,
    #[schema(value_type = f64)]
    pub per_kg_rate: Decimal,
    #[schema(value_type = f64)]
    pub min_charge: Decimal,
    /// Chargeable-weight ceiling for this rate, if any.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub max_weight_kg: Option<Decimal>,
    /// ISO 4217 currency code.
    #[schema(value_type = String)]
    pub currency: Currency,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

/// Request for a shipping quote.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct QuoteHttpRequest {
    #[schema(value_type = String, format = Uuid)]
    pub warehouse_id: WarehouseId,
    /// Destination country, ISO 3166-1 alpha-2.
    pub destination: String,
    #[schema(value_type = String)]
    pub service_level: ServiceLevel,
    /// Scale weight in kilograms.
    #[schema(value_type = f64)]
    pub actual_weight_kg: Decimal,
    #[serde(default)]
    pub dimensions: Option<DimensionsInput>,
    /// Reference date for rate selection; defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the rate and quote router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/rates", post(publish_rate).get(list_rates))
        .route("/v1/quotes", post(create_quote))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/rates — Publish an effective-dated shipping rate.
#[utoipa::path(
    post,
    path = "/v1/rates",
    request_body = PublishRateRequest,
    responses(
        (status = 201, description = "Rate published"),
        (status = 409, description = "Effective period overlaps an existing rate", body = crate::error::ErrorBody),
        (status = 422, description = "Negative amount or empty period", body = crate::error::ErrorBody),
    ),
    tag = "rates"
)]
pub async fn publish_rate(
    State(state): State<AppState>,
    Json(req): Json<PublishRateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let max_weight_kg = req.max_weight_kg.map(WeightKg::new).transpose()?;
    let effective = EffectivePeriod::new(req.effective_from, req.effective_until)?;
    let rate = state.rates.publish(NewShippingRate {
        warehouse_id: req.warehouse_id,
        zone_id: req.zone_id,
        service_level: req.service_level,
        base_rate: req.base_rate,
        per_kg_rate: req.per_kg_rate,
        min_charge: req.min_charge,
        max_weight_kg,
        currency: req.currency,
        effective,
    })?;
    let value = serde_json::to_value(&rate)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// GET /v1/rates — List all published rates.
#[utoipa::path(
    get,
    path = "/v1/rates",
    responses((status = 200, description = "List of rates")),
    tag = "rates"
)]
pub async fn list_rates(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rates = state.rates.list();
    let values: Vec<serde_json::Value> = rates
        .iter()
        .filter_map(|r| serde_json::to_value(r).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "rates": values, "total": values.len() }),
    ))
}

/// POST /v1/quotes — Compute a shipping quote.
///
/// Pure read: no state changes, identical requests yield identical quotes
/// for a given rate table.
#[utoipa::path(
    post,
    path = "/v1/quotes",
    request_body = QuoteHttpRequest,
    responses(
        (status = 200, description = "Quote computed"),
        (status = 404, description = "No zone for country or no rate for lane", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid weight, dimensions, or weight over rate ceiling", body = crate::error::ErrorBody),
    ),
    tag = "rates"
)]
pub async fn create_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteHttpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let destination = CountryCode::new(&req.destination)?;
    let actual = WeightKg::new(req.actual_weight_kg)?;
    let dims = req.dimensions.map(DimensionsInput::to_dimensions).transpose()?;
    let volumetric = volumetric_weight(dims.as_ref());
    let chargeable = chargeable_weight(actual, dims.as_ref());
    let as_of = req
        .as_of
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let quote = state.quoter.quote(&QuoteRequest {
        warehouse_id: req.warehouse_id,
        destination,
        service_level: req.service_level,
        chargeable_weight: chargeable,
        as_of,
    })?;

    let mut value = serde_json::to_value(&quote)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "actual_weight_kg".to_string(),
            serde_json::to_value(actual).unwrap_or(serde_json::Value::Null),
        );
        obj.insert(
            "volumetric_weight_kg".to_string(),
            serde_json::to_value(volumetric).unwrap_or(serde_json::Value::Null),
        );
    }
    Ok(Json(value))
}
