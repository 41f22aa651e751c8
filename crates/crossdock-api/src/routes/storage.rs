//! # Storage Pricing & Charge API Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/storage-pricing` | `publish_pricing` |
//! | `GET` | `/v1/storage-pricing` | `list_pricing` |
//! | `POST` | `/v1/packages/{package_id}/storage-charges/accrue` | `accrue_package` |
//! | `GET` | `/v1/packages/{package_id}/storage-charges` | `list_charges` |
//! | `POST` | `/v1/storage-charges/accrue-all` | `accrue_all` |
//! | `POST` | `/v1/storage-charges/{charge_id}/invoice` | `mark_invoiced` |

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use crossdock_billing::NewStoragePricing;
use crossdock_core::{ChargeId, Currency, EffectivePeriod, PackageId, WarehouseId};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to publish a storage pricing policy.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PublishPricingRequest {
    /// Omit for the tenant-wide default policy.
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub warehouse_id: Option<WarehouseId>,
    /// Cumulative free storage days per package.
    pub free_days: u32,
    #[schema(value_type = f64)]
    pub daily_rate: Decimal,
    /// ISO 4217 currency code.
    #[schema(value_type = String)]
    pub currency: Currency,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

/// Request to run accrual.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AccrueRequest {
    /// Exclusive end of the accrual window; defaults to today.
    #[serde(default)]
    pub through: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the storage pricing and charge router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/storage-pricing",
            post(publish_pricing).get(list_pricing),
        )
        .route(
            "/v1/packages/{package_id}/storage-charges/accrue",
            post(accrue_package),
        )
        .route(
            "/v1/packages/{package_id}/storage-charges",
            axum::routing::get(list_charges),
        )
        .route("/v1/storage-charges/accrue-all", post(accrue_all))
        .route("/v1/storage-charges/{charge_id}/invoice", post(mark_invoiced))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/storage-pricing — Publish a storage pricing policy.
#[utoipa::path(
    post,
    path = "/v1/storage-pricing",
    request_body = PublishPricingRequest,
    responses(
        (status = 201, description = "Pricing published"),
        (status = 409, description = "Effective period overlaps an existing policy", body = crate::error::ErrorBody),
        (status = 422, description = "Negative rate or empty period", body = crate::error::ErrorBody),
    ),
    tag = "storage"
)]
pub async fn publish_pricing(
    State(state): State<AppState>,
    Json(req): Json<PublishPricingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let effective = EffectivePeriod::new(req.effective_from, req.effective_until)?;
    let policy = state.pricing.publish(NewStoragePricing {
        warehouse_id: req.warehouse_id,
        free_days: req.free_days,
        daily_rate: req.daily_rate,
        currency: req.currency,
        effective,
    })?;
    let value = serde_json::to_value(&policy)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// GET /v1/storage-pricing — List pricing policies.
#[utoipa::path(
    get,
    path = "/v1/storage-pricing",
    responses((status = 200, description = "Policies, default scope first")),
    tag = "storage"
)]
pub async fn list_pricing(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let policies = state.pricing.list();
    let values: Vec<serde_json::Value> = policies
        .iter()
        .filter_map(|p| serde_json::to_value(p).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "policies": values, "total": values.len() }),
    ))
}

/// POST /v1/packages/{package_id}/storage-charges/accrue — Accrue one
/// package.
///
/// Idempotent: re-running with the same date emits nothing new.
#[utoipa::path(
    post,
    path = "/v1/packages/{package_id}/storage-charges/accrue",
    params(("package_id" = Uuid, Path, description = "Package UUID")),
    request_body = AccrueRequest,
    responses(
        (status = 200, description = "Rows emitted by this call (may be empty)"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
        (status = 409, description = "Pricing coverage gap", body = crate::error::ErrorBody),
    ),
    tag = "storage"
)]
pub async fn accrue_package(
    State(state): State<AppState>,
    Path(package_id): Path<uuid::Uuid>,
    Json(req): Json<AccrueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let through = req
        .through
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let rows = state
        .accrual
        .accrue_package(PackageId::from_uuid(package_id), through)?;

    if let Some(pool) = &state.db_pool {
        for row in &rows {
            if let Err(e) = db::charges::save_charge(pool, row).await {
                tracing::warn!(error = %e, charge = %row.id, "failed to mirror storage charge");
            }
        }
    }

    let values: Vec<serde_json::Value> = rows
        .iter()
        .filter_map(|c| serde_json::to_value(c).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "charges": values, "emitted": values.len(), "through": through }),
    ))
}

/// GET /v1/packages/{package_id}/storage-charges — List a package's
/// charges.
#[utoipa::path(
    get,
    path = "/v1/packages/{package_id}/storage-charges",
    params(("package_id" = Uuid, Path, description = "Package UUID")),
    responses(
        (status = 200, description = "Charges ordered by period start, with per-currency totals"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
    ),
    tag = "storage"
)]
pub async fn list_charges(
    State(state): State<AppState>,
    Path(package_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let package_id = PackageId::from_uuid(package_id);
    // 404 for unknown packages rather than an empty list.
    state.warehouse.get_package(package_id)?;
    let charges = state.charges.charges_for(package_id);
    let totals = state.charges.totals_for(package_id);
    let values: Vec<serde_json::Value> = charges
        .iter()
        .filter_map(|c| serde_json::to_value(c).ok())
        .collect();
    let totals: serde_json::Map<String, serde_json::Value> = totals
        .into_iter()
        .map(|(currency, amount)| {
            (
                currency.to_string(),
                serde_json::to_value(amount).unwrap_or(serde_json::Value::Null),
            )
        })
        .collect();
    Ok(Json(
        serde_json::json!({ "charges": values, "total": values.len(), "totals": totals }),
    ))
}

/// POST /v1/storage-charges/accrue-all — Run the batch accrual pass.
///
/// Skips terminal and never-assigned packages; per-package failures are
/// counted, not fatal.
#[utoipa::path(
    post,
    path = "/v1/storage-charges/accrue-all",
    request_body = AccrueRequest,
    responses((status = 200, description = "Pass summary")),
    tag = "storage"
)]
pub async fn accrue_all(
    State(state): State<AppState>,
    Json(req): Json<AccrueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let through = req
        .through
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let summary = state.accrual.run_accrual_pass(through);

    if let Some(pool) = &state.db_pool {
        // Mirror anything new; `save_charge` upserts, so re-mirroring
        // already-persisted rows is harmless.
        for row in state.charges.list_all() {
            if let Err(e) = db::charges::save_charge(pool, &row).await {
                tracing::warn!(error = %e, charge = %row.id, "failed to mirror storage charge");
            }
        }
    }

    let value = serde_json::to_value(&summary)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}

/// POST /v1/storage-charges/{charge_id}/invoice — Mark a charge invoiced.
#[utoipa::path(
    post,
    path = "/v1/storage-charges/{charge_id}/invoice",
    params(("charge_id" = Uuid, Path, description = "Charge UUID")),
    responses(
        (status = 200, description = "Charge marked invoiced (idempotent)"),
        (status = 404, description = "Charge not found", body = crate::error::ErrorBody),
    ),
    tag = "storage"
)]
pub async fn mark_invoiced(
    State(state): State<AppState>,
    Path(charge_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let charge = state.charges.mark_invoiced(ChargeId::from_uuid(charge_id))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::charges::save_charge(pool, &charge).await {
            tracing::warn!(error = %e, charge = %charge.id, "failed to mirror invoiced flag");
        }
    }

    let value = serde_json::to_value(&charge)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}
