//! # Bin API Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/bins` | `create_bin` |
//! | `GET` | `/v1/bins` | `list_bins` |
//! | `POST` | `/v1/bins/{bin_id}/assignments` | `assign_package` |
//! | `POST` | `/v1/bins/{bin_id}/active` | `set_active` |
//! | `GET` | `/v1/bins/occupancy-drift` | `occupancy_drift` |

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use crossdock_core::{BinId, PackageId, WarehouseId, WeightKg};
use crossdock_warehouse::NewBin;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to create a bin location.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBinRequest {
    #[schema(value_type = String, format = Uuid)]
    pub warehouse_id: WarehouseId,
    /// Location code, unique within the warehouse.
    pub code: String,
    /// Package slots; must be at least 1.
    pub capacity: u32,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub max_weight_kg: Option<Decimal>,
    /// Extra per-day storage fee for this bin. Defaults to zero.
    #[serde(default)]
    #[schema(value_type = f64)]
    pub daily_premium: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to assign a package to a bin.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AssignPackageRequest {
    #[schema(value_type = String, format = Uuid)]
    pub package_id: PackageId,
    /// Operator-supplied reason for the placement, recorded on the
    /// assignment (e.g. "intake", "consolidation").
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to activate or deactivate a bin.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Query parameters for listing bins.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BinListParams {
    #[schema(value_type = String, format = Uuid)]
    pub warehouse_id: WarehouseId,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the bin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/bins", post(create_bin).get(list_bins))
        .route("/v1/bins/occupancy-drift", get(occupancy_drift))
        .route("/v1/bins/{bin_id}/assignments", post(assign_package))
        .route("/v1/bins/{bin_id}/active", post(set_active))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/bins — Create a bin location.
#[utoipa::path(
    post,
    path = "/v1/bins",
    request_body = CreateBinRequest,
    responses(
        (status = 201, description = "Bin created"),
        (status = 409, description = "Duplicate code within the warehouse", body = crate::error::ErrorBody),
        (status = 422, description = "Empty code, zero capacity, or negative premium", body = crate::error::ErrorBody),
    ),
    tag = "bins"
)]
pub async fn create_bin(
    State(state): State<AppState>,
    Json(req): Json<CreateBinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let max_weight_kg = req.max_weight_kg.map(WeightKg::new).transpose()?;
    let bin = state.warehouse.create_bin(NewBin {
        warehouse_id: req.warehouse_id,
        code: req.code,
        capacity: req.capacity,
        max_weight_kg,
        daily_premium: req.daily_premium,
        active: req.active,
    })?;
    let value = serde_json::to_value(&bin)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// GET /v1/bins?warehouse_id= — List bins in a warehouse.
#[utoipa::path(
    get,
    path = "/v1/bins",
    params(("warehouse_id" = Uuid, Query, description = "Warehouse UUID")),
    responses((status = 200, description = "Bins ordered by code")),
    tag = "bins"
)]
pub async fn list_bins(
    State(state): State<AppState>,
    Query(params): Query<BinListParams>,
) -> Result<impl IntoResponse, AppError> {
    let bins = state.warehouse.list_bins(params.warehouse_id);
    let values: Vec<serde_json::Value> = bins
        .iter()
        .filter_map(|b| serde_json::to_value(b).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "bins": values, "total": values.len() }),
    ))
}

/// POST /v1/bins/{bin_id}/assignments — Assign a package to a bin.
///
/// Capacity and aggregate-weight constraints are checked atomically with
/// the assignment itself. Assigning a package already binned elsewhere
/// moves it.
#[utoipa::path(
    post,
    path = "/v1/bins/{bin_id}/assignments",
    params(("bin_id" = Uuid, Path, description = "Bin UUID")),
    request_body = AssignPackageRequest,
    responses(
        (status = 201, description = "Package assigned"),
        (status = 404, description = "Bin or package not found", body = crate::error::ErrorBody),
        (status = 409, description = "Bin full, over weight, inactive, or package already here", body = crate::error::ErrorBody),
    ),
    tag = "bins"
)]
pub async fn assign_package(
    State(state): State<AppState>,
    Path(bin_id): Path<uuid::Uuid>,
    Json(req): Json<AssignPackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.warehouse.assign_full(
        req.package_id,
        BinId::from_uuid(bin_id),
        chrono::Utc::now(),
        req.reason,
    )?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::assignments::record_event(pool, &record, "assigned").await {
            tracing::warn!(error = %e, assignment = %record.id, "failed to mirror assignment");
        }
    }

    let value = serde_json::to_value(&record)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// POST /v1/bins/{bin_id}/active — Activate or deactivate a bin.
#[utoipa::path(
    post,
    path = "/v1/bins/{bin_id}/active",
    params(("bin_id" = Uuid, Path, description = "Bin UUID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Bin updated"),
        (status = 404, description = "Bin not found", body = crate::error::ErrorBody),
    ),
    tag = "bins"
)]
pub async fn set_active(
    State(state): State<AppState>,
    Path(bin_id): Path<uuid::Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let bin = state
        .warehouse
        .set_bin_active(BinId::from_uuid(bin_id), req.active)?;
    let value = serde_json::to_value(&bin)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}

/// GET /v1/bins/occupancy-drift — Audit stored occupancy counters.
///
/// Recomputes occupancy from the assignment history; an empty list is the
/// healthy result.
#[utoipa::path(
    get,
    path = "/v1/bins/occupancy-drift",
    responses((status = 200, description = "Bins whose counter disagrees with history")),
    tag = "bins"
)]
pub async fn occupancy_drift(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let drift = state.warehouse.verify_occupancy();
    let values: Vec<serde_json::Value> = drift
        .iter()
        .filter_map(|d| serde_json::to_value(d).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "drift": values, "total": values.len() }),
    ))
}
