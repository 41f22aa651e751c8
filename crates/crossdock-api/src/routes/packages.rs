//! # Package API Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/packages` | `register_package` |
//! | `GET` | `/v1/packages/{package_id}` | `get_package` |
//! | `POST` | `/v1/packages/{package_id}/status` | `set_status` |
//! | `GET` | `/v1/packages/{package_id}/assignments` | `assignment_history` |
//! | `DELETE` | `/v1/packages/{package_id}/assignment` | `remove_assignment` |

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use crossdock_core::{PackageId, PackageStatus, WarehouseId, WeightKg};
use crossdock_warehouse::NewPackage;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::db;
use crate::error::AppError;
use crate::routes::rates::DimensionsInput;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to register a package at intake.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterPackageRequest {
    #[schema(value_type = String, format = Uuid)]
    pub warehouse_id: WarehouseId,
    pub tracking_number: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = f64)]
    pub actual_weight_kg: Decimal,
    #[serde(default)]
    pub dimensions: Option<DimensionsInput>,
    /// Backfill hook for migrated records; defaults to now.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

/// Query parameters for closing an assignment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveAssignmentParams {
    /// Operator-supplied reason for the removal, recorded on the
    /// assignment (e.g. "shipped", "repack").
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to update a package's lifecycle status.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetStatusRequest {
    /// One of the package lifecycle statuses, e.g. "RECEIVED", "SHIPPED".
    #[schema(value_type = String)]
    pub status: PackageStatus,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the package router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/packages", post(register_package))
        .route("/v1/packages/{package_id}", get(get_package))
        .route("/v1/packages/{package_id}/status", post(set_status))
        .route(
            "/v1/packages/{package_id}/assignments",
            get(assignment_history),
        )
        .route(
            "/v1/packages/{package_id}/assignment",
            delete(remove_assignment),
        )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/packages — Register a package at intake.
#[utoipa::path(
    post,
    path = "/v1/packages",
    request_body = RegisterPackageRequest,
    responses(
        (status = 201, description = "Package registered"),
        (status = 422, description = "Invalid weight, dimensions, or tracking number", body = crate::error::ErrorBody),
    ),
    tag = "packages"
)]
pub async fn register_package(
    State(state): State<AppState>,
    Json(req): Json<RegisterPackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actual_weight = WeightKg::new(req.actual_weight_kg)?;
    let dimensions = req.dimensions.map(DimensionsInput::to_dimensions).transpose()?;
    let package = state.warehouse.register_package(NewPackage {
        warehouse_id: req.warehouse_id,
        tracking_number: req.tracking_number,
        description: req.description,
        actual_weight,
        dimensions,
        received_at: req.received_at,
    })?;
    let value = serde_json::to_value(&package)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// GET /v1/packages/{package_id} — Fetch a package.
///
/// The response includes the derived chargeable weight alongside the
/// stored fields.
#[utoipa::path(
    get,
    path = "/v1/packages/{package_id}",
    params(("package_id" = Uuid, Path, description = "Package UUID")),
    responses(
        (status = 200, description = "Package details"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
    ),
    tag = "packages"
)]
pub async fn get_package(
    State(state): State<AppState>,
    Path(package_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let package = state
        .warehouse
        .get_package(PackageId::from_uuid(package_id))?;
    let chargeable = package.chargeable_weight();
    let mut value = serde_json::to_value(&package)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "chargeable_weight_kg".to_string(),
            serde_json::to_value(chargeable).unwrap_or(serde_json::Value::Null),
        );
    }
    Ok(Json(value))
}

/// POST /v1/packages/{package_id}/status — Update lifecycle status.
///
/// Moving to a terminal status (shipped, delivered, disposed, …) also
/// closes any open bin assignment.
#[utoipa::path(
    post,
    path = "/v1/packages/{package_id}/status",
    params(("package_id" = Uuid, Path, description = "Package UUID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
    ),
    tag = "packages"
)]
pub async fn set_status(
    State(state): State<AppState>,
    Path(package_id): Path<uuid::Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let package_id = PackageId::from_uuid(package_id);
    let package = state.warehouse.set_status(package_id, req.status)?;

    // Terminal transitions close the open assignment; mirror the closure.
    if req.status.is_terminal_for_billing() {
        if let Some(pool) = &state.db_pool {
            if let Some(record) = state
                .warehouse
                .assignment_history(package_id)?
                .into_iter()
                .last()
            {
                if let Err(e) = db::assignments::record_event(pool, &record, "removed").await {
                    tracing::warn!(error = %e, package = %package_id, "failed to mirror assignment closure");
                }
            }
        }
    }

    let value = serde_json::to_value(&package)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}

/// GET /v1/packages/{package_id}/assignments — Full assignment history.
#[utoipa::path(
    get,
    path = "/v1/packages/{package_id}/assignments",
    params(("package_id" = Uuid, Path, description = "Package UUID")),
    responses(
        (status = 200, description = "Assignment history, oldest first"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
    ),
    tag = "packages"
)]
pub async fn assignment_history(
    State(state): State<AppState>,
    Path(package_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = state
        .warehouse
        .assignment_history(PackageId::from_uuid(package_id))?;
    let values: Vec<serde_json::Value> = history
        .iter()
        .filter_map(|a| serde_json::to_value(a).ok())
        .collect();
    Ok(Json(
        serde_json::json!({ "assignments": values, "total": values.len() }),
    ))
}

/// DELETE /v1/packages/{package_id}/assignment — Remove from current bin.
#[utoipa::path(
    delete,
    path = "/v1/packages/{package_id}/assignment",
    params(
        ("package_id" = Uuid, Path, description = "Package UUID"),
        ("reason" = Option<String>, Query, description = "Reason for the removal"),
    ),
    responses(
        (status = 200, description = "Assignment closed"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
        (status = 409, description = "No active assignment", body = crate::error::ErrorBody),
    ),
    tag = "packages"
)]
pub async fn remove_assignment(
    State(state): State<AppState>,
    Path(package_id): Path<uuid::Uuid>,
    Query(params): Query<RemoveAssignmentParams>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.warehouse.remove_full(
        PackageId::from_uuid(package_id),
        Utc::now(),
        params.reason,
    )?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::assignments::record_event(pool, &record, "removed").await {
            tracing::warn!(error = %e, assignment = %record.id, "failed to mirror assignment removal");
        }
    }

    let value = serde_json::to_value(&record)
        .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
    Ok(Json(value))
}
