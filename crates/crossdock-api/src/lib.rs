//! # crossdock-api — Axum API Services for Crossdock
//!
//! Crossdock resolves the three billing questions of a package-forwarding
//! warehouse: what a shipment costs (zones, chargeable weight, effective-
//! dated rates), where a package physically sits (constrained bin
//! assignment with full history), and what its storage owes (idempotent
//! daily accrual with cumulative free-day allowances).
//!
//! ## API Surface
//!
//! | Prefix                  | Module               | Domain                 |
//! |-------------------------|----------------------|------------------------|
//! | `/v1/zones/*`           | [`routes::zones`]    | Geography resolution   |
//! | `/v1/rates`, `/v1/quotes` | [`routes::rates`]  | Rates & quoting        |
//! | `/v1/packages/*`        | [`routes::packages`] | Package lifecycle      |
//! | `/v1/bins/*`            | [`routes::bins`]     | Bin assignment         |
//! | `/v1/storage-pricing`, `/v1/storage-charges/*` | [`routes::storage`] | Storage billing |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI 3.1 spec via utoipa derive macros at `/openapi.json`.

pub mod db;
pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the API
/// surface. Pass the Prometheus handle from
/// [`metrics::install_recorder`] to mount the scrape endpoint; `None`
/// skips both the endpoint and the request-tracking middleware.
pub fn app(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    // Body size limit: 2 MiB. Prevents OOM from oversized request bodies.
    let mut api = Router::new()
        .merge(routes::zones::router())
        .merge(routes::rates::router())
        .merge(routes::packages::router())
        .merge(routes::bins::router())
        .merge(routes::storage::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    if prometheus.is_some() {
        api = api.layer(from_fn(metrics::track_http));
    }

    let api = api.layer(TraceLayer::new_for_http()).with_state(state.clone());

    // Unmetered health probes — readiness checks actual service health.
    let mut operational = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if let Some(handle) = prometheus {
        operational = operational
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(handle));
    }

    let operational = operational.with_state(state);

    Router::new().merge(operational).merge(api)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
async fn prometheus_metrics(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks:
/// - In-memory stores are accessible (read locks acquirable).
/// - Database connection is healthy (when configured).
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Verify stores are accessible (read lock acquirable).
    let _ = state.zones.list();
    let _ = state.rates.list();
    let _ = state.pricing.list();
    let _ = state.warehouse.list_packages();

    // Verify database connection (when configured).
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
