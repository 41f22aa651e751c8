//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
///
/// Registers all utoipa-documented routes, schemas, and tags. Serves as
/// the single source of truth for integrators.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crossdock API — Rate, Weight & Storage Billing Resolution",
        version = "0.3.2",
        description = "Billing resolution services for a package-forwarding platform.\n\nProvides:\n- **Geography resolution** — country to shipping-zone mapping\n- **Shipping quotes** — volumetric/chargeable weight and effective-dated rate resolution\n- **Warehouse operations** — package intake, lifecycle status, bin locations\n- **Bin assignment** — capacity and aggregate-weight constrained placement with full history\n- **Storage billing** — idempotent daily accrual with cumulative free-day allowances\n\nHealth probes (`/health/*`) and `/metrics` are served outside the `/v1` surface.",
        contact(name = "Crossdock", url = "https://crossdock.example.com")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // ── Zones ────────────────────────────────────────────────────────
        crate::routes::zones::create_zone,
        crate::routes::zones::list_zones,
        crate::routes::zones::resolve_country,
        crate::routes::zones::add_country,
        crate::routes::zones::remove_country,
        // ── Rates & quotes ───────────────────────────────────────────────
        crate::routes::rates::publish_rate,
        crate::routes::rates::list_rates,
        crate::routes::rates::create_quote,
        // ── Packages ─────────────────────────────────────────────────────
        crate::routes::packages::register_package,
        crate::routes::packages::get_package,
        crate::routes::packages::set_status,
        crate::routes::packages::assignment_history,
        crate::routes::packages::remove_assignment,
        // ── Bins ─────────────────────────────────────────────────────────
        crate::routes::bins::create_bin,
        crate::routes::bins::list_bins,
        crate::routes::bins::assign_package,
        crate::routes::bins::set_active,
        crate::routes::bins::occupancy_drift,
        // ── Storage pricing & charges ────────────────────────────────────
        crate::routes::storage::publish_pricing,
        crate::routes::storage::list_pricing,
        crate::routes::storage::accrue_package,
        crate::routes::storage::list_charges,
        crate::routes::storage::accrue_all,
        crate::routes::storage::mark_invoiced,
    ),
    components(
        schemas(
            // ── Error envelope ──────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Zone DTOs ───────────────────────────────────────────────
            crate::routes::zones::CreateZoneRequest,
            crate::routes::zones::AddCountryRequest,
            crate::routes::zones::ResolveZoneResponse,
            // ── Rate & quote DTOs ───────────────────────────────────────
            crate::routes::rates::DimensionsInput,
            crate::routes::rates::PublishRateRequest,
            crate::routes::rates::QuoteHttpRequest,
            // ── Package DTOs ────────────────────────────────────────────
            crate::routes::packages::RegisterPackageRequest,
            crate::routes::packages::SetStatusRequest,
            // ── Bin DTOs ────────────────────────────────────────────────
            crate::routes::bins::CreateBinRequest,
            crate::routes::bins::AssignPackageRequest,
            crate::routes::bins::SetActiveRequest,
            // ── Storage DTOs ────────────────────────────────────────────
            crate::routes::storage::PublishPricingRequest,
            crate::routes::storage::AccrueRequest,
        ),
    ),
    tags(
        (name = "zones", description = "Shipping zones and country-to-zone resolution"),
        (name = "rates", description = "Effective-dated shipping rates and quote computation"),
        (name = "packages", description = "Package intake, lifecycle status, and assignment history"),
        (name = "bins", description = "Bin locations, constrained assignment, and occupancy audit"),
        (name = "storage", description = "Storage pricing policies, daily accrual, and charge invoicing"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
