//! # Application State
//!
//! Shared state for the Axum router: the in-memory engines behind `Arc`,
//! the optional Postgres pool, and the process configuration. `AppState`
//! is cheap to clone; all engines are internally synchronized.

use std::sync::Arc;

use crossdock_billing::{AccrualEngine, ChargeLedger, PricingSchedule};
use crossdock_rates::{RateBook, RateQuoter, ZoneDirectory};
use crossdock_warehouse::WarehouseLedger;
use sqlx::PgPool;

/// Process configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Whether the Prometheus exporter and `/metrics` route are mounted.
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Read configuration from `CROSSDOCK_*` environment variables,
    /// falling back to development defaults.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("CROSSDOCK_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let metrics_enabled = std::env::var("CROSSDOCK_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);
        Self {
            bind_addr,
            metrics_enabled,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            metrics_enabled: true,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub zones: Arc<ZoneDirectory>,
    pub rates: Arc<RateBook>,
    pub quoter: RateQuoter,
    pub warehouse: Arc<WarehouseLedger>,
    pub pricing: Arc<PricingSchedule>,
    pub charges: Arc<ChargeLedger>,
    pub accrual: AccrualEngine,
    /// `None` when `DATABASE_URL` is unset (in-memory-only mode).
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Build fresh in-memory state with no persistence.
    pub fn new(config: AppConfig) -> Self {
        let zones = Arc::new(ZoneDirectory::new());
        let rates = Arc::new(RateBook::new());
        let warehouse = Arc::new(WarehouseLedger::new());
        let pricing = Arc::new(PricingSchedule::new());
        let charges = Arc::new(ChargeLedger::new());
        let quoter = RateQuoter::new(zones.clone(), rates.clone());
        let accrual = AccrualEngine::new(warehouse.clone(), pricing.clone(), charges.clone());
        Self {
            config,
            zones,
            rates,
            quoter,
            warehouse,
            pricing,
            charges,
            accrual,
            db_pool: None,
        }
    }

    /// Attach a database pool for audit mirroring and charge hydration.
    pub fn with_pool(mut self, pool: Option<PgPool>) -> Self {
        self.db_pool = pool;
        self
    }
}
