//! Storage charge persistence.
//!
//! The charge ledger mirror: rows are saved as they are emitted and
//! loaded back at boot so high-water marks survive restarts. Amounts are
//! NUMERIC columns read back as `rust_decimal::Decimal` — no floats.

use chrono::{DateTime, NaiveDate, Utc};
use crossdock_billing::StorageCharge;
use crossdock_core::{BinId, ChargeId, Currency, MoneyError, PackageId, PricingId};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Save a charge row (upsert).
///
/// Only `is_invoiced` can change after the first write; the rest of the
/// row is immutable.
pub async fn save_charge(pool: &PgPool, charge: &StorageCharge) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO storage_charges (
            charge_id, package_id, bin_id, pricing_id,
            charge_from, charge_to, days_charged, free_days_applied,
            daily_rate, base_storage_fee, bin_location_fee, total_storage_fee,
            currency, is_invoiced, created_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         ON CONFLICT (charge_id) DO UPDATE SET
            is_invoiced = EXCLUDED.is_invoiced",
    )
    .bind(*charge.id.as_uuid())
    .bind(*charge.package_id.as_uuid())
    .bind(*charge.bin_id.as_uuid())
    .bind(*charge.pricing_id.as_uuid())
    .bind(charge.charge_from)
    .bind(charge.charge_to)
    .bind(charge.days_charged as i32)
    .bind(charge.free_days_applied as i32)
    .bind(charge.daily_rate)
    .bind(charge.base_storage_fee)
    .bind(charge.bin_location_fee)
    .bind(charge.total_storage_fee)
    .bind(charge.currency.as_str())
    .bind(charge.is_invoiced)
    .bind(charge.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every charge row for boot-time hydration, oldest first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<StorageCharge>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ChargeRow>(
        "SELECT charge_id, package_id, bin_id, pricing_id,
                charge_from, charge_to, days_charged, free_days_applied,
                daily_rate, base_storage_fee, bin_location_fee, total_storage_fee,
                currency, is_invoiced, created_at
         FROM storage_charges ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ChargeRow::into_charge).collect()
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct ChargeRow {
    charge_id: Uuid,
    package_id: Uuid,
    bin_id: Uuid,
    pricing_id: Uuid,
    charge_from: NaiveDate,
    charge_to: NaiveDate,
    days_charged: i32,
    free_days_applied: i32,
    daily_rate: Decimal,
    base_storage_fee: Decimal,
    bin_location_fee: Decimal,
    total_storage_fee: Decimal,
    currency: String,
    is_invoiced: bool,
    created_at: DateTime<Utc>,
}

impl ChargeRow {
    fn into_charge(self) -> Result<StorageCharge, sqlx::Error> {
        let currency = Currency::parse(&self.currency).map_err(|e: MoneyError| {
            sqlx::Error::Protocol(format!(
                "corrupt currency in charge {}: {e}",
                self.charge_id
            ))
        })?;
        Ok(StorageCharge {
            id: ChargeId::from_uuid(self.charge_id),
            package_id: PackageId::from_uuid(self.package_id),
            bin_id: BinId::from_uuid(self.bin_id),
            pricing_id: PricingId::from_uuid(self.pricing_id),
            charge_from: self.charge_from,
            charge_to: self.charge_to,
            days_charged: self.days_charged.max(0) as u32,
            free_days_applied: self.free_days_applied.max(0) as u32,
            daily_rate: self.daily_rate,
            base_storage_fee: self.base_storage_fee,
            bin_location_fee: self.bin_location_fee,
            total_storage_fee: self.total_storage_fee,
            currency,
            is_invoiced: self.is_invoiced,
            created_at: self.created_at,
        })
    }
}
