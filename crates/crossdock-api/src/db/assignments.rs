//! Assignment event mirroring.
//!
//! Write-only audit trail: one row per assignment open or closure. The
//! in-memory ledger is the source of truth; these rows are for offline
//! reconciliation and reporting.

use crossdock_warehouse::AssignmentRecord;
use sqlx::PgPool;

/// Record an assignment event ("assigned" or "removed").
///
/// Upserts on the assignment id so a closure updates the row written at
/// open time with its `removed_at`.
pub async fn record_event(
    pool: &PgPool,
    record: &AssignmentRecord,
    event: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO assignment_events (assignment_id, package_id, bin_id, assigned_at, removed_at, assignment_reason, removal_reason, last_event)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (assignment_id) DO UPDATE SET
            removed_at = EXCLUDED.removed_at,
            removal_reason = EXCLUDED.removal_reason,
            last_event = EXCLUDED.last_event",
    )
    .bind(*record.id.as_uuid())
    .bind(*record.package_id.as_uuid())
    .bind(*record.bin_id.as_uuid())
    .bind(record.assigned_at)
    .bind(record.removed_at)
    .bind(record.assignment_reason.as_deref())
    .bind(record.removal_reason.as_deref())
    .bind(event)
    .execute(pool)
    .await?;

    Ok(())
}
