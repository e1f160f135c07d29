use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{AuditEventType, AuditRecord, AuditStatus},
    traits::{AuditTrailError, NewAuditRecord},
};

pub async fn insert_record(
    record: NewAuditRecord,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, AuditTrailError> {
    let record: AuditRecord = sqlx::query_as(
        r#"
            INSERT INTO audit_records (
                event_type,
                entity_id,
                entity_type,
                user_id,
                metadata,
                network,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, 'Pending')
            RETURNING *;
        "#,
    )
    .bind(record.event_type)
    .bind(record.entity_id)
    .bind(record.entity_type)
    .bind(record.user_id)
    .bind(record.metadata)
    .bind(record.network)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Audit record {} created for entity {} ({})", record.id, record.entity_id, record.event_type);
    Ok(record)
}

pub async fn fetch_record(id: i64, conn: &mut SqliteConnection) -> Result<AuditRecord, AuditTrailError> {
    let record: Option<AuditRecord> =
        sqlx::query_as("SELECT * FROM audit_records WHERE id = $1").bind(id).fetch_optional(conn).await?;
    record.ok_or(AuditTrailError::RecordNotFound(id))
}

pub async fn set_tx_hash(id: i64, tx_hash: &str, conn: &mut SqliteConnection) -> Result<AuditRecord, AuditTrailError> {
    let record: Option<AuditRecord> =
        sqlx::query_as("UPDATE audit_records SET tx_hash = $1 WHERE id = $2 RETURNING *")
            .bind(tx_hash)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    record.ok_or(AuditTrailError::RecordNotFound(id))
}

pub async fn mark_failed(
    id: i64,
    error_message: &str,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, AuditTrailError> {
    let record: Option<AuditRecord> =
        sqlx::query_as("UPDATE audit_records SET status = 'Failed', error_message = $1 WHERE id = $2 RETURNING *")
            .bind(error_message)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    record.ok_or(AuditTrailError::RecordNotFound(id))
}

/// Confirms a `Pending` record. The status guard keeps confirmations monotonic: a record that
/// already reached a terminal status is returned unchanged.
pub async fn mark_confirmed(
    id: i64,
    block_number: i64,
    gas_used: i64,
    gas_price: i64,
    tx_cost: i64,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, AuditTrailError> {
    let record: Option<AuditRecord> = sqlx::query_as(
        r#"
            UPDATE audit_records SET
                status = 'Confirmed',
                block_number = $1,
                gas_used = $2,
                gas_price = $3,
                tx_cost = $4,
                confirmed_at = CURRENT_TIMESTAMP
            WHERE id = $5 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(block_number)
    .bind(gas_used)
    .bind(gas_price)
    .bind(tx_cost)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    match record {
        Some(r) => Ok(r),
        // Not pending anymore. Return the record as it stands.
        None => fetch_record(id, conn).await,
    }
}

pub async fn requeue_record(id: i64, tx_hash: &str, conn: &mut SqliteConnection) -> Result<AuditRecord, AuditTrailError> {
    let record: Option<AuditRecord> = sqlx::query_as(
        r#"
            UPDATE audit_records SET
                status = 'Pending',
                tx_hash = $1,
                error_message = NULL,
                retry_count = retry_count + 1
            WHERE id = $2 AND status = 'Failed'
            RETURNING *;
        "#,
    )
    .bind(tx_hash)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    record.ok_or(AuditTrailError::RecordNotFound(id))
}

pub async fn record_retry_failure(
    id: i64,
    error_message: &str,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, AuditTrailError> {
    let record: Option<AuditRecord> = sqlx::query_as(
        "UPDATE audit_records SET retry_count = retry_count + 1, error_message = $1 WHERE id = $2 RETURNING *",
    )
    .bind(error_message)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    record.ok_or(AuditTrailError::RecordNotFound(id))
}

pub async fn fetch_retryable(
    max_retries: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<AuditRecord>, AuditTrailError> {
    let records = sqlx::query_as(
        "SELECT * FROM audit_records WHERE status = 'Failed' AND retry_count < $1 ORDER BY created_at ASC",
    )
    .bind(max_retries)
    .fetch_all(conn)
    .await?;
    Ok(records)
}

pub async fn has_event(
    entity_id: &str,
    event_type: AuditEventType,
    conn: &mut SqliteConnection,
) -> Result<bool, AuditTrailError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_records WHERE entity_id = $1 AND event_type = $2")
            .bind(entity_id)
            .bind(event_type)
            .fetch_one(conn)
            .await?;
    Ok(count > 0)
}

pub async fn audit_trail(entity_id: &str, conn: &mut SqliteConnection) -> Result<Vec<AuditRecord>, AuditTrailError> {
    let records = sqlx::query_as("SELECT * FROM audit_records WHERE entity_id = $1 ORDER BY created_at ASC")
        .bind(entity_id)
        .fetch_all(conn)
        .await?;
    trace!("🗃️ Audit trail for {entity_id}: {} records", records.len());
    Ok(records)
}

pub async fn count_by_status(status: AuditStatus, conn: &mut SqliteConnection) -> Result<i64, AuditTrailError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_records WHERE status = $1")
        .bind(status.to_string())
        .fetch_one(conn)
        .await?;
    Ok(count)
}
