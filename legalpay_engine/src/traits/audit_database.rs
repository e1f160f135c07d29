use async_trait::async_trait;
use thiserror::Error;

use crate::db_types::{AuditEventType, AuditRecord, AuditStatus};

/// A freshly accepted audit event, ready to be persisted as a `Pending` record.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub event_type: AuditEventType,
    pub entity_id: String,
    pub entity_type: String,
    pub user_id: String,
    /// Canonical JSON metadata.
    pub metadata: String,
    pub network: String,
}

/// Storage contract for the ledger audit trail.
///
/// Records are append-only: nothing here deletes. The mutation surface is exactly the set of
/// status transitions the submitter, the confirmation watcher and the retry sweeper perform, and
/// each transition is a single atomic statement. `mark_confirmed` only fires from `Pending`, so a
/// record can never move backwards out of a terminal confirmation.
#[async_trait]
pub trait AuditTrailDatabase: Clone + Send + Sync {
    /// Persists a new record in `Pending` status with no transaction hash.
    async fn insert_record(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditTrailError>;

    async fn fetch_record(&self, id: i64) -> Result<AuditRecord, AuditTrailError>;

    /// Stores the hash returned by a successful broadcast. The record stays `Pending`.
    async fn set_tx_hash(&self, id: i64, tx_hash: &str) -> Result<AuditRecord, AuditTrailError>;

    /// Marks the record `Failed` with the given error message. Does not touch the retry count;
    /// counting attempts is the sweeper's job.
    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<AuditRecord, AuditTrailError>;

    /// Marks a `Pending` record `Confirmed` and stores the receipt economics. A record that is no
    /// longer `Pending` is left untouched and returned as-is.
    async fn mark_confirmed(
        &self,
        id: i64,
        block_number: i64,
        gas_used: i64,
        gas_price: i64,
        tx_cost: i64,
    ) -> Result<AuditRecord, AuditTrailError>;

    /// Returns a `Failed` record to `Pending` with a fresh transaction hash, clearing the error
    /// message and incrementing the retry count. Called by the sweeper after a successful
    /// re-broadcast.
    async fn requeue_record(&self, id: i64, tx_hash: &str) -> Result<AuditRecord, AuditTrailError>;

    /// Records another failed sweep attempt: increments the retry count and replaces the error
    /// message. The record stays `Failed`.
    async fn record_retry_failure(&self, id: i64, error_message: &str) -> Result<AuditRecord, AuditTrailError>;

    /// All `Failed` records with a retry count below the ceiling, oldest first.
    async fn fetch_retryable(&self, max_retries: i64) -> Result<Vec<AuditRecord>, AuditTrailError>;

    /// Whether at least one record exists for the given entity and event type, in any status.
    async fn has_event(&self, entity_id: &str, event_type: AuditEventType) -> Result<bool, AuditTrailError>;

    /// The full trail for an entity, ordered by creation time ascending.
    async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditRecord>, AuditTrailError>;

    /// Number of records currently in the given status. Used for sweep reporting.
    async fn count_by_status(&self, status: AuditStatus) -> Result<i64, AuditTrailError>;
}

#[derive(Debug, Clone, Error)]
pub enum AuditTrailError {
    #[error("We have an internal database engine issue (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested audit record (internal id {0}) does not exist")]
    RecordNotFound(i64),
}

impl From<sqlx::Error> for AuditTrailError {
    fn from(e: sqlx::Error) -> Self {
        AuditTrailError::DatabaseError(e.to_string())
    }
}
