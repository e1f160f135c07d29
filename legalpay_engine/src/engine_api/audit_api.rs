use std::fmt::Display;

use log::*;
use tokio::task::JoinHandle;

use crate::{
    config::AuditConfig,
    db_types::{AuditRecord, AuditStatus},
    events::{AuditEvent, EventHooks},
    traits::{AuditLedger, AuditTrailDatabase, AuditTrailError, NewAuditRecord},
};

pub const CONFIRMATION_TIMEOUT_PREFIX: &str = "confirmation timeout";
pub const REVERTED_MESSAGE: &str = "transaction reverted on ledger";

/// `AuditApi` owns the audit-record state machine: it persists accepted events, broadcasts them
/// to the ledger, watches for confirmations and re-drives failed submissions.
///
/// A record is only ever mutated by one task at a time: the submitter assigns the hash, then
/// exactly one watcher task runs it to `Confirmed` or `Failed`, and only then does it become
/// eligible for the sweeper. Errors on this path are recorded against the record and logged;
/// they are never propagated to the payment caller.
#[derive(Clone)]
pub struct AuditApi<B, L> {
    db: B,
    ledger: L,
    config: AuditConfig,
}

impl<B, L> AuditApi<B, L> {
    pub fn new(db: B, ledger: L, config: AuditConfig) -> Self {
        Self { db, ledger, config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }
}

/// Outcome of one retry sweep, for logging and metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records below the retry ceiling that the sweep attempted to re-broadcast.
    pub attempted: usize,
    /// Re-broadcasts that succeeded; these records are `Pending` again with a fresh hash.
    pub resubmitted: usize,
    /// Re-broadcasts that failed again; these records stay `Failed` with a bumped retry count.
    pub renewed_failures: usize,
}

impl Display for SweepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} attempted, {} resubmitted, {} failed again",
            self.attempted, self.resubmitted, self.renewed_failures
        )
    }
}

impl<B, L> AuditApi<B, L>
where
    B: AuditTrailDatabase + 'static,
    L: AuditLedger + 'static,
{
    /// Entry point for the event channel: submits the event and, when a hash was assigned, hands
    /// it to a confirmation watcher task. Swallows (and logs) every error, because nothing
    /// upstream of the audit trail may fail on account of it.
    pub async fn log_event(&self, event: AuditEvent) -> Option<AuditRecord> {
        match self.submit(&event).await {
            Ok(Some(record)) => {
                if let Some(tx_hash) = record.tx_hash.clone() {
                    self.watch_confirmation(record.id, tx_hash);
                }
                Some(record)
            },
            Ok(None) => None,
            Err(e) => {
                error!("⛓️ Audit logging failed for entity {}: {e}", event.entity_id);
                None
            },
        }
    }

    /// Persists the event as a `Pending` record and broadcasts it to the ledger.
    ///
    /// Returns `None` when the audit subsystem is administratively disabled (explicit no-op
    /// mode). A broadcast failure is recorded on the record (`Failed`, no retry-count change:
    /// counting attempts is the sweeper's job) and still returns the record. No deduplication
    /// happens here; callers that must not double-log the same logical event check
    /// [`Self::has_event`] first.
    pub async fn submit(&self, event: &AuditEvent) -> Result<Option<AuditRecord>, AuditTrailError> {
        if !self.config.enabled {
            warn!("⛓️ Audit trail is disabled. Event {} not logged for entity {}", event.event_type, event.entity_id);
            return Ok(None);
        }
        let new_record = NewAuditRecord {
            event_type: event.event_type,
            entity_id: event.entity_id.clone(),
            entity_type: event.entity_type.clone(),
            user_id: event.user_id.clone(),
            metadata: event.canonical_metadata(),
            network: self.config.network.clone(),
        };
        let record = self.db.insert_record(new_record).await?;
        match self
            .ledger
            .broadcast_event(event.event_type.code(), &event.entity_id, &event.user_id, &record.metadata)
            .await
        {
            Ok(tx_hash) => {
                let record = self.db.set_tx_hash(record.id, &tx_hash).await?;
                info!("⛓️ Audit event {} logged for entity {}. tx: {tx_hash}", event.event_type, event.entity_id);
                Ok(Some(record))
            },
            Err(e) => {
                error!("⛓️ Failed to broadcast audit event for entity {}: {e}", event.entity_id);
                let record = self.db.mark_failed(record.id, &e.to_string()).await?;
                Ok(Some(record))
            },
        }
    }

    /// Spawns the confirmation watcher for a broadcast transaction. Do not await the returned
    /// handle on the payment path; it runs for up to `max_poll_attempts * poll_interval`.
    pub fn watch_confirmation(&self, record_id: i64, tx_hash: String) -> JoinHandle<()> {
        let api = self.clone();
        tokio::spawn(async move {
            if let Err(e) = api.confirm(record_id, &tx_hash).await {
                error!("⛓️ Confirmation watcher for audit record {record_id} failed: {e}");
            }
        })
    }

    /// Polls the ledger for the transaction's receipt, bounded by the configured attempt ceiling.
    ///
    /// * Receipt present and successful: the record is confirmed with block number and gas
    ///   economics (cost = gas used x effective gas price).
    /// * Receipt present but reverted: the record fails with a "reverted" message.
    /// * Ceiling exhausted with no receipt: the record fails with a "confirmation timeout"
    ///   message. This is a *suspected* failure only — the transaction may still confirm later.
    ///   Bounded waiting is the trade-off; the sweeper (or an operator) picks up from there.
    pub async fn confirm(&self, record_id: i64, tx_hash: &str) -> Result<AuditRecord, AuditTrailError> {
        let mut timer = tokio::time::interval(self.config.poll_interval);
        for attempt in 1..=self.config.max_poll_attempts {
            timer.tick().await;
            match self.ledger.get_receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.is_success() => {
                    let cost = receipt.gas_used * receipt.effective_gas_price;
                    let record = self
                        .db
                        .mark_confirmed(record_id, receipt.block_number, receipt.gas_used, receipt.effective_gas_price, cost)
                        .await?;
                    info!(
                        "⛓️ Ledger transaction confirmed: {tx_hash} - block: {}, gas: {}",
                        receipt.block_number, receipt.gas_used
                    );
                    return Ok(record);
                },
                Ok(Some(_)) => {
                    error!("⛓️ Ledger transaction reverted: {tx_hash}");
                    return self.db.mark_failed(record_id, REVERTED_MESSAGE).await;
                },
                Ok(None) => {
                    trace!("⛓️ No receipt for {tx_hash} yet (attempt {attempt}/{})", self.config.max_poll_attempts);
                },
                Err(e) => {
                    // Transient lookup errors burn an attempt; the ceiling still bounds the task.
                    warn!("⛓️ Receipt lookup for {tx_hash} failed on attempt {attempt}: {e}");
                },
            }
        }
        let message = format!("{CONFIRMATION_TIMEOUT_PREFIX} after {} attempts", self.config.max_poll_attempts);
        warn!("⛓️ {message} for {tx_hash}. The transaction may still confirm out-of-band.");
        self.db.mark_failed(record_id, &message).await
    }

    /// Re-drives failed submissions: every `Failed` record below the retry ceiling is
    /// re-broadcast, oldest first.
    ///
    /// A successful re-broadcast requeues the record as `Pending` with a fresh hash and spawns a
    /// new confirmation watcher; a renewed failure replaces the error message. Either way the
    /// retry count increments by exactly one, so a record reaches the ceiling after
    /// `max_retries` sweep attempts and then stays `Failed` until an operator intervenes.
    pub async fn retry_failed(&self) -> Result<SweepReport, AuditTrailError> {
        let retryable = self.db.fetch_retryable(self.config.max_retries).await?;
        let mut report = SweepReport::default();
        for record in retryable {
            report.attempted += 1;
            info!("🧹️ Retrying ledger broadcast for audit record {} (entity {})", record.id, record.entity_id);
            match self
                .ledger
                .broadcast_event(record.event_type.code(), &record.entity_id, &record.user_id, &record.metadata)
                .await
            {
                Ok(tx_hash) => {
                    let requeued = self.db.requeue_record(record.id, &tx_hash).await?;
                    self.watch_confirmation(requeued.id, tx_hash);
                    report.resubmitted += 1;
                },
                Err(e) => {
                    warn!("🧹️ Retry failed for audit record {}: {e}", record.id);
                    self.db.record_retry_failure(record.id, &e.to_string()).await?;
                    report.renewed_failures += 1;
                },
            }
        }
        Ok(report)
    }

    /// Whether an event of this type has already been accepted for the entity. `submit` never
    /// deduplicates, so callers that need at-most-once audit entries check here first.
    pub async fn has_event(&self, entity_id: &str, event_type: crate::db_types::AuditEventType) -> Result<bool, AuditTrailError> {
        self.db.has_event(entity_id, event_type).await
    }

    /// The full audit trail for an entity, oldest first.
    pub async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditRecord>, AuditTrailError> {
        self.db.audit_trail(entity_id).await
    }

    pub async fn failed_count(&self) -> Result<i64, AuditTrailError> {
        self.db.count_by_status(AuditStatus::Failed).await
    }
}

/// Wires an [`AuditApi`] into the event channel: every published [`AuditEvent`] is submitted and
/// watched on its own task, fire-and-forget relative to the publisher.
pub fn audit_event_hooks<B, L>(api: AuditApi<B, L>) -> EventHooks
where
    B: AuditTrailDatabase + 'static,
    L: AuditLedger + 'static,
{
    let mut hooks = EventHooks::default();
    hooks.on_audit_event(move |event| {
        let api = api.clone();
        Box::pin(async move {
            let _ = api.log_event(event).await;
        })
    });
    hooks
}
