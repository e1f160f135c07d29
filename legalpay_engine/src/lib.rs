//! LegalPay Payment Engine
//!
//! The LegalPay engine collects payments against legal contracts and anchors every key lifecycle
//! event on an external append-only ledger, so that the audit trail can be verified independently
//! of this system. This library contains the core logic for both halves. It is provider-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should
//!    never need to access the database directly. Instead, use the public API provided by the
//!    engine. The exception is the data types used in the database, which are defined in the
//!    `db_types` module and are public.
//! 2. The engine public API ([`mod@engine_api`]). [`PaymentFlowApi`] owns the payment-order state
//!    machine and [`AuditApi`] owns the audit-record state machine. Backends need to implement the
//!    traits in the [`mod@traits`] module to drive these APIs.
//! 3. The event channel ([`mod@events`]). The payment path publishes audit events into an mpsc
//!    channel and returns immediately; the audit subsystem consumes them on its own tasks. A
//!    failure to reach the ledger never rolls back or fails a captured payment.
pub mod config;
pub mod db_types;
pub mod engine_api;
pub mod events;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
mod sweep_worker;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use config::AuditConfig;
pub use engine_api::{audit_event_hooks, AuditApi, ContractApi, PaymentFlowApi, SweepReport};
pub use sweep_worker::start_sweep_worker;
pub use traits::{
    AuditLedger,
    AuditTrailDatabase,
    AuditTrailError,
    PaymentGateway,
    PaymentGatewayDatabase,
    PaymentGatewayError,
};
