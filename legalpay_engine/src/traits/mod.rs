//! # Interface contracts of the payment engine.
//!
//! This module defines the seams between the engine's business logic and everything that can fail
//! independently of it:
//!
//! * [`PaymentGatewayDatabase`] is the contract a storage backend must fulfil to run the payment
//!   capture flow: contracts, payment orders, and the atomic check-and-set status transitions
//!   that keep racing webhooks from clobbering terminal states.
//! * [`AuditTrailDatabase`] is the storage contract for the ledger audit trail: append-only
//!   records and the narrow set of status mutations the submitter, watcher and sweeper perform.
//! * [`PaymentGateway`] and [`AuditLedger`] wrap the two external services. Both are opaque:
//!   the gateway opens orders, the ledger broadcasts transactions and serves receipts.
mod audit_database;
mod collaborators;
mod payment_gateway_database;

pub use audit_database::{AuditTrailDatabase, AuditTrailError, NewAuditRecord};
pub use collaborators::{AuditLedger, PaymentGateway};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
