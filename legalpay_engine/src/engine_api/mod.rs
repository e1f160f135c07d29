//! # The payment engine public API
//!
//! * [`PaymentFlowApi`] drives the payment-order state machine: opening orders against the
//!   gateway, verifying and capturing payments, and absorbing webhook failure notices.
//! * [`ContractApi`] covers the slice of the contract lifecycle the engine owns: creation,
//!   signing and activation, each anchored on the audit ledger.
//! * [`AuditApi`] owns the audit-record state machine: submission, ledger confirmation and the
//!   retry sweep.
pub mod audit_api;
pub mod contract_api;
pub mod payment_flow_api;

pub use audit_api::{audit_event_hooks, AuditApi, SweepReport};
pub use contract_api::ContractApi;
pub use payment_flow_api::PaymentFlowApi;
