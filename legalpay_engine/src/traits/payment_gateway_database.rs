use async_trait::async_trait;
use lp_common::Rupee;
use thiserror::Error;

use crate::db_types::{Contract, ContractId, ContractStatus, NewContract, NewPaymentOrder, OrderId, PaymentOrder};

/// Storage contract for the payment capture flow.
///
/// Transition methods are *atomic check-and-set* operations: they only move an order out of a
/// non-terminal state, and return `None` when no transition happened (the order was already
/// terminal). Gateways deliver webhooks more than once and a late failure notice can race a
/// concurrent capture; the single-statement CAS is what keeps the loser of that race from
/// overwriting a terminal state.
#[async_trait]
pub trait PaymentGatewayDatabase: Clone + Send + Sync {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Inserts a brand-new contract in `Draft` status.
    async fn insert_contract(&self, contract: NewContract) -> Result<Contract, PaymentGatewayError>;

    async fn fetch_contract(&self, id: &ContractId) -> Result<Option<Contract>, PaymentGatewayError>;

    /// Moves the contract to the given status. Returns the updated contract.
    async fn update_contract_status(
        &self,
        id: &ContractId,
        status: ContractStatus,
    ) -> Result<Contract, PaymentGatewayError>;

    /// Persists a new payment order in `Created` status. The gateway order id must be unique;
    /// a duplicate insert fails with [`PaymentGatewayError::OrderAlreadyExists`].
    async fn insert_order(&self, order: NewPaymentOrder) -> Result<PaymentOrder, PaymentGatewayError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<PaymentOrder>, PaymentGatewayError>;

    /// Atomically transitions a non-terminal order to `Captured`, setting the gateway payment id,
    /// the capture signature and `captured_at` exactly once. Returns `None` when the order is
    /// already terminal (replayed capture callbacks land here).
    async fn capture_order(
        &self,
        order_id: &OrderId,
        payment_id: &str,
        signature: &str,
        payment_method: &str,
    ) -> Result<Option<PaymentOrder>, PaymentGatewayError>;

    /// Atomically transitions a non-terminal order to `Failed` with the given error detail.
    /// Returns `None` when the order is already terminal (duplicate webhook deliveries land
    /// here).
    async fn fail_order(
        &self,
        order_id: &OrderId,
        error_code: &str,
        error_description: &str,
    ) -> Result<Option<PaymentOrder>, PaymentGatewayError>;

    /// Adds a captured amount to the contract's running total and stamps `last_payment_at`.
    async fn apply_payment_to_contract(
        &self,
        id: &ContractId,
        amount: Rupee,
    ) -> Result<Contract, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine issue (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested contract {0} does not exist")]
    ContractNotFound(ContractId),
    #[error("Contract {0} is in status {1}, which does not allow payment collection")]
    ContractNotEligible(ContractId, ContractStatus),
    #[error("The requested payment order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Cannot insert order, since it already exists with gateway order id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("Payment signature verification failed. This request must not be retried as-is.")]
    SignatureInvalid,
    #[error("The requested contract status change ({0} -> {1}) is forbidden")]
    ContractStatusChangeForbidden(ContractStatus, ContractStatus),
    #[error("The payment gateway is unavailable: {0}")]
    GatewayUnavailable(String),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
