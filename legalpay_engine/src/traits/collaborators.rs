use async_trait::async_trait;
use ledger_tools::{LedgerApi, LedgerApiError, TxReceipt};
use lp_common::Rupee;
use razorpay_tools::{GatewayOrder, OrderNotes, RazorpayApi, RazorpayApiError};

/// The payment gateway, reduced to the one call the engine makes before any local write.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount: Rupee,
        currency: &str,
        receipt: &str,
        notes: OrderNotes,
    ) -> Result<GatewayOrder, RazorpayApiError>;
}

#[async_trait]
impl PaymentGateway for RazorpayApi {
    async fn create_order(
        &self,
        amount: Rupee,
        currency: &str,
        receipt: &str,
        notes: OrderNotes,
    ) -> Result<GatewayOrder, RazorpayApiError> {
        RazorpayApi::create_order(self, amount, currency, receipt, notes).await
    }
}

/// The audit ledger, reduced to broadcast-and-receipt. A returned hash means
/// accepted-for-mining; only a receipt proves the transaction landed.
#[async_trait]
pub trait AuditLedger: Clone + Send + Sync {
    async fn broadcast_event(
        &self,
        event_code: i64,
        entity_id: &str,
        user_id: &str,
        metadata_json: &str,
    ) -> Result<String, LedgerApiError>;

    async fn get_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, LedgerApiError>;
}

#[async_trait]
impl AuditLedger for LedgerApi {
    async fn broadcast_event(
        &self,
        event_code: i64,
        entity_id: &str,
        user_id: &str,
        metadata_json: &str,
    ) -> Result<String, LedgerApiError> {
        LedgerApi::broadcast_event(self, event_code, entity_id, user_id, metadata_json).await
    }

    async fn get_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, LedgerApiError> {
        LedgerApi::get_receipt(self, tx_hash).await
    }
}
