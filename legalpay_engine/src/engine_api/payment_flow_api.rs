use std::fmt::Debug;

use log::*;
use lp_common::{Secret, INR_CURRENCY_CODE};
use razorpay_tools::OrderNotes;

use crate::{
    db_types::{ContractId, NewPaymentOrder, OrderId, PaymentOrder, PaymentOrderStatus},
    events::{AuditEvent, EventProducers},
    helpers::{verify_payment_signature, verify_webhook_signature},
    traits::{PaymentGateway, PaymentGatewayDatabase, PaymentGatewayError},
};

pub const SIGNATURE_FAILURE_CODE: &str = "SIGNATURE_VERIFICATION_FAILED";

/// `PaymentFlowApi` is the primary API for collecting payments against contracts. It owns the
/// payment-order state machine and hands audit events off to the audit subsystem through the
/// event channel, so the payment path never waits on the ledger.
pub struct PaymentFlowApi<B, G> {
    db: B,
    gateway: G,
    capture_secret: Secret<String>,
    webhook_secret: Secret<String>,
    producers: EventProducers,
}

impl<B, G> Debug for PaymentFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, G> PaymentFlowApi<B, G> {
    pub fn new(
        db: B,
        gateway: G,
        capture_secret: Secret<String>,
        webhook_secret: Secret<String>,
        producers: EventProducers,
    ) -> Self {
        Self { db, gateway, capture_secret, webhook_secret, producers }
    }
}

impl<B, G> PaymentFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    /// Opens a payment order for a contract.
    ///
    /// The contract must be in a state that allows payment collection (signed or active). The
    /// gateway call happens *before* any local write: a local order row without a gateway order
    /// id would be meaningless, so there is nothing to roll back if the gateway is down.
    pub async fn create_order(
        &self,
        contract_id: &ContractId,
        client_ip: Option<String>,
        client_user_agent: Option<String>,
    ) -> Result<PaymentOrder, PaymentGatewayError> {
        let contract = self
            .db
            .fetch_contract(contract_id)
            .await?
            .ok_or_else(|| PaymentGatewayError::ContractNotFound(contract_id.clone()))?;
        if !contract.status.allows_payment() {
            return Err(PaymentGatewayError::ContractNotEligible(contract.id, contract.status));
        }
        let receipt = format!("contract_{}", contract.id);
        let notes = OrderNotes::new(contract.id.as_str(), &contract.merchant_id, &contract.payer_id);
        let gateway_order = self
            .gateway
            .create_order(contract.principal, INR_CURRENCY_CODE, &receipt, notes)
            .await
            .map_err(|e| PaymentGatewayError::GatewayUnavailable(e.to_string()))?;
        let new_order = NewPaymentOrder::new(
            contract.id.clone(),
            contract.payer_id.clone(),
            contract.merchant_id.clone(),
            OrderId::from(gateway_order.id),
            contract.principal,
        )
        .with_client_info(client_ip, client_user_agent);
        let order = self.db.insert_order(new_order).await?;
        info!("💳️ Payment order {} opened for contract {} ({})", order.order_id, contract.id, order.amount);
        Ok(order)
    }

    /// Captures a payment against an order after verifying the gateway's capture signature.
    ///
    /// On a valid signature the order moves to `Captured`, the gateway payment id and signature
    /// are recorded exactly once, the contract's paid total is updated, and a `PaymentCompleted`
    /// audit event is published. The call returns as soon as the event is queued; ledger
    /// submission and confirmation happen on their own tasks.
    ///
    /// On an invalid signature the order moves to `Failed` and the call returns
    /// [`PaymentGatewayError::SignatureInvalid`]. This is a security-class error: the caller must
    /// not retry with the same signature. Replaying the same invalid signature again is absorbed
    /// by the terminal-state guard and produces no further writes.
    ///
    /// A replayed capture of an already-`Captured` order returns the stored order without
    /// touching the contract totals again.
    pub async fn capture(
        &self,
        order_id: &OrderId,
        payment_id: &str,
        signature: &str,
        payment_method: &str,
    ) -> Result<PaymentOrder, PaymentGatewayError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        let secret = self.capture_secret.reveal().as_bytes();
        if !verify_payment_signature(order_id.as_str(), payment_id, signature, secret) {
            match self.db.fail_order(order_id, SIGNATURE_FAILURE_CODE, "Payment signature verification failed").await? {
                Some(failed) => {
                    error!("💳️ Signature verification failed for order {order_id}. Order marked as failed.");
                    self.publish_audit_event(AuditEvent::payment_failed(&failed)).await;
                },
                None => {
                    debug!("💳️ Signature verification failed for order {order_id}, which is already terminal. No state change.");
                },
            }
            return Err(PaymentGatewayError::SignatureInvalid);
        }
        match self.db.capture_order(order_id, payment_id, signature, payment_method).await? {
            Some(captured) => {
                let contract = self.db.apply_payment_to_contract(&captured.contract_id, captured.amount).await?;
                info!(
                    "💳️ Payment {payment_id} captured for order {order_id}. Contract {} has now paid {} in total.",
                    contract.id, contract.total_paid
                );
                self.publish_audit_event(AuditEvent::payment_completed(&captured)).await;
                Ok(captured)
            },
            None => {
                // The CAS matched no rows, so the order is terminal. A replayed capture of a
                // Captured order is benign; anything else is a late callback losing the race.
                if order.status == PaymentOrderStatus::Captured {
                    debug!("💳️ Capture replay for order {order_id} ignored. Order is already captured.");
                } else {
                    warn!("💳️ Capture for order {order_id} arrived after terminal status {}. Ignored.", order.status);
                }
                let order = self
                    .db
                    .fetch_order_by_order_id(order_id)
                    .await?
                    .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
                Ok(order)
            },
        }
    }

    /// Handles a gateway-side failure notice for an order, typically delivered via webhook.
    ///
    /// Idempotent: gateways deliver webhooks more than once, and a failure notice may race a
    /// concurrent capture. If the order is already terminal (or unknown) this is a no-op and
    /// returns `None`; a `PaymentFailed` audit event is only published when a transition actually
    /// happened.
    pub async fn mark_failed(
        &self,
        order_id: &OrderId,
        error_code: &str,
        error_description: &str,
    ) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
        match self.db.fail_order(order_id, error_code, error_description).await? {
            Some(order) => {
                warn!("💳️ Payment failed for order {order_id}. Code: {error_code}, Description: {error_description}");
                self.publish_audit_event(AuditEvent::payment_failed(&order)).await;
                Ok(Some(order))
            },
            None => {
                debug!("💳️ Failure notice for order {order_id} ignored. Order is unknown or already terminal.");
                Ok(None)
            },
        }
    }

    /// Verifies the signature header on a raw webhook body. Unverified payloads must be rejected
    /// by the request layer before any engine call is made.
    pub fn verify_webhook(&self, body: &[u8], signature: &str) -> bool {
        verify_webhook_signature(body, signature, self.webhook_secret.reveal().as_bytes())
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    async fn publish_audit_event(&self, event: AuditEvent) {
        for producer in &self.producers.audit_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
