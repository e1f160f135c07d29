use lp_common::Rupee;

use crate::db_types::{AuditEventType, Contract, ContractId, PaymentOrder};

/// One lifecycle event destined for the audit ledger.
///
/// Metadata is an *ordered* list of key-value pairs; it is canonicalized (keys sorted, compact
/// JSON) before persistence so that the same logical event always serializes to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub entity_id: String,
    pub entity_type: String,
    pub user_id: String,
    pub metadata: Vec<(String, String)>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, entity_id: &str, entity_type: &str, user_id: &str) -> Self {
        Self {
            event_type,
            entity_id: entity_id.to_string(),
            entity_type: entity_type.to_string(),
            user_id: user_id.to_string(),
            metadata: Vec::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }

    /// Compact JSON object with keys in sorted order. Duplicate keys keep the last value.
    pub fn canonical_metadata(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        pairs.sort_by_key(|(k, _)| *k);
        let map: serde_json::Map<String, serde_json::Value> =
            pairs.into_iter().map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string()))).collect();
        serde_json::Value::Object(map).to_string()
    }

    pub fn payment_completed(order: &PaymentOrder) -> Self {
        let mut event = Self::new(AuditEventType::PaymentCompleted, order.contract_id.as_str(), "Payment", &order.payer_id)
            .with_meta("paymentOrderId", order.id)
            .with_meta("gatewayOrderId", order.order_id.as_str())
            .with_meta("contractId", order.contract_id.as_str())
            .with_meta("amount", order.amount)
            .with_meta("currency", &order.currency)
            .with_meta("status", order.status);
        if let Some(payment_id) = &order.payment_id {
            event = event.with_meta("gatewayPaymentId", payment_id);
        }
        if let Some(method) = &order.payment_method {
            event = event.with_meta("paymentMethod", method);
        }
        event
    }

    pub fn payment_failed(order: &PaymentOrder) -> Self {
        let mut event = Self::new(AuditEventType::PaymentFailed, order.contract_id.as_str(), "Payment", &order.payer_id)
            .with_meta("paymentOrderId", order.id)
            .with_meta("gatewayOrderId", order.order_id.as_str())
            .with_meta("contractId", order.contract_id.as_str())
            .with_meta("amount", order.amount)
            .with_meta("status", order.status);
        if let Some(code) = &order.error_code {
            event = event.with_meta("errorCode", code);
        }
        if let Some(desc) = &order.error_description {
            event = event.with_meta("errorDescription", desc);
        }
        event
    }

    pub fn contract_created(contract: &Contract) -> Self {
        Self::new(AuditEventType::ContractCreated, contract.id.as_str(), "Contract", &contract.merchant_id)
            .with_meta("contractId", contract.id.as_str())
            .with_meta("merchantId", &contract.merchant_id)
            .with_meta("payerId", &contract.payer_id)
            .with_meta("amount", contract.principal)
            .with_meta("status", contract.status)
    }

    pub fn contract_signed(id: &ContractId, payer_id: &str, principal: Rupee) -> Self {
        Self::new(AuditEventType::ContractSigned, id.as_str(), "Contract", payer_id)
            .with_meta("contractId", id.as_str())
            .with_meta("amount", principal)
    }
}
