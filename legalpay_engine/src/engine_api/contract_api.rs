use log::*;

use crate::{
    db_types::{Contract, ContractId, ContractStatus, NewContract},
    events::{AuditEvent, EventProducers},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// The slice of the contract lifecycle the payment engine owns. Authoring, eSign vendor flows
/// and PDF generation happen upstream; this API records the transitions that matter for payment
/// eligibility and anchors each of them on the audit ledger.
pub struct ContractApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> ContractApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ContractApi<B>
where B: PaymentGatewayDatabase
{
    /// Records a brand-new contract in `Draft` status and publishes a `ContractCreated` audit
    /// event.
    pub async fn create_contract(&self, contract: NewContract) -> Result<Contract, PaymentGatewayError> {
        let contract = self.db.insert_contract(contract).await?;
        info!("📜️ Contract {} created for merchant {}", contract.id, contract.merchant_id);
        self.publish_audit_event(AuditEvent::contract_created(&contract)).await;
        Ok(contract)
    }

    /// Marks a contract as signed by all parties. Only `Draft` or `PendingEsign` contracts can be
    /// signed; publishes a `ContractSigned` audit event.
    pub async fn mark_signed(&self, id: &ContractId) -> Result<Contract, PaymentGatewayError> {
        let contract =
            self.db.fetch_contract(id).await?.ok_or_else(|| PaymentGatewayError::ContractNotFound(id.clone()))?;
        if !matches!(contract.status, ContractStatus::Draft | ContractStatus::PendingEsign) {
            return Err(PaymentGatewayError::ContractStatusChangeForbidden(contract.status, ContractStatus::Signed));
        }
        let contract = self.db.update_contract_status(id, ContractStatus::Signed).await?;
        info!("📜️ Contract {id} marked as signed");
        self.publish_audit_event(AuditEvent::contract_signed(&contract.id, &contract.payer_id, contract.principal)).await;
        Ok(contract)
    }

    /// Brings a signed contract into force.
    pub async fn activate(&self, id: &ContractId) -> Result<Contract, PaymentGatewayError> {
        let contract =
            self.db.fetch_contract(id).await?.ok_or_else(|| PaymentGatewayError::ContractNotFound(id.clone()))?;
        if contract.status != ContractStatus::Signed {
            return Err(PaymentGatewayError::ContractStatusChangeForbidden(contract.status, ContractStatus::Active));
        }
        let contract = self.db.update_contract_status(id, ContractStatus::Active).await?;
        info!("📜️ Contract {id} activated");
        self.publish_audit_event(
            AuditEvent::new(crate::db_types::AuditEventType::ContractActivated, contract.id.as_str(), "Contract", &contract.merchant_id)
                .with_meta("contractId", contract.id.as_str())
                .with_meta("status", contract.status),
        )
        .await;
        Ok(contract)
    }

    pub async fn fetch_contract(&self, id: &ContractId) -> Result<Option<Contract>, PaymentGatewayError> {
        self.db.fetch_contract(id).await
    }

    async fn publish_audit_event(&self, event: AuditEvent) {
        for producer in &self.producers.audit_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}
