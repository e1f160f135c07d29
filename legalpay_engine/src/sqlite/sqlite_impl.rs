//! `SqliteDatabase` is a concrete implementation of a LegalPay engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the storage traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use async_trait::async_trait;
use lp_common::Rupee;
use sqlx::SqlitePool;

use super::db::{audit, contracts, db_url, new_pool, orders};
use crate::{
    db_types::{
        AuditEventType,
        AuditRecord,
        AuditStatus,
        Contract,
        ContractId,
        ContractStatus,
        NewContract,
        NewPaymentOrder,
        OrderId,
        PaymentOrder,
    },
    traits::{AuditTrailDatabase, AuditTrailError, NewAuditRecord, PaymentGatewayDatabase, PaymentGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance, using `LP_DATABASE_URL` for the connection string.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_contract(&self, contract: NewContract) -> Result<Contract, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        contracts::insert_contract(contract, &mut conn).await
    }

    async fn fetch_contract(&self, id: &ContractId) -> Result<Option<Contract>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let contract = contracts::fetch_contract(id, &mut conn).await?;
        Ok(contract)
    }

    async fn update_contract_status(
        &self,
        id: &ContractId,
        status: ContractStatus,
    ) -> Result<Contract, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        contracts::update_contract_status(id, status, &mut conn).await
    }

    async fn insert_order(&self, order: NewPaymentOrder) -> Result<PaymentOrder, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn capture_order(
        &self,
        order_id: &OrderId,
        payment_id: &str,
        signature: &str,
        payment_method: &str,
    ) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::capture_order(order_id, payment_id, signature, payment_method, &mut conn).await
    }

    async fn fail_order(
        &self,
        order_id: &OrderId,
        error_code: &str,
        error_description: &str,
    ) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fail_order(order_id, error_code, error_description, &mut conn).await
    }

    async fn apply_payment_to_contract(&self, id: &ContractId, amount: Rupee) -> Result<Contract, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let contract = contracts::apply_payment(id, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(contract)
    }
}

#[async_trait]
impl AuditTrailDatabase for SqliteDatabase {
    async fn insert_record(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::insert_record(record, &mut conn).await
    }

    async fn fetch_record(&self, id: i64) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::fetch_record(id, &mut conn).await
    }

    async fn set_tx_hash(&self, id: i64, tx_hash: &str) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::set_tx_hash(id, tx_hash, &mut conn).await
    }

    async fn mark_failed(&self, id: i64, error_message: &str) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::mark_failed(id, error_message, &mut conn).await
    }

    async fn mark_confirmed(
        &self,
        id: i64,
        block_number: i64,
        gas_used: i64,
        gas_price: i64,
        tx_cost: i64,
    ) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::mark_confirmed(id, block_number, gas_used, gas_price, tx_cost, &mut conn).await
    }

    async fn requeue_record(&self, id: i64, tx_hash: &str) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::requeue_record(id, tx_hash, &mut conn).await
    }

    async fn record_retry_failure(&self, id: i64, error_message: &str) -> Result<AuditRecord, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::record_retry_failure(id, error_message, &mut conn).await
    }

    async fn fetch_retryable(&self, max_retries: i64) -> Result<Vec<AuditRecord>, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::fetch_retryable(max_retries, &mut conn).await
    }

    async fn has_event(&self, entity_id: &str, event_type: AuditEventType) -> Result<bool, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::has_event(entity_id, event_type, &mut conn).await
    }

    async fn audit_trail(&self, entity_id: &str) -> Result<Vec<AuditRecord>, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::audit_trail(entity_id, &mut conn).await
    }

    async fn count_by_status(&self, status: AuditStatus) -> Result<i64, AuditTrailError> {
        let mut conn = self.pool.acquire().await?;
        audit::count_by_status(status, &mut conn).await
    }
}
