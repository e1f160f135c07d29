use log::debug;
use lp_common::Rupee;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Contract, ContractId, ContractStatus, NewContract},
    traits::PaymentGatewayError,
};

pub async fn insert_contract(
    contract: NewContract,
    conn: &mut SqliteConnection,
) -> Result<Contract, PaymentGatewayError> {
    let contract: Contract = sqlx::query_as(
        r#"
            INSERT INTO contracts (
                id,
                merchant_id,
                payer_id,
                principal,
                status
            ) VALUES ($1, $2, $3, $4, 'Draft')
            RETURNING *;
        "#,
    )
    .bind(contract.id)
    .bind(contract.merchant_id)
    .bind(contract.payer_id)
    .bind(contract.principal.value())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Contract [{}] inserted", contract.id);
    Ok(contract)
}

pub async fn fetch_contract(id: &ContractId, conn: &mut SqliteConnection) -> Result<Option<Contract>, sqlx::Error> {
    let contract =
        sqlx::query_as("SELECT * FROM contracts WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(contract)
}

pub async fn update_contract_status(
    id: &ContractId,
    status: ContractStatus,
    conn: &mut SqliteConnection,
) -> Result<Contract, PaymentGatewayError> {
    let result: Option<Contract> = sqlx::query_as(
        "UPDATE contracts SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status.to_string())
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| PaymentGatewayError::ContractNotFound(id.clone()))
}

/// Adds a captured amount to the contract's paid total and stamps the payment timestamps in a
/// single statement.
pub async fn apply_payment(
    id: &ContractId,
    amount: Rupee,
    conn: &mut SqliteConnection,
) -> Result<Contract, PaymentGatewayError> {
    let result: Option<Contract> = sqlx::query_as(
        r#"
            UPDATE contracts SET
                total_paid = total_paid + $1,
                payment_status = 'PAID',
                last_payment_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| PaymentGatewayError::ContractNotFound(id.clone()))
}
