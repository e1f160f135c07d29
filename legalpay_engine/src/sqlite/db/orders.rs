use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentOrder, OrderId, PaymentOrder},
    traits::PaymentGatewayError,
};

pub async fn insert_order(
    order: NewPaymentOrder,
    conn: &mut SqliteConnection,
) -> Result<PaymentOrder, PaymentGatewayError> {
    if let Some(existing) = fetch_order_by_order_id(&order.order_id, conn).await? {
        return Err(PaymentGatewayError::OrderAlreadyExists(existing.order_id));
    }
    let order: PaymentOrder = sqlx::query_as(
        r#"
            INSERT INTO payment_orders (
                contract_id,
                payer_id,
                merchant_id,
                order_id,
                amount,
                currency,
                status,
                client_ip,
                client_user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6, 'Created', $7, $8)
            RETURNING *;
        "#,
    )
    .bind(order.contract_id)
    .bind(order.payer_id)
    .bind(order.merchant_id)
    .bind(order.order_id)
    .bind(order.amount.value())
    .bind(order.currency)
    .bind(order.client_ip)
    .bind(order.client_user_agent)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payment order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

/// Returns the payment order for the corresponding gateway `order_id`
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrder>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM payment_orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Captures a non-terminal order. The `status IN (...)` guard makes this a check-and-set: a
/// replayed capture, or a capture racing a webhook failure, matches zero rows and returns `None`.
pub async fn capture_order(
    order_id: &OrderId,
    payment_id: &str,
    signature: &str,
    payment_method: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
    let result: Option<PaymentOrder> = sqlx::query_as(
        r#"
            UPDATE payment_orders SET
                status = 'Captured',
                payment_id = $2,
                signature = $3,
                payment_method = $4,
                captured_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status IN ('Created', 'Authorized')
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(payment_id)
    .bind(signature)
    .bind(payment_method)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Fails a non-terminal order. Same check-and-set shape as [`capture_order`]; duplicate failure
/// webhooks are absorbed here.
pub async fn fail_order(
    order_id: &OrderId,
    error_code: &str,
    error_description: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrder>, PaymentGatewayError> {
    let result: Option<PaymentOrder> = sqlx::query_as(
        r#"
            UPDATE payment_orders SET
                status = 'Failed',
                error_code = $2,
                error_description = $3,
                failed_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status IN ('Created', 'Authorized')
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(error_code)
    .bind(error_description)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}
