use chrono::{DateTime, Utc};
use lp_common::Rupee;
use serde::{Deserialize, Serialize};

/// Free-form tags attached to a gateway order so that callbacks can be tied back to the contract
/// without a database lookup on the gateway side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderNotes {
    pub contract_id: String,
    pub merchant_id: String,
    pub payer_id: String,
}

impl OrderNotes {
    pub fn new(contract_id: &str, merchant_id: &str, payer_id: &str) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            merchant_id: merchant_id.to_string(),
            payer_id: payer_id.to_string(),
        }
    }
}

/// The request body for `POST /orders`. Amounts are always in the smallest currency unit.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: OrderNotes,
}

impl OrderRequest {
    pub fn new(amount: Rupee, currency: &str, receipt: &str, notes: OrderNotes) -> Self {
        Self { amount: amount.value(), currency: currency.to_string(), receipt: receipt.to_string(), notes }
    }
}

/// An order as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
