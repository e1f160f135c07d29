use serde::{Deserialize, Serialize};

/// Outcome of a mined transaction as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    /// The transaction was mined and executed successfully.
    Success,
    /// The transaction was mined but the contract call reverted.
    Reverted,
}

/// The receipt for a mined transaction. Absence of a receipt means the transaction has not been
/// mined yet (or never will be); the ledger cannot distinguish the two.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub status: ReceiptStatus,
    pub block_number: i64,
    pub gas_used: i64,
    /// The per-unit gas price actually paid, in wei. Together with `gas_used` this gives the
    /// total transaction cost.
    pub effective_gas_price: i64,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}
