use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
    Mutex,
};

use async_trait::async_trait;
use ledger_tools::{LedgerApiError, ReceiptStatus, TxReceipt};
use legalpay_engine::{AuditLedger, PaymentGateway};
use lp_common::Rupee;
use mockall::mock;
use razorpay_tools::{GatewayOrder, OrderNotes, RazorpayApiError};

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        async fn create_order(
            &self,
            amount: Rupee,
            currency: &str,
            receipt: &str,
            notes: OrderNotes,
        ) -> Result<GatewayOrder, RazorpayApiError>;
    }
}

/// A gateway mock that hands out sequential order ids for the requested amount.
pub fn order_counting_gateway() -> MockGateway {
    let counter = AtomicU64::new(0);
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().returning(move |amount, currency, _receipt, _notes| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: format!("order_test_{n}"),
            amount: amount.value(),
            currency: currency.to_string(),
            receipt: None,
            status: "created".to_string(),
            created_at: None,
        })
    });
    gateway
}

pub fn unavailable_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_order()
        .returning(|_, _, _, _| Err(RazorpayApiError::RestResponseError("connection refused".to_string())));
    gateway
}

/// How the scripted ledger answers receipt polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptScript {
    /// The transaction is never mined. Watchers run into their attempt ceiling.
    Never,
    /// A successful receipt appears on the nth poll (1-based).
    SuccessOnPoll(u64),
    /// The transaction mines but the contract call reverts.
    Reverted,
}

/// A hand-rolled ledger double whose behaviour can be re-scripted mid-test, so one record can
/// fail its first broadcast and succeed on the sweeper's retry.
#[derive(Clone)]
pub struct ScriptedLedger {
    broadcast_fails: Arc<AtomicBool>,
    script: Arc<Mutex<ReceiptScript>>,
    broadcasts: Arc<AtomicU64>,
    polls: Arc<AtomicU64>,
}

impl ScriptedLedger {
    pub fn new(script: ReceiptScript) -> Self {
        Self {
            broadcast_fails: Arc::new(AtomicBool::new(false)),
            script: Arc::new(Mutex::new(script)),
            broadcasts: Arc::new(AtomicU64::new(0)),
            polls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn failing() -> Self {
        let ledger = Self::new(ReceiptScript::Never);
        ledger.set_broadcast_fails(true);
        ledger
    }

    pub fn set_broadcast_fails(&self, fails: bool) {
        self.broadcast_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_script(&self, script: ReceiptScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn broadcast_count(&self) -> u64 {
        self.broadcasts.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditLedger for ScriptedLedger {
    async fn broadcast_event(
        &self,
        _event_code: i64,
        _entity_id: &str,
        _user_id: &str,
        _metadata_json: &str,
    ) -> Result<String, LedgerApiError> {
        if self.broadcast_fails.load(Ordering::SeqCst) {
            return Err(LedgerApiError::RpcError { code: -32000, message: "insufficient funds for gas".to_string() });
        }
        let n = self.broadcasts.fetch_add(1, Ordering::SeqCst);
        Ok(format!("0x{n:064x}"))
    }

    async fn get_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, LedgerApiError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let script = *self.script.lock().unwrap();
        let receipt = match script {
            ReceiptScript::Never => None,
            ReceiptScript::SuccessOnPoll(n) if poll >= n => Some(TxReceipt {
                transaction_hash: tx_hash.to_string(),
                status: ReceiptStatus::Success,
                block_number: 1_234_567,
                gas_used: 48_000,
                effective_gas_price: 1_000_000_000,
            }),
            ReceiptScript::SuccessOnPoll(_) => None,
            ReceiptScript::Reverted => Some(TxReceipt {
                transaction_hash: tx_hash.to_string(),
                status: ReceiptStatus::Reverted,
                block_number: 1_234_567,
                gas_used: 21_000,
                effective_gas_price: 1_000_000_000,
            }),
        };
        Ok(receipt)
    }
}
