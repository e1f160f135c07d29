mod support;

use std::time::Duration;

use legalpay_engine::{
    db_types::{AuditEventType, AuditStatus, ContractId, ContractStatus, NewContract},
    events::{AuditEvent, EventProducer, EventProducers},
    start_sweep_worker,
    AuditApi,
    AuditConfig,
    ContractApi,
    PaymentGatewayError,
    SqliteDatabase,
};
use lp_common::Rupee;
use support::{
    mocks::{ReceiptScript, ScriptedLedger},
    prepare_test_env,
    random_db_path,
};
use tokio::sync::mpsc;

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn event_channel() -> (EventProducers, mpsc::Receiver<AuditEvent>) {
    let (tx, rx) = mpsc::channel(16);
    let producers = EventProducers { audit_producer: vec![EventProducer::new(tx)] };
    (producers, rx)
}

fn new_contract(id: &str) -> NewContract {
    NewContract::new(
        ContractId::from(id.to_string()),
        "merchant-1".to_string(),
        "payer-1".to_string(),
        Rupee::from_rupees(10_000),
    )
}

async fn expect_event(rx: &mut mpsc::Receiver<AuditEvent>) -> AuditEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.expect("Timed out waiting for audit event").unwrap()
}

#[tokio::test]
async fn contract_lifecycle_emits_audit_events() {
    let db = new_db().await;
    let (producers, mut rx) = event_channel();
    let api = ContractApi::new(db.clone(), producers);

    let contract = api.create_contract(new_contract("con-lc")).await.unwrap();
    assert_eq!(contract.status, ContractStatus::Draft);
    assert_eq!(contract.total_paid, Rupee::from(0));
    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::ContractCreated);
    assert_eq!(event.entity_id, "con-lc");

    let signed = api.mark_signed(&contract.id).await.unwrap();
    assert_eq!(signed.status, ContractStatus::Signed);
    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::ContractSigned);

    let active = api.activate(&contract.id).await.unwrap();
    assert_eq!(active.status, ContractStatus::Active);
    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::ContractActivated);
}

#[tokio::test]
async fn forbidden_contract_transitions() {
    let db = new_db().await;
    let (producers, _rx) = event_channel();
    let api = ContractApi::new(db.clone(), producers);

    let contract = api.create_contract(new_contract("con-fb")).await.unwrap();
    // A draft contract cannot be activated before signing.
    let err = api.activate(&contract.id).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::ContractStatusChangeForbidden(ContractStatus::Draft, ContractStatus::Active)));

    api.mark_signed(&contract.id).await.unwrap();
    // Signing twice is forbidden.
    let err = api.mark_signed(&contract.id).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::ContractStatusChangeForbidden(ContractStatus::Signed, ContractStatus::Signed)));

    let err = api.mark_signed(&ContractId::from("no-such".to_string())).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::ContractNotFound(_)));
}

#[tokio::test]
async fn sweep_worker_redrives_failed_submissions() {
    let db = new_db().await;
    let ledger = ScriptedLedger::failing();
    let config = AuditConfig {
        enabled: true,
        network: "test-net".to_string(),
        poll_interval: Duration::from_millis(10),
        max_poll_attempts: 5,
        max_retries: 3,
        sweep_period: Duration::from_millis(50),
    };
    let api = AuditApi::new(db.clone(), ledger.clone(), config);

    let record = api
        .submit(&AuditEvent::new(AuditEventType::ContractCreated, "con-sw", "Contract", "merchant-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AuditStatus::Failed);

    // Bring the ledger back up and let the worker find the record.
    ledger.set_broadcast_fails(false);
    ledger.set_script(ReceiptScript::SuccessOnPoll(1));
    let worker = start_sweep_worker(api.clone());

    let mut confirmed = None;
    for _ in 0..100 {
        let current = api.audit_trail("con-sw").await.unwrap().remove(0);
        if current.status == AuditStatus::Confirmed {
            confirmed = Some(current);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    worker.abort();
    let record = confirmed.expect("sweep worker never redrove the record to confirmation");
    assert_eq!(record.retry_count, 1);
    assert!(record.tx_hash.is_some());
    assert!(record.error_message.is_none());
}
