mod support;

use std::time::Duration;

use legalpay_engine::{
    db_types::{AuditEventType, Contract, ContractId, ContractStatus, NewContract, OrderId, PaymentOrderStatus},
    events::{AuditEvent, EventProducer, EventProducers},
    helpers::calculate_hmac,
    PaymentFlowApi,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    SqliteDatabase,
};
use lp_common::{Rupee, Secret};
use support::{
    mocks::{order_counting_gateway, unavailable_gateway, MockGateway},
    prepare_test_env,
    random_db_path,
};
use tokio::sync::mpsc;

const CAPTURE_SECRET: &[u8] = b"test_key_secret";

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

async fn seed_contract(db: &SqliteDatabase, id: &str, principal: &str, status: ContractStatus) -> Contract {
    let contract = NewContract::new(
        ContractId::from(id.to_string()),
        "merchant-1".to_string(),
        "payer-1".to_string(),
        principal.parse::<Rupee>().expect("Invalid principal"),
    );
    let contract = db.insert_contract(contract).await.expect("Error inserting contract");
    if status == ContractStatus::Draft {
        contract
    } else {
        db.update_contract_status(&contract.id, status).await.expect("Error updating contract status")
    }
}

fn event_channel() -> (EventProducers, mpsc::Receiver<AuditEvent>) {
    let (tx, rx) = mpsc::channel(16);
    let producers = EventProducers { audit_producer: vec![EventProducer::new(tx)] };
    (producers, rx)
}

fn flow_api(db: SqliteDatabase, gateway: MockGateway, producers: EventProducers) -> PaymentFlowApi<SqliteDatabase, MockGateway> {
    PaymentFlowApi::new(
        db,
        gateway,
        Secret::new(String::from_utf8(CAPTURE_SECRET.to_vec()).unwrap()),
        Secret::new("test_webhook_secret".to_string()),
        producers,
    )
}

fn valid_signature(order_id: &OrderId, payment_id: &str) -> String {
    calculate_hmac(CAPTURE_SECRET, format!("{}|{payment_id}", order_id.as_str()).as_bytes())
}

async fn expect_event(rx: &mut mpsc::Receiver<AuditEvent>) -> AuditEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.expect("Timed out waiting for audit event").unwrap()
}

async fn expect_no_event(rx: &mut mpsc::Receiver<AuditEvent>) {
    let result = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(result.is_err(), "Expected no audit event, but one was published: {:?}", result.unwrap());
}

#[tokio::test]
async fn create_order_for_active_contract() {
    let db = new_db().await;
    seed_contract(&db, "con-100", "100000.00", ContractStatus::Active).await;
    let (producers, _rx) = event_channel();
    let api = flow_api(db, order_counting_gateway(), producers);

    let order = api.create_order(&ContractId::from("con-100".to_string()), Some("10.1.1.1".to_string()), None).await.unwrap();
    assert_eq!(order.status, PaymentOrderStatus::Created);
    assert_eq!(order.amount, "100000.00".parse::<Rupee>().unwrap());
    assert_eq!(order.amount.value(), 10_000_000);
    assert_eq!(order.currency, "INR");
    assert!(!order.order_id.as_str().is_empty());
    assert!(order.payment_id.is_none());
    assert_eq!(order.client_ip.as_deref(), Some("10.1.1.1"));
}

#[tokio::test]
async fn create_order_requires_eligible_contract() {
    let db = new_db().await;
    seed_contract(&db, "con-draft", "5000.00", ContractStatus::Draft).await;
    let (producers, _rx) = event_channel();
    let api = flow_api(db, order_counting_gateway(), producers);

    let err = api.create_order(&ContractId::from("con-draft".to_string()), None, None).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::ContractNotEligible(_, ContractStatus::Draft)));

    let err = api.create_order(&ContractId::from("no-such-contract".to_string()), None, None).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::ContractNotFound(_)));
}

#[tokio::test]
async fn create_order_with_gateway_down() {
    let db = new_db().await;
    seed_contract(&db, "con-200", "5000.00", ContractStatus::Signed).await;
    let (producers, _rx) = event_channel();
    let api = flow_api(db.clone(), unavailable_gateway(), producers);

    let err = api.create_order(&ContractId::from("con-200".to_string()), None, None).await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::GatewayUnavailable(_)));
}

#[tokio::test]
async fn capture_with_valid_signature() {
    let db = new_db().await;
    seed_contract(&db, "con-300", "2500.00", ContractStatus::Active).await;
    let (producers, mut rx) = event_channel();
    let api = flow_api(db.clone(), order_counting_gateway(), producers);

    let order = api.create_order(&ContractId::from("con-300".to_string()), None, None).await.unwrap();
    let signature = valid_signature(&order.order_id, "pay_123");
    let captured = api.capture(&order.order_id, "pay_123", &signature, "upi").await.unwrap();

    assert_eq!(captured.status, PaymentOrderStatus::Captured);
    assert!(captured.captured_at.is_some());
    assert_eq!(captured.payment_id.as_deref(), Some("pay_123"));
    assert_eq!(captured.signature.as_deref(), Some(signature.as_str()));
    assert_eq!(captured.payment_method.as_deref(), Some("upi"));

    let contract = db.fetch_contract(&captured.contract_id).await.unwrap().unwrap();
    assert_eq!(contract.total_paid, "2500.00".parse::<Rupee>().unwrap());
    assert_eq!(contract.payment_status, "PAID");
    assert!(contract.last_payment_at.is_some());

    // Exactly one PaymentCompleted event, keyed on the contract id.
    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::PaymentCompleted);
    assert_eq!(event.entity_id, "con-300");
    expect_no_event(&mut rx).await;
}

#[tokio::test]
async fn capture_replay_does_not_double_count() {
    let db = new_db().await;
    seed_contract(&db, "con-400", "1000.00", ContractStatus::Active).await;
    let (producers, mut rx) = event_channel();
    let api = flow_api(db.clone(), order_counting_gateway(), producers);

    let order = api.create_order(&ContractId::from("con-400".to_string()), None, None).await.unwrap();
    let signature = valid_signature(&order.order_id, "pay_replay");
    let first = api.capture(&order.order_id, "pay_replay", &signature, "card").await.unwrap();
    let replay = api.capture(&order.order_id, "pay_replay", &signature, "card").await.unwrap();

    assert_eq!(first.status, PaymentOrderStatus::Captured);
    assert_eq!(replay.status, PaymentOrderStatus::Captured);
    assert_eq!(first.captured_at, replay.captured_at);

    let contract = db.fetch_contract(&order.contract_id).await.unwrap().unwrap();
    assert_eq!(contract.total_paid, "1000.00".parse::<Rupee>().unwrap(), "replay must not double-count");

    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::PaymentCompleted);
    expect_no_event(&mut rx).await;
}

#[tokio::test]
async fn capture_with_invalid_signature() {
    let db = new_db().await;
    seed_contract(&db, "con-500", "1000.00", ContractStatus::Active).await;
    let (producers, mut rx) = event_channel();
    let api = flow_api(db.clone(), order_counting_gateway(), producers);

    let order = api.create_order(&ContractId::from("con-500".to_string()), None, None).await.unwrap();
    let bogus = calculate_hmac(b"wrong_secret", format!("{}|pay_evil", order.order_id.as_str()).as_bytes());

    let err = api.capture(&order.order_id, "pay_evil", &bogus, "upi").await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::SignatureInvalid));

    let failed = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(failed.status, PaymentOrderStatus::Failed);
    assert_eq!(failed.error_code.as_deref(), Some("SIGNATURE_VERIFICATION_FAILED"));
    assert!(failed.failed_at.is_some());
    assert!(failed.payment_id.is_none(), "payment id must not be recorded on a failed verification");

    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::PaymentFailed);

    // A replay of the same invalid signature fails again but produces no further state changes
    // and no further events.
    let err = api.capture(&order.order_id, "pay_evil", &bogus, "upi").await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::SignatureInvalid));
    expect_no_event(&mut rx).await;
    let still_failed = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(still_failed.status, PaymentOrderStatus::Failed);
    assert_eq!(still_failed.failed_at, failed.failed_at);
}

#[tokio::test]
async fn capture_unknown_order() {
    let db = new_db().await;
    let (producers, _rx) = event_channel();
    let api = flow_api(db, order_counting_gateway(), producers);

    let err = api.capture(&OrderId::from("order_ghost".to_string()), "pay_1", "00", "upi").await.unwrap_err();
    assert!(matches!(err, PaymentGatewayError::OrderNotFound(_)));
}

#[tokio::test]
async fn mark_failed_is_idempotent() {
    let db = new_db().await;
    seed_contract(&db, "con-600", "1000.00", ContractStatus::Active).await;
    let (producers, mut rx) = event_channel();
    let api = flow_api(db.clone(), order_counting_gateway(), producers);

    let order = api.create_order(&ContractId::from("con-600".to_string()), None, None).await.unwrap();
    let failed = api.mark_failed(&order.order_id, "BANK_DECLINED", "Issuer declined the payment").await.unwrap();
    assert!(failed.is_some());
    assert_eq!(failed.unwrap().status, PaymentOrderStatus::Failed);
    let event = expect_event(&mut rx).await;
    assert_eq!(event.event_type, AuditEventType::PaymentFailed);

    // Duplicate webhook delivery: no transition, no event.
    let duplicate = api.mark_failed(&order.order_id, "BANK_DECLINED", "Issuer declined the payment").await.unwrap();
    assert!(duplicate.is_none());
    expect_no_event(&mut rx).await;

    // Unknown orders are absorbed the same way.
    let unknown = api.mark_failed(&OrderId::from("order_ghost".to_string()), "X", "Y").await.unwrap();
    assert!(unknown.is_none());
}

#[tokio::test]
async fn late_failure_webhook_loses_race_against_capture() {
    let db = new_db().await;
    seed_contract(&db, "con-700", "1000.00", ContractStatus::Active).await;
    let (producers, mut rx) = event_channel();
    let api = flow_api(db.clone(), order_counting_gateway(), producers);

    let order = api.create_order(&ContractId::from("con-700".to_string()), None, None).await.unwrap();
    let signature = valid_signature(&order.order_id, "pay_fast");
    api.capture(&order.order_id, "pay_fast", &signature, "upi").await.unwrap();
    let _ = expect_event(&mut rx).await;

    let late = api.mark_failed(&order.order_id, "TIMEOUT", "Payment timed out at the bank").await.unwrap();
    assert!(late.is_none(), "a late failure notice must not clobber a captured order");
    let order = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, PaymentOrderStatus::Captured);
    expect_no_event(&mut rx).await;
}

#[tokio::test]
async fn webhook_body_verification() {
    let db = new_db().await;
    let (producers, _rx) = event_channel();
    let api = flow_api(db, order_counting_gateway(), producers);

    let body = br#"{"event":"payment.failed","payload":{"payment":{"entity":{"order_id":"order_1"}}}}"#;
    let signature = calculate_hmac(b"test_webhook_secret", body);
    assert!(api.verify_webhook(body, &signature));
    assert!(!api.verify_webhook(b"tampered body", &signature));
    assert!(!api.verify_webhook(body, "deadbeef"));
}
