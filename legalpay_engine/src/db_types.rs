use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use lp_common::{Rupee, INR_CURRENCY_CODE};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------     ContractId      ---------------------------------------------------------
/// A lightweight wrapper around the contract's externally assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ContractId(pub String);

impl FromStr for ContractId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ContractId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ContractId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       OrderId       ---------------------------------------------------------
/// The order id assigned by the payment gateway when an order is opened. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   ContractStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ContractStatus {
    /// The contract has been drafted but not yet sent for signing.
    Draft,
    /// The contract is out for electronic signature.
    PendingEsign,
    /// All parties have signed.
    Signed,
    /// The contract is in force and payments may be collected against it.
    Active,
    /// All obligations have been settled.
    Completed,
    /// The payer defaulted on the contract.
    Defaulted,
    /// The contract was cancelled before completion.
    Cancelled,
}

impl ContractStatus {
    /// Payments may only be collected against a signed or active contract.
    pub fn allows_payment(&self) -> bool {
        matches!(self, ContractStatus::Signed | ContractStatus::Active)
    }
}

impl Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractStatus::Draft => write!(f, "Draft"),
            ContractStatus::PendingEsign => write!(f, "PendingEsign"),
            ContractStatus::Signed => write!(f, "Signed"),
            ContractStatus::Active => write!(f, "Active"),
            ContractStatus::Completed => write!(f, "Completed"),
            ContractStatus::Defaulted => write!(f, "Defaulted"),
            ContractStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for ContractStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "PendingEsign" => Ok(Self::PendingEsign),
            "Signed" => Ok(Self::Signed),
            "Active" => Ok(Self::Active),
            "Completed" => Ok(Self::Completed),
            "Defaulted" => Ok(Self::Defaulted),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid contract status: {s}"))),
        }
    }
}

impl From<String> for ContractStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid contract status: {value}. But this conversion cannot fail. Defaulting to Draft");
            ContractStatus::Draft
        })
    }
}

//--------------------------------------      Contract       ---------------------------------------------------------
/// The slice of a legal contract that the payment engine needs: eligibility and aggregate paid
/// totals. Contract authoring, eSign and PDF flows live elsewhere.
#[derive(Debug, Clone, FromRow)]
pub struct Contract {
    pub id: ContractId,
    pub merchant_id: String,
    pub payer_id: String,
    pub principal: Rupee,
    pub status: ContractStatus,
    pub payment_status: String,
    pub total_paid: Rupee,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContract {
    pub id: ContractId,
    pub merchant_id: String,
    pub payer_id: String,
    pub principal: Rupee,
}

impl NewContract {
    pub fn new(id: ContractId, merchant_id: String, payer_id: String, principal: Rupee) -> Self {
        Self { id, merchant_id, payer_id, principal }
    }
}

//--------------------------------------  PaymentOrderStatus ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentOrderStatus {
    /// The order has been opened with the gateway and is awaiting payment.
    Created,
    /// The payment has been authorized by the payer's bank but not yet captured.
    Authorized,
    /// The payment has been captured. Terminal.
    Captured,
    /// The payment failed. Terminal.
    Failed,
    /// A captured payment was refunded. Terminal.
    Refunded,
}

impl PaymentOrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentOrderStatus::Captured | PaymentOrderStatus::Failed | PaymentOrderStatus::Refunded)
    }
}

impl Display for PaymentOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentOrderStatus::Created => write!(f, "Created"),
            PaymentOrderStatus::Authorized => write!(f, "Authorized"),
            PaymentOrderStatus::Captured => write!(f, "Captured"),
            PaymentOrderStatus::Failed => write!(f, "Failed"),
            PaymentOrderStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

impl FromStr for PaymentOrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Authorized" => Ok(Self::Authorized),
            "Captured" => Ok(Self::Captured),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid payment order status: {s}"))),
        }
    }
}

impl From<String> for PaymentOrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment order status: {value}. But this conversion cannot fail. Defaulting to Created");
            PaymentOrderStatus::Created
        })
    }
}

//--------------------------------------    PaymentOrder     ---------------------------------------------------------
/// One attempt to collect money against a contract. Financial record: never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentOrder {
    pub id: i64,
    pub contract_id: ContractId,
    pub payer_id: String,
    pub merchant_id: String,
    /// The gateway-assigned order id. Unique and immutable once assigned.
    pub order_id: OrderId,
    /// The gateway-assigned payment id. Set exactly once, at capture.
    pub payment_id: Option<String>,
    /// The capture signature presented by the gateway. Set exactly once, at capture.
    pub signature: Option<String>,
    pub amount: Rupee,
    pub currency: String,
    pub status: PaymentOrderStatus,
    pub payment_method: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub client_ip: Option<String>,
    pub client_user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentOrder {
    pub contract_id: ContractId,
    pub payer_id: String,
    pub merchant_id: String,
    pub order_id: OrderId,
    pub amount: Rupee,
    pub currency: String,
    pub client_ip: Option<String>,
    pub client_user_agent: Option<String>,
}

impl NewPaymentOrder {
    pub fn new(contract_id: ContractId, payer_id: String, merchant_id: String, order_id: OrderId, amount: Rupee) -> Self {
        Self {
            contract_id,
            payer_id,
            merchant_id,
            order_id,
            amount,
            currency: INR_CURRENCY_CODE.to_string(),
            client_ip: None,
            client_user_agent: None,
        }
    }

    pub fn with_client_info(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.client_ip = ip;
        self.client_user_agent = user_agent;
        self
    }
}

//--------------------------------------   AuditEventType    ---------------------------------------------------------
/// Lifecycle events that are anchored on the audit ledger. The numeric code is part of the ledger
/// contract's ABI and must remain stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum AuditEventType {
    ContractCreated,
    ContractSigned,
    ContractActivated,
    PaymentInitiated,
    PaymentCompleted,
    PaymentFailed,
    MandateCreated,
    MandateActivated,
    MandateCancelled,
    LegalNoticeSent,
    DisputeRaised,
    DisputeResolved,
}

impl AuditEventType {
    /// The stable wire code used in the ledger's `logEvent` call.
    pub fn code(&self) -> i64 {
        match self {
            AuditEventType::ContractCreated => 0,
            AuditEventType::ContractSigned => 1,
            AuditEventType::ContractActivated => 2,
            AuditEventType::PaymentInitiated => 3,
            AuditEventType::PaymentCompleted => 4,
            AuditEventType::PaymentFailed => 5,
            AuditEventType::MandateCreated => 6,
            AuditEventType::MandateActivated => 7,
            AuditEventType::MandateCancelled => 8,
            AuditEventType::LegalNoticeSent => 9,
            AuditEventType::DisputeRaised => 10,
            AuditEventType::DisputeResolved => 11,
        }
    }
}

impl Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditEventType::ContractCreated => "ContractCreated",
            AuditEventType::ContractSigned => "ContractSigned",
            AuditEventType::ContractActivated => "ContractActivated",
            AuditEventType::PaymentInitiated => "PaymentInitiated",
            AuditEventType::PaymentCompleted => "PaymentCompleted",
            AuditEventType::PaymentFailed => "PaymentFailed",
            AuditEventType::MandateCreated => "MandateCreated",
            AuditEventType::MandateActivated => "MandateActivated",
            AuditEventType::MandateCancelled => "MandateCancelled",
            AuditEventType::LegalNoticeSent => "LegalNoticeSent",
            AuditEventType::DisputeRaised => "DisputeRaised",
            AuditEventType::DisputeResolved => "DisputeResolved",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AuditEventType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ContractCreated" => Ok(Self::ContractCreated),
            "ContractSigned" => Ok(Self::ContractSigned),
            "ContractActivated" => Ok(Self::ContractActivated),
            "PaymentInitiated" => Ok(Self::PaymentInitiated),
            "PaymentCompleted" => Ok(Self::PaymentCompleted),
            "PaymentFailed" => Ok(Self::PaymentFailed),
            "MandateCreated" => Ok(Self::MandateCreated),
            "MandateActivated" => Ok(Self::MandateActivated),
            "MandateCancelled" => Ok(Self::MandateCancelled),
            "LegalNoticeSent" => Ok(Self::LegalNoticeSent),
            "DisputeRaised" => Ok(Self::DisputeRaised),
            "DisputeResolved" => Ok(Self::DisputeResolved),
            s => Err(ConversionError(format!("Invalid audit event type: {s}"))),
        }
    }
}

impl From<String> for AuditEventType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid audit event type: {value}. But this conversion cannot fail. Defaulting to ContractCreated");
            AuditEventType::ContractCreated
        })
    }
}

//--------------------------------------     AuditStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum AuditStatus {
    /// The record is awaiting ledger confirmation (freshly submitted, or requeued by the sweeper).
    Pending,
    /// The ledger transaction was mined successfully. Terminal.
    Confirmed,
    /// Broadcast or confirmation failed. Retryable until the retry ceiling is reached.
    Failed,
}

impl Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Pending => write!(f, "Pending"),
            AuditStatus::Confirmed => write!(f, "Confirmed"),
            AuditStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for AuditStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid audit status: {s}"))),
        }
    }
}

impl From<String> for AuditStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid audit status: {value}. But this conversion cannot fail. Defaulting to Pending");
            AuditStatus::Pending
        })
    }
}

//--------------------------------------     AuditRecord     ---------------------------------------------------------
/// The durable trace of one audit event's journey to the ledger. This is the audit trail itself:
/// records are never deleted, and they reference entities by id only, so the trail survives the
/// referenced entity's lifecycle.
#[derive(Debug, Clone, FromRow)]
pub struct AuditRecord {
    pub id: i64,
    pub event_type: AuditEventType,
    pub entity_id: String,
    pub entity_type: String,
    pub user_id: String,
    /// Canonical JSON serialization of the event metadata.
    pub metadata: String,
    pub network: String,
    /// Unique across all records once assigned. Replaced with a fresh hash on every re-broadcast.
    pub tx_hash: Option<String>,
    pub block_number: Option<i64>,
    pub gas_used: Option<i64>,
    pub gas_price: Option<i64>,
    pub tx_cost: Option<i64>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub retry_count: i64,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}
