//! A client for the append-only audit ledger.
//!
//! The ledger is an external EVM-style network fronted by a JSON-RPC relay. From this side of the
//! fence it is an opaque service with exactly two operations: broadcast an audit event (returning
//! a transaction hash) and look up the receipt for a previously broadcast transaction. Consensus,
//! signing and fee management live behind the relay.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::LedgerApi;
pub use config::LedgerConfig;
pub use data_objects::{ReceiptStatus, TxReceipt};
pub use error::LedgerApiError;
