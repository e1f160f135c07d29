use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid RPC response: {0}")]
    RpcResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Ledger call failed. Error {code}. {message}")]
    RpcError { code: i64, message: String },
    #[error("The ledger is disabled by configuration")]
    Disabled,
}
