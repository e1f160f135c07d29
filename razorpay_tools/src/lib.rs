//! A thin client for the Razorpay Orders REST API.
//!
//! The engine only needs one call from the gateway: opening an order for a given amount so that a
//! payer can complete checkout against it. Everything else (checkout UI, capture notification)
//! arrives via signed callbacks handled elsewhere.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{GatewayOrder, OrderNotes, OrderRequest};
pub use error::RazorpayApiError;
