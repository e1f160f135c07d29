use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{
    config::RazorpayConfig,
    data_objects::{GatewayOrder, OrderNotes, OrderRequest},
    RazorpayApiError,
};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Opens an order with the gateway. `amount` is converted to the smallest currency unit in the
    /// request body; the returned order carries the gateway-assigned order id.
    pub async fn create_order(
        &self,
        amount: lp_common::Rupee,
        currency: &str,
        receipt: &str,
        notes: OrderNotes,
    ) -> Result<GatewayOrder, RazorpayApiError> {
        let body = OrderRequest::new(amount, currency, receipt, notes);
        debug!("Creating gateway order for receipt {receipt} ({amount} {currency})");
        let order = self.rest_query::<GatewayOrder, OrderRequest>(Method::POST, "/orders", Some(body)).await?;
        info!("Created gateway order {} for receipt {receipt}", order.id);
        Ok(order)
    }
}
