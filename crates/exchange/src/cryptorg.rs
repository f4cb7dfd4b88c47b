use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, error, info};

use common::{CryptorgConfig, Error, OrderClient, OrderRequest, Result};

const BASE_URL: &str = "https://api.cryptorg.net/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Synthetic success payload returned by the dry-run branch.
const DRY_RUN_BODY: &str = r#"{"id":"dry-order-id"}"#;

/// REST API client for the Cryptorg trading API.
///
/// Authentication uses the access-id and API-key headers only; the secret
/// is carried in config but the API does not sign requests with it.
/// Cryptorg exposes no testnet base URL, so the testnet flag is held but
/// unused here.
pub struct CryptorgClient {
    cfg: CryptorgConfig,
    http: Client,
    base_url: String,
}

impl CryptorgClient {
    pub fn new(cfg: CryptorgConfig) -> Self {
        Self::with_base_url(cfg, BASE_URL)
    }

    /// Build a client against a non-default base URL. Production code uses
    /// `new`; the HTTP stub tests point this at a local mock server.
    pub fn with_base_url(cfg: CryptorgConfig, base_url: impl Into<String>) -> Self {
        Self {
            cfg,
            http: Client::builder()
                .use_rustls_tls()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// One HTTP round trip against the trading API, or a simulated one.
    ///
    /// The dry-run check comes first and is unconditional: in dry-run mode
    /// no request is ever constructed and the canned payload is returned,
    /// so call sites exercise the same path as live mode with zero network
    /// I/O.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&OrderRequest>,
    ) -> Result<Vec<u8>> {
        if self.cfg.dry_run {
            info!(%method, path, "Dry-run: simulating request");
            return Ok(DRY_RUN_BODY.as_bytes().to_vec());
        }

        let url = format!("{}{path}", self.base_url);
        let mut req = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("X-Access-ID", &self.cfg.access_id)
            .header("X-API-Key", &self.cfg.api_key);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(|e| {
                error!(error = %e, "Failed to encode request body");
                Error::Serialization(e)
            })?;
            req = req.body(payload);
        }

        let resp = req.send().await.map_err(|e| {
            error!(url = %url, error = %e, "HTTP request failed");
            Error::Transport(e.to_string())
        })?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if status >= 400 {
            error!(status, response = %text, "HTTP request error");
            return Err(Error::Status { status, body: text });
        }
        Ok(text.into_bytes())
    }

    /// Extract the order identifier from a 2xx response body.
    ///
    /// A response that decodes but lacks a non-empty string `id` is a
    /// schema error: the call reached the backend and succeeded at the
    /// transport level, yet the contract was not honored.
    fn order_id_from(body: &[u8]) -> Result<String> {
        let resp: Value = serde_json::from_slice(body).map_err(|e| {
            error!(error = %e, "Failed to decode response");
            Error::Serialization(e)
        })?;
        match resp.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => {
                error!("No order id in response");
                Err(Error::MissingOrderId)
            }
        }
    }
}

#[async_trait]
impl OrderClient for CryptorgClient {
    async fn place_market_buy(&self, symbol: &str, quantity: f64) -> Result<String> {
        debug!(symbol, quantity, "Placing market buy");
        let req = OrderRequest::market_buy(symbol, quantity);
        let body = self.request(Method::POST, "/orders", Some(&req)).await?;
        Self::order_id_from(&body)
    }

    async fn place_limit_sell(&self, symbol: &str, quantity: f64, price: f64) -> Result<String> {
        debug!(symbol, quantity, price, "Placing limit sell");
        let req = OrderRequest::limit_sell(symbol, quantity, price);
        let body = self.request(Method::POST, "/orders", Some(&req)).await?;
        Self::order_id_from(&body)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        if self.cfg.dry_run {
            info!(order_id, "Dry-run: simulating order cancellation");
            return Ok(());
        }
        let path = format!("/orders/{order_id}");
        if let Err(e) = self.request(Method::DELETE, &path, None).await {
            error!(order_id, error = %e, "Failed to cancel order");
            return Err(e);
        }
        Ok(())
    }
}
