use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, error, info};
use uuid::Uuid;

use common::{BinanceConfig, Error, OrderClient, OrderRequest, Result};

const BASE_URL: &str = "https://api.binance.com";
const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Synthetic client-order-id used by the dry-run branch.
const DRY_RUN_ORDER_ID: &str = "dry-order-id";

/// REST API client for the Binance spot trading API.
///
/// Requests are signed with HMAC-SHA256 over the query string, per the
/// Binance API contract. The testnet flag selects the sandbox base URL.
///
/// Binance requires the symbol alongside the client order id to cancel an
/// order, so the identifiers returned here are opaque composites of the
/// form `<symbol>/<clientOrderId>`; `cancel_order` splits them back apart.
pub struct BinanceClient {
    cfg: BinanceConfig,
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(cfg: BinanceConfig) -> Self {
        let base_url = if cfg.testnet { TESTNET_BASE_URL } else { BASE_URL };
        Self::with_base_url(cfg, base_url)
    }

    /// Build a client against a non-default base URL. Production code uses
    /// `new`; the HTTP stub tests point this at a local mock server.
    pub fn with_base_url(cfg: BinanceConfig, base_url: impl Into<String>) -> Self {
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

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64
    }

    fn sign(&self, query: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(self.cfg.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    async fn signed_post(&self, path: &str, params: &str) -> Result<String> {
        let ts = Self::timestamp_ms();
        let query = format!("{params}&timestamp={ts}");
        let signature = self.sign(&query);
        let body = format!("{query}&signature={signature}");
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.cfg.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| {
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
        Ok(text)
    }

    async fn signed_delete(&self, path: &str, params: &str) -> Result<String> {
        let ts = Self::timestamp_ms();
        let query = format!("{params}&timestamp={ts}");
        let signature = self.sign(&query);
        let url = format!("{}{path}?{query}&signature={signature}", self.base_url);

        let resp = self
            .http
            .delete(&url)
            .header("X-MBX-APIKEY", &self.cfg.api_key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
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
        Ok(text)
    }

    async fn place_order(&self, req: &OrderRequest) -> Result<String> {
        if self.cfg.dry_run {
            info!(
                symbol = %req.symbol,
                side = %req.side,
                order_type = %req.order_type,
                "Dry-run: simulating order placement"
            );
            return Ok(format!("{}/{DRY_RUN_ORDER_ID}", req.symbol));
        }

        // A fresh client order id is sent so the order can be cancelled by
        // it later without querying the exchange.
        let client_order_id = Uuid::new_v4().to_string();
        let mut params = format!(
            "symbol={}&side={}&type={}&quantity={}&newClientOrderId={client_order_id}",
            req.symbol, req.side, req.order_type, req.quantity
        );
        if let Some(price) = req.price {
            params.push_str(&format!("&price={price}&timeInForce=GTC"));
        }

        let body = self.signed_post("/api/v3/order", &params).await?;
        let resp: OrderResponse = serde_json::from_str(&body).map_err(|e| {
            error!(symbol = %req.symbol, error = %e, "Failed to decode response");
            Error::Serialization(e)
        })?;
        if resp.client_order_id.is_empty() {
            error!(symbol = %req.symbol, "No order id in response");
            return Err(Error::MissingOrderId);
        }
        debug!(
            symbol = %resp.symbol,
            order_id = resp.order_id,
            transact_time = resp.transact_time,
            status = %resp.status,
            "Order accepted"
        );
        Ok(format!("{}/{}", req.symbol, resp.client_order_id))
    }
}

#[async_trait]
impl OrderClient for BinanceClient {
    async fn place_market_buy(&self, symbol: &str, quantity: f64) -> Result<String> {
        debug!(symbol, quantity, "Placing market buy");
        self.place_order(&OrderRequest::market_buy(symbol, quantity))
            .await
    }

    async fn place_limit_sell(&self, symbol: &str, quantity: f64, price: f64) -> Result<String> {
        debug!(symbol, quantity, price, "Placing limit sell");
        self.place_order(&OrderRequest::limit_sell(symbol, quantity, price))
            .await
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        if self.cfg.dry_run {
            info!(order_id, "Dry-run: simulating order cancellation");
            return Ok(());
        }
        let Some((symbol, client_order_id)) = order_id.split_once('/') else {
            error!(order_id, "Expected '<symbol>/<clientOrderId>'");
            return Err(Error::InvalidOrderId(order_id.to_string()));
        };
        let params = format!("symbol={symbol}&origClientOrderId={client_order_id}");
        if let Err(e) = self.signed_delete("/api/v3/order", &params).await {
            error!(order_id, error = %e, "Failed to cancel order");
            return Err(e);
        }
        Ok(())
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    order_id: i64,
    #[serde(default)]
    client_order_id: String,
    #[serde(default)]
    transact_time: i64,
    #[serde(default)]
    status: String,
    // Opaque fill details, not interpreted here.
    #[serde(default)]
    #[allow(dead_code)]
    fills: serde_json::Value,
}
