use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{BinanceConfig, CryptorgConfig, OrderClient};
use exchange::{BinanceClient, CryptorgClient};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ───────────────────────────────────────────────────────────────
    let _ = dotenvy::dotenv(); // ignore error if .env not present

    let exchange_name = std::env::var("EXCHANGE").unwrap_or_else(|_| "cryptorg".to_string());

    // ── Exchange client (selected via EXCHANGE) ──────────────────────────────
    let client: Arc<dyn OrderClient> = match exchange_name.as_str() {
        "cryptorg" => {
            let cfg = CryptorgConfig::from_env()
                .unwrap_or_else(|e| panic!("Failed to load Cryptorg config: {e}"));
            Arc::new(CryptorgClient::new(cfg))
        }
        "binance" => {
            let cfg = BinanceConfig::from_env()
                .unwrap_or_else(|e| panic!("Failed to load Binance config: {e}"));
            Arc::new(BinanceClient::new(cfg))
        }
        other => panic!("ERROR: EXCHANGE must be 'cryptorg' or 'binance', got: '{other}'"),
    };
    info!(exchange = %exchange_name, "DCA bot starting");

    // ── One execution pass ───────────────────────────────────────────────────
    // Scheduling is owned by whatever invokes the binary (cron, systemd
    // timer); each run performs a single DCA buy, optionally followed by a
    // take-profit limit sell.
    let symbol = required_env("DCA_SYMBOL");
    let quantity: f64 = required_env("DCA_QUANTITY")
        .parse()
        .unwrap_or_else(|_| panic!("DCA_QUANTITY must be a number"));

    match client.place_market_buy(&symbol, quantity).await {
        Ok(order_id) => info!(%symbol, quantity, order_id, "Market buy placed"),
        Err(e) => {
            error!(%symbol, error = %e, "Market buy failed");
            std::process::exit(1);
        }
    }

    if let Ok(raw) = std::env::var("DCA_SELL_PRICE") {
        let price: f64 = raw
            .parse()
            .unwrap_or_else(|_| panic!("DCA_SELL_PRICE must be a number"));
        match client.place_limit_sell(&symbol, quantity, price).await {
            Ok(order_id) => info!(%symbol, price, order_id, "Limit sell placed"),
            Err(e) => error!(%symbol, error = %e, "Limit sell failed"),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}
