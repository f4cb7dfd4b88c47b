use async_trait::async_trait;

use crate::Result;

/// Abstraction over one exchange's order-placement API.
///
/// `CryptorgClient` and `BinanceClient` in `crates/exchange` implement this
/// for live trading. Both short-circuit into dry-run simulation when the
/// bound config has `dry_run` set, so call sites behave identically in
/// either mode.
///
/// Order identifiers are opaque strings; callers must not parse them.
/// Preconditions (`symbol` non-empty, `quantity > 0`, limit `price > 0`)
/// are not checked locally — invalid values are forwarded to the exchange,
/// which rejects them.
#[async_trait]
pub trait OrderClient: Send + Sync {
    /// Submit a market buy and return the exchange's order identifier.
    async fn place_market_buy(&self, symbol: &str, quantity: f64) -> Result<String>;

    /// Submit a limit sell at `price` and return the order identifier.
    async fn place_limit_sell(&self, symbol: &str, quantity: f64, price: f64) -> Result<String>;

    /// Cancel a previously placed order by its identifier.
    async fn cancel_order(&self, order_id: &str) -> Result<()>;
}
