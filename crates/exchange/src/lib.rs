pub mod binance;
pub mod cryptorg;

pub use binance::BinanceClient;
pub use cryptorg::CryptorgClient;
