pub mod config;
pub mod error;
pub mod exchange;
pub mod types;

pub use config::{BinanceConfig, CryptorgConfig};
pub use error::{Error, Result};
pub use exchange::OrderClient;
pub use types::*;
