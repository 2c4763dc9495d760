#![warn(missing_docs)]
//! A historical stock-trading environment.
//!
//! [`TraderEnv`] replays a series of OHLCV candles. At every step the agent
//! buys a fraction of its cash balance, sells a fraction of its shares or
//! holds, trades are filled at a uniformly drawn intrabar price, and the
//! reward is the resulting cash balance. Observations are a normalized
//! lookback window over the candle series plus a row of portfolio
//! statistics.
mod base;
mod config;
mod portfolio;
pub use base::{TraderAct, TraderEnv, TraderObs};
pub use config::{Candle, TraderEnvConfig};
pub use portfolio::Portfolio;
