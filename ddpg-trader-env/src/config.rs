//! Configuration of [`TraderEnv`](crate::TraderEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// One period of open, high, low, close and volume data.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub struct Candle {
    /// Opening price.
    pub open: f32,

    /// Highest price.
    pub high: f32,

    /// Lowest price.
    pub low: f32,

    /// Closing price.
    pub close: f32,

    /// Traded volume.
    pub volume: f32,
}

impl Candle {
    /// Creates a candle.
    pub fn new(open: f32, high: f32, low: f32, close: f32, volume: f32) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Configuration of [`TraderEnv`](crate::TraderEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TraderEnvConfig {
    /// Historical price series the environment replays.
    pub candles: Vec<Candle>,

    /// The number of periods visible in an observation.
    pub lookback_period: usize,

    /// Starting cash balance.
    ///
    /// If `None`, the balance starts at 100 times the highest price in the
    /// series.
    pub init_balance: Option<f32>,

    /// Episode length limit.
    ///
    /// When set, episodes are truncated after this many steps. When `None`,
    /// episodes only end by bankruptcy.
    pub max_episode_steps: Option<usize>,
}

impl Default for TraderEnvConfig {
    fn default() -> Self {
        Self {
            candles: vec![],
            lookback_period: 5,
            init_balance: None,
            max_episode_steps: None,
        }
    }
}

impl TraderEnvConfig {
    /// Sets the historical price series.
    pub fn candles(mut self, v: Vec<Candle>) -> Self {
        self.candles = v;
        self
    }

    /// Sets the number of periods visible in an observation.
    pub fn lookback_period(mut self, v: usize) -> Self {
        self.lookback_period = v;
        self
    }

    /// Sets the starting cash balance.
    pub fn init_balance(mut self, v: f32) -> Self {
        self.init_balance = Some(v);
        self
    }

    /// Sets the episode length limit.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = Some(v);
        self
    }

    /// Constructs [`TraderEnvConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TraderEnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
