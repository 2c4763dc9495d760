//! Environment implementation.
use crate::{Candle, Portfolio, TraderEnvConfig};
use anyhow::{ensure, Result};
use ddpg_core::{
    record::{Record, RecordValue},
    Act, Env, Obs, Step,
};
use log::info;
use ndarray::{ArrayD, IxDyn};

/// Observation of [`TraderEnv`].
///
/// A flattened `(lookback_period + 1, 5)` matrix: one row of normalized
/// OHLCV values per period in the lookback window, plus a final row of
/// portfolio statistics.
#[derive(Debug, Clone)]
pub struct TraderObs(
    /// The flattened observation matrix.
    pub ArrayD<f32>,
);

impl Obs for TraderObs {
    fn len(&self) -> usize {
        1
    }
}

/// Action on [`TraderEnv`].
///
/// `action_type` selects the trade after truncation toward zero: values
/// in `(-1, 1)` buy, values in `[1, 2)` sell and anything else holds.
/// `amount` is the traded fraction, clamped to `[0, 1]`: of the cash
/// balance when buying, of the held shares when selling.
#[derive(Debug, Clone)]
pub struct TraderAct {
    /// Trade selector.
    pub action_type: f32,

    /// Fraction of the balance or holdings to trade.
    pub amount: f32,
}

impl TraderAct {
    /// Creates an action.
    pub fn new(action_type: f32, amount: f32) -> Self {
        Self {
            action_type,
            amount,
        }
    }
}

impl Act for TraderAct {
    fn len(&self) -> usize {
        1
    }
}

/// A historical stock-trading environment.
///
/// Replays a fixed OHLCV series. Trades are filled at a uniformly drawn
/// price between the open and close of the current candle, the cursor
/// advances by one period per step and wraps before the final lookback
/// window, the reward is the cash balance after the trade and the episode
/// terminates when net worth drops to zero or below.
pub struct TraderEnv {
    candles: Vec<Candle>,
    lookback_period: usize,
    max_price: f32,
    max_volume: f32,
    max_episode_steps: Option<usize>,
    portfolio: Portfolio,
    cursor: usize,
    curr_step: usize,
    rng: fastrand::Rng,
}

impl TraderEnv {
    /// Price at the cursor, drawn uniformly between open and close.
    fn current_price(&self) -> f32 {
        let candle = &self.candles[self.cursor];
        let lo = candle.open.min(candle.close);
        let hi = candle.open.max(candle.close);
        lo + self.rng.f32() * (hi - lo)
    }

    fn take_action(&mut self, act: &TraderAct) {
        let price = self.current_price();
        let amount = act.amount.clamp(0.0, 1.0);

        match act.action_type as i32 {
            0 => {
                let affordable = (self.portfolio.balance() / price) as u32;
                let shares = (affordable as f32 * amount) as u32;
                self.portfolio.buy(shares, price);
            }
            1 => {
                let shares = (self.portfolio.shares_owned() as f32 * amount) as u32;
                self.portfolio.sell(shares, price);
            }
            _ => {} // hold
        }
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.candles.len() - self.lookback_period {
            self.cursor = 0;
        }
        self.curr_step += 1;
    }

    fn observation(&self) -> TraderObs {
        let n = self.lookback_period;
        let mut data = Vec::with_capacity((n + 1) * 5);

        for candle in &self.candles[self.cursor..self.cursor + n] {
            data.push(candle.open / self.max_price);
            data.push(candle.high / self.max_price);
            data.push(candle.low / self.max_price);
            data.push(candle.close / self.max_price);
            data.push(candle.volume / self.max_volume);
        }

        let norm = if self.portfolio.init_balance() > 0.0 {
            self.portfolio.init_balance()
        } else {
            1.0
        };
        let price = self.candles[self.cursor].close;
        data.push(self.portfolio.balance() / norm);
        data.push(self.portfolio.shares_owned() as f32 * price / norm);
        data.push(self.portfolio.cost_basis() / self.max_price);
        data.push(self.portfolio.net_worth(price) / norm);
        data.push(self.portfolio.profit(price) / norm);

        TraderObs(
            ArrayD::from_shape_vec(IxDyn(&[(n + 1) * 5]), data)
                .expect("Observation shape is fixed"),
        )
    }

    fn reset_(&mut self) -> TraderObs {
        self.cursor = 0;
        self.curr_step = 0;
        self.portfolio = Portfolio::new(self.portfolio.init_balance());
        self.observation()
    }
}

impl Env for TraderEnv {
    type Config = TraderEnvConfig;
    type Obs = TraderObs;
    type Act = TraderAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        ensure!(
            config.lookback_period > 0,
            "lookback_period must be positive"
        );
        ensure!(
            config.candles.len() > config.lookback_period,
            "the candle series must be longer than the lookback period"
        );

        let max_price = config
            .candles
            .iter()
            .flat_map(|c| [c.open, c.high, c.low, c.close])
            .fold(f32::MIN, f32::max);
        let max_volume = config.candles.iter().map(|c| c.volume).fold(1.0, f32::max);
        let init_balance = config.init_balance.unwrap_or(100.0 * max_price);
        info!(
            "TraderEnv over {} candles, initial balance {}",
            config.candles.len(),
            init_balance
        );

        Ok(Self {
            candles: config.candles.clone(),
            lookback_period: config.lookback_period,
            max_price,
            max_volume,
            max_episode_steps: config.max_episode_steps,
            portfolio: Portfolio::new(init_balance),
            cursor: 0,
            curr_step: 0,
            rng: fastrand::Rng::with_seed(seed as u64),
        })
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        self.take_action(act);
        self.advance();

        let obs = self.observation();
        let reward = self.portfolio.balance();
        let price = self.current_price();
        let net_worth = self.portfolio.net_worth(price);
        let is_terminated = (net_worth <= 0.0) as i8;
        let is_truncated = match self.max_episode_steps {
            Some(max) if is_terminated == 0 => (self.curr_step >= max) as i8,
            _ => 0,
        };

        let step = Step::new(
            obs,
            act.clone(),
            vec![reward],
            vec![is_terminated],
            vec![is_truncated],
            (),
            None,
        );
        let mut record = Record::empty();
        record.insert("net_worth", RecordValue::Scalar(net_worth));

        (step, record)
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        Ok(self.reset_())
    }

    fn step_with_reset(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let (mut step, record) = self.step(a);
        if step.is_done() {
            step.init_obs = Some(self.reset_());
        }
        (step, record)
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.rng.seed(ix as u64);
        self.reset()
    }
}
