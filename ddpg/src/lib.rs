#![warn(missing_docs)]
//! DDPG is a library for continuous-control reinforcement learning with the
//! deep deterministic policy gradient algorithm. Environments and agents are
//! independent of each other; this crate ties the workspace together:
//!
//! * [ddpg-core](ddpg_core) provides the base abstractions:
//!   [`Env`](ddpg_core::Env), [`Policy`](ddpg_core::Policy),
//!   [`Agent`](ddpg_core::Agent), the generic FIFO replay buffer in
//!   [`replay_buffer`](ddpg_core::replay_buffer) and the
//!   [`Trainer`](ddpg_core::Trainer) loop.
//! * `ddpg-candle-agent` implements the DDPG agent itself with
//!   [candle](https://crates.io/crates/candle-core): deterministic actor,
//!   action-value critic, target networks with Polyak averaging and
//!   Ornstein-Uhlenbeck exploration noise.
//! * `ddpg-trader-env` is a historical stock-trading environment used by the
//!   integration tests.
//!
//! To bridge an environment and the agent, conversions between the
//! environment's observation/action types and tensors are defined at the
//! application boundary; `tests/test_ddpg_trader.rs` shows the pattern.
pub use ddpg_core as core;
