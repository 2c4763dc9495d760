#![warn(missing_docs)]
//! Core abstractions for off-policy actor-critic reinforcement learning.
//!
//! This crate defines the interfaces between the pieces of a training setup:
//! environments ([`Env`]), policies and agents ([`Policy`], [`Agent`]),
//! replay buffers ([`ReplayBufferBase`]) and the glue that runs them
//! ([`Trainer`]). It also provides a generic FIFO replay buffer with uniform
//! sampling in [`replay_buffer`].
//!
//! Backend-specific code (neural networks, autodiff) lives in separate
//! crates; this crate is agnostic of how function approximators are
//! implemented.
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Configurable, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase,
    Step, StepProcessor,
};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};

pub use error::DdpgError;
