//! A generic FIFO replay buffer with uniform sampling.
//!
//! This module stores transitions of arbitrary observation and action types
//! in a capacity-bounded ring and draws training batches uniformly at random
//! **without replacement** within a draw. Uniform sampling de-correlates
//! sequential transitions, which off-policy learning relies on; FIFO
//! eviction bounds memory while keeping the buffer fresh as the policy
//! improves.
mod base;
mod batch;
mod config;
mod step_proc;

pub use base::SimpleReplayBuffer;
pub use batch::{SimpleTransitionBatch, SubBatch, TransitionBatch};
pub use config::SimpleReplayBufferConfig;
pub use step_proc::{coerce_reward, SimpleStepProcessor, SimpleStepProcessorConfig};
