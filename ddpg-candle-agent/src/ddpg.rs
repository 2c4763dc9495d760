//! DDPG agent.
//!
//! The deep deterministic policy gradient agent maintains a deterministic
//! [`Actor`], an action-value [`Critic`] and a target copy of each. The
//! critic regresses towards one-step Bellman targets computed with the
//! target networks, the actor ascends the critic's value of its own
//! actions, and the target networks track the online networks with Polyak
//! averaging.
mod actor;
mod base;
mod config;
mod critic;
mod noise;
pub use actor::{Actor, ActorConfig};
pub use base::Ddpg;
pub use config::DdpgConfig;
pub use critic::{Critic, CriticConfig};
pub use noise::{OuNoise, OuNoiseConfig};
