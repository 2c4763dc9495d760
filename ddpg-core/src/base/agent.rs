//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Sets the policy to training mode.
    fn train(&mut self);

    /// Sets the policy to evaluation mode.
    fn eval(&mut self);

    /// Returns if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step.
    ///
    /// `buffer` is a replay buffer from which transition batches will be
    /// taken for updating model parameters. Fails if the buffer holds fewer
    /// transitions than the batch size of the agent.
    fn opt(&mut self, buffer: &mut R) -> Result<()> {
        let _ = self.opt_with_record(buffer)?;
        Ok(())
    }

    /// Performs an optimization step and returns information on the step,
    /// typically training losses.
    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record>;
}
