//! Evaluate a [`Policy`](crate::Policy).
use crate::{Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluates a policy.
pub trait Evaluator<E: Env> {
    /// Runs evaluation episodes and returns a performance measure, typically
    /// the average episode return.
    ///
    /// The caller of this method needs to handle the internal state of the
    /// policy, like training/evaluation mode.
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<f32>
    where
        P: Policy<E>;
}
