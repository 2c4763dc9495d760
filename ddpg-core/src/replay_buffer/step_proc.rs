//! Conversion of environment steps into transitions.
use super::{SimpleTransitionBatch, SubBatch};
use crate::{DdpgError, Env, Obs, Step, StepProcessor};
use anyhow::Result;
use std::{default::Default, marker::PhantomData};

/// Coerces the reward of a step to a single finite scalar.
///
/// Environments report rewards as a vector for historical reasons; a valid
/// transition carries exactly one finite element. Anything else fails with
/// [`DdpgError::MalformedTransition`] rather than letting an undefined value
/// flow into the training loss.
pub fn coerce_reward(reward: &[f32]) -> Result<f32, DdpgError> {
    match reward {
        [r] if r.is_finite() => Ok(*r),
        [r] => Err(DdpgError::MalformedTransition(format!(
            "non-finite reward: {}",
            r
        ))),
        _ => Err(DdpgError::MalformedTransition(format!(
            "expected a single reward element, got {}",
            reward.len()
        ))),
    }
}

/// Configuration of [`SimpleStepProcessor`].
#[derive(Clone, Debug)]
pub struct SimpleStepProcessorConfig {}

impl Default for SimpleStepProcessorConfig {
    fn default() -> Self {
        Self {}
    }
}

/// Builds 1-step transitions `(o_t, a_t, o_t+1, r_t)` from consecutive
/// [`Step`] objects.
///
/// The processor keeps the previous observation between calls; it must be
/// [`reset`](StepProcessor::reset) with the initial observation of each
/// episode before processing steps.
pub struct SimpleStepProcessor<E, O, A> {
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for SimpleStepProcessor<E, O, A>
where
    E: Env,
    O: SubBatch + From<E::Obs>,
    A: SubBatch + From<E::Act>,
{
    type Config = SimpleStepProcessorConfig;
    type Output = SimpleTransitionBatch<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    fn process(&mut self, step: Step<E>) -> Result<Self::Output> {
        assert_eq!(step.obs.len(), 1);

        if self.prev_obs.is_none() {
            panic!("prev_obs is not set. Forgot to call reset()?");
        }

        let reward = vec![coerce_reward(&step.reward)?];
        let is_done = step.is_done();
        let next_obs = step.obs.clone().into();
        let obs = self.prev_obs.replace(step.obs.into()).unwrap();
        let act = step.act.into();
        let is_terminated = step.is_terminated;
        let is_truncated = step.is_truncated;

        if is_done {
            self.prev_obs
                .replace(step.init_obs.expect("Failed to unwrap init_obs").into());
        }

        Ok(SimpleTransitionBatch {
            obs,
            act,
            next_obs,
            reward,
            is_terminated,
            is_truncated,
        })
    }
}
