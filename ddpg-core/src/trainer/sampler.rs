//! Experience sampling.
use crate::{record::Record, Env, ExperienceBufferBase, Policy, StepProcessor};
use anyhow::Result;

/// Samples experiences from an environment and pushes them to a replay
/// buffer.
///
/// One call to [`Sampler::sample_and_push`] performs a single environment
/// step: the policy observes the current state, acts, the resulting
/// [`Step`](crate::Step) is converted to a transition by the step processor
/// and the transition is pushed into the buffer. Episode boundaries are
/// handled internally.
pub struct Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    env: E,
    prev_obs: Option<E::Obs>,
    step_processor: P,
}

impl<E, P> Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    /// Creates a sampler for the given environment and step processor.
    pub fn new(env: E, step_processor: P) -> Self {
        Self {
            env,
            prev_obs: None,
            step_processor,
        }
    }

    /// Performs one environment step and pushes the resulting transition to
    /// the replay buffer.
    pub fn sample_and_push<A, R>(&mut self, policy: &mut A, buffer: &mut R) -> Result<Record>
    where
        A: Policy<E>,
        R: ExperienceBufferBase<Item = P::Output>,
    {
        // Reset the environment at the start of the first episode
        if self.prev_obs.is_none() {
            self.prev_obs = Some(self.env.reset()?);
            self.step_processor
                .reset(self.prev_obs.as_ref().unwrap().clone());
        }

        // Sample an action and apply it to the environment
        let (step, record, is_done) = {
            let act = policy.sample(self.prev_obs.as_ref().unwrap());
            let (step, record) = self.env.step_with_reset(&act);
            let is_done = step.is_done();
            (step, record, is_done)
        };

        // Update the previous observation
        self.prev_obs = match is_done {
            true => Some(step.init_obs.clone().expect("Failed to unwrap init_obs")),
            false => Some(step.obs.clone()),
        };

        let transition = self.step_processor.process(step)?;
        buffer.push(transition)?;

        if is_done {
            self.step_processor
                .reset(self.prev_obs.as_ref().unwrap().clone());
        }

        Ok(record)
    }
}
