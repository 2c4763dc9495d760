//! Environment step.
use super::Env;
use anyhow::Result;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
/// This object is used to create transitions `(o_t, a_t, o_t+1, r_t)`.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward. Expected to hold a single element; step processors reject
    /// anything else (see [`DdpgError::MalformedTransition`]).
    ///
    /// [`DdpgError::MalformedTransition`]: crate::DdpgError::MalformedTransition
    pub reward: Vec<f32>,

    /// Flag denoting if the episode is terminated.
    pub is_terminated: Vec<i8>,

    /// Flag denoting if the episode is truncated.
    pub is_truncated: Vec<i8>,

    /// Information defined by the user.
    pub info: E::Info,

    /// Initial observation of the next episode. `None` unless the episode
    /// ended at this step and the environment was reset.
    pub init_obs: Option<E::Obs>,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: Vec<f32>,
        is_terminated: Vec<i8>,
        is_truncated: Vec<i8>,
        info: E::Info,
        init_obs: Option<E::Obs>,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
            init_obs,
        }
    }

    /// Terminated or truncated.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_terminated[0] == 1 || self.is_truncated[0] == 1
    }
}

/// Processes a [`Step`] and outputs an item [`Self::Output`].
///
/// [`Step`] objects are transformed into [`Self::Output`], which will be
/// pushed into a replay buffer implementing
/// [`ExperienceBufferBase`](crate::ExperienceBufferBase).
/// The type [`Self::Output`] should be the same as
/// [`ExperienceBufferBase::Item`](crate::ExperienceBufferBase::Item).
///
/// [`Self::Output`]: StepProcessor::Output
pub trait StepProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// The type of transitions produced by this trait.
    type Output;

    /// Builds a processor.
    fn build(config: &Self::Config) -> Self;

    /// Resets the object with the initial observation of an episode.
    fn reset(&mut self, init_obs: E::Obs);

    /// Processes a [`Step`] object into a transition.
    ///
    /// Fails with [`DdpgError::MalformedTransition`] if the reward of the
    /// step cannot be coerced to a finite scalar.
    ///
    /// [`DdpgError::MalformedTransition`]: crate::DdpgError::MalformedTransition
    fn process(&mut self, step: Step<E>) -> Result<Self::Output>;
}
