//! Batches of transitions.

/// Basic operations on a stacked batch of observations or actions.
///
/// Implementations own a backend-specific, preallocated slab of `capacity`
/// rows; `push` writes rows at an index (wrapping is handled by the caller's
/// ring discipline) and `sample` gathers rows at the given indices.
pub trait SubBatch {
    /// Creates a new batch with the specified capacity.
    fn new(capacity: usize) -> Self;

    /// Adds data at the specified index.
    fn push(&mut self, ix: usize, data: Self);

    /// Retrieves rows at the specified indices.
    fn sample(&self, ixs: &Vec<usize>) -> Self;
}

/// Interface of a batch of transitions `(o_t, a_t, o_t+1, r_t, ...)`.
pub trait TransitionBatch {
    /// A set of observations in a batch.
    type ObsBatch;

    /// A set of actions in a batch.
    type ActBatch;

    /// Unpacks the batch into
    /// `(obs, act, next_obs, reward, is_terminated, is_truncated)`.
    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    );

    /// Returns the number of transitions in the batch.
    fn len(&self) -> usize;

    /// Returns a reference to the observations.
    fn obs(&self) -> &Self::ObsBatch;

    /// Returns a reference to the actions.
    fn act(&self) -> &Self::ActBatch;
}

/// A generic transition batch over any [`SubBatch`] storage.
///
/// The same type doubles as the item pushed into the replay buffer (with a
/// single transition) and the batch sampled from it (with `batch_size`
/// transitions, stacked in draw order).
#[derive(Debug)]
pub struct SimpleTransitionBatch<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    /// Current observations.
    pub obs: O,

    /// Selected actions.
    pub act: A,

    /// Next observations.
    pub next_obs: O,

    /// Rewards, one finite scalar per transition.
    pub reward: Vec<f32>,

    /// Episode termination flags.
    pub is_terminated: Vec<i8>,

    /// Episode truncation flags.
    pub is_truncated: Vec<i8>,
}

impl<O, A> TransitionBatch for SimpleTransitionBatch<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_terminated,
            self.is_truncated,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}

impl<O, A> SimpleTransitionBatch<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    /// Creates an empty batch with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: Vec::with_capacity(capacity),
            is_terminated: Vec::with_capacity(capacity),
            is_truncated: Vec::with_capacity(capacity),
        }
    }
}
