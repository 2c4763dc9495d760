//! Generic implementation of a uniform replay buffer.
use super::{SimpleReplayBufferConfig, SimpleTransitionBatch, SubBatch, TransitionBatch};
use crate::{DdpgError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

/// A capacity-bounded replay buffer with FIFO eviction and uniform sampling.
///
/// Transitions are stored in a ring: once `capacity` transitions are held,
/// pushing a new one overwrites the oldest. [`ReplayBufferBase::batch`]
/// draws uniformly at random without replacement within a draw and has no
/// side effect on the stored contents or their order.
///
/// # Type Parameters
///
/// * `O` - Storage for observations, implements [`SubBatch`]
/// * `A` - Storage for actions, implements [`SubBatch`]
pub struct SimpleReplayBuffer<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    /// Maximum number of transitions that can be stored.
    capacity: usize,

    /// Current insertion index.
    i: usize,

    /// Current number of stored transitions.
    size: usize,

    /// Storage for observations.
    obs: O,

    /// Storage for actions.
    act: A,

    /// Storage for next observations.
    next_obs: O,

    /// Storage for rewards.
    reward: Vec<f32>,

    /// Storage for termination flags.
    is_terminated: Vec<i8>,

    /// Storage for truncation flags.
    is_truncated: Vec<i8>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl<O, A> SimpleReplayBuffer<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    #[inline]
    fn push_reward(&mut self, i: usize, b: &[f32]) {
        let mut j = i;
        for r in b.iter() {
            self.reward[j] = *r;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    #[inline]
    fn push_is_terminated(&mut self, i: usize, b: &[i8]) {
        let mut j = i;
        for d in b.iter() {
            self.is_terminated[j] = *d;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    #[inline]
    fn push_is_truncated(&mut self, i: usize, b: &[i8]) {
        let mut j = i;
        for d in b.iter() {
            self.is_truncated[j] = *d;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample_reward(&self, ixs: &Vec<usize>) -> Vec<f32> {
        ixs.iter().map(|ix| self.reward[*ix]).collect()
    }

    fn sample_is_terminated(&self, ixs: &Vec<usize>) -> Vec<i8> {
        ixs.iter().map(|ix| self.is_terminated[*ix]).collect()
    }

    fn sample_is_truncated(&self, ixs: &Vec<usize>) -> Vec<i8> {
        ixs.iter().map(|ix| self.is_truncated[*ix]).collect()
    }

    /// Returns the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the sum of all rewards in the buffer.
    pub fn sum_rewards(&self) -> f32 {
        self.reward[..self.size].iter().sum()
    }
}

impl<O, A> ExperienceBufferBase for SimpleReplayBuffer<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    type Item = SimpleTransitionBatch<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    /// Adds transitions to the buffer, evicting the oldest ones when the
    /// buffer is at capacity.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len();
        let (obs, act, next_obs, reward, is_terminated, is_truncated) = tr.unpack();
        self.obs.push(self.i, obs);
        self.act.push(self.i, act);
        self.next_obs.push(self.i, next_obs);
        self.push_reward(self.i, &reward);
        self.push_is_terminated(self.i, &is_terminated);
        self.push_is_truncated(self.i, &is_truncated);

        self.i = (self.i + len) % self.capacity;
        self.size += len;
        if self.size >= self.capacity {
            self.size = self.capacity;
        }

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for SimpleReplayBuffer<O, A>
where
    O: SubBatch,
    A: SubBatch,
{
    type Config = SimpleReplayBufferConfig;
    type Batch = SimpleTransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;

        Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            is_terminated: vec![0; capacity],
            is_truncated: vec![0; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples `size` distinct transitions uniformly at random.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if size > self.size {
            return Err(DdpgError::InsufficientSamples {
                requested: size,
                stored: self.size,
            }
            .into());
        }

        let ixs = rand::seq::index::sample(&mut self.rng, self.size, size).into_vec();

        Ok(Self::Batch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: self.sample_reward(&ixs),
            is_terminated: self.sample_is_terminated(&ixs),
            is_truncated: self.sample_is_truncated(&ixs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DdpgError;

    /// Row-oriented storage for tests: each row is one f32.
    #[derive(Debug)]
    struct ScalarBatch {
        rows: Vec<f32>,
    }

    impl SubBatch for ScalarBatch {
        fn new(capacity: usize) -> Self {
            Self {
                rows: vec![0.; capacity],
            }
        }

        fn push(&mut self, ix: usize, data: Self) {
            let capacity = self.rows.len();
            let mut j = ix;
            for v in data.rows.iter() {
                self.rows[j] = *v;
                j = (j + 1) % capacity;
            }
        }

        fn sample(&self, ixs: &Vec<usize>) -> Self {
            Self {
                rows: ixs.iter().map(|ix| self.rows[*ix]).collect(),
            }
        }
    }

    fn transition(v: f32) -> SimpleTransitionBatch<ScalarBatch, ScalarBatch> {
        SimpleTransitionBatch {
            obs: ScalarBatch { rows: vec![v] },
            act: ScalarBatch { rows: vec![-v] },
            next_obs: ScalarBatch { rows: vec![v + 1.] },
            reward: vec![v],
            is_terminated: vec![0],
            is_truncated: vec![0],
        }
    }

    fn buffer(capacity: usize) -> SimpleReplayBuffer<ScalarBatch, ScalarBatch> {
        let config = SimpleReplayBufferConfig::default().capacity(capacity).seed(0);
        SimpleReplayBuffer::build(&config)
    }

    #[test]
    fn test_len_is_bounded_by_capacity() {
        let mut buffer = buffer(10);
        for i in 0..25 {
            buffer.push(transition(i as f32)).unwrap();
            assert!(buffer.len() <= 10);
        }
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn test_fifo_eviction_keeps_most_recent() {
        let mut buffer = buffer(10);
        for i in 0..13 {
            buffer.push(transition(i as f32)).unwrap();
        }

        // The oldest three transitions (rewards 0, 1, 2) were evicted.
        let batch = buffer.batch(10).unwrap();
        let mut rewards = batch.reward.clone();
        rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f32> = (3..13).map(|i| i as f32).collect();
        assert_eq!(rewards, expected);
    }

    #[test]
    fn test_sampling_is_without_replacement() {
        let mut buffer = buffer(100);
        for i in 0..50 {
            buffer.push(transition(i as f32)).unwrap();
        }

        for _ in 0..10 {
            let batch = buffer.batch(50).unwrap();
            assert_eq!(batch.len(), 50);
            let mut rewards = batch.reward.clone();
            rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
            rewards.dedup();
            assert_eq!(rewards.len(), 50);
        }
    }

    #[test]
    fn test_sampling_has_no_side_effects() {
        let mut buffer = buffer(100);
        for i in 0..20 {
            buffer.push(transition(i as f32)).unwrap();
        }
        let sum = buffer.sum_rewards();
        let _ = buffer.batch(10).unwrap();
        assert_eq!(buffer.len(), 20);
        assert_eq!(buffer.sum_rewards(), sum);
    }

    #[test]
    fn test_insufficient_samples() {
        let mut buffer = buffer(100);
        for i in 0..5 {
            buffer.push(transition(i as f32)).unwrap();
        }

        let err = buffer.batch(6).unwrap_err();
        match err.downcast_ref::<DdpgError>() {
            Some(DdpgError::InsufficientSamples { requested, stored }) => {
                assert_eq!(*requested, 6);
                assert_eq!(*stored, 5);
            }
            _ => panic!("expected InsufficientSamples, got {:?}", err),
        }
    }
}
