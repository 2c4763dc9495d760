//! DDPG agent implemented with candle.
use super::{Actor, Critic, DdpgConfig, OuNoise};
use crate::{
    model::{SubModel1, SubModel2},
    util::{self, OutDim},
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::loss::mse;
use ddpg_core::{
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Agent, Configurable, Env, Policy, ReplayBufferBase,
};
use log::{trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

type ActionValue = Tensor;
type Action = Tensor;

/// Deep deterministic policy gradient (DDPG) agent.
///
/// The agent holds four networks: the online actor and critic, and a
/// target copy of each, initialized with identical parameters. One
/// optimization step draws `n_updates_per_opt` mini-batches from the
/// replay buffer; for each, the actor and critic losses are both computed
/// against the parameters from before the step, the networks take one
/// gradient step each and the targets are moved towards the online
/// networks by Polyak averaging.
///
/// In training mode, actions are perturbed by temporally correlated
/// Ornstein-Uhlenbeck noise when a noise process is configured. In
/// evaluation mode the deterministic actor output is returned as is.
pub struct Ddpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = ActionValue>,
    P: SubModel1<Output = Action>,
    R: ReplayBufferBase,
    E::Obs: Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    pub(super) pi: Actor<P>,
    pub(super) pi_tgt: Actor<P>,
    pub(super) qnet: Critic<Q>,
    pub(super) qnet_tgt: Critic<Q>,
    pub(super) gamma: f64,
    pub(super) tau: f64,
    pub(super) n_updates_per_opt: usize,
    pub(super) batch_size: usize,
    pub(super) train: bool,
    pub(super) noise: Option<OuNoise>,
    pub(super) n_opts: usize,
    pub(super) device: Device,
    pub(super) phantom: PhantomData<(E, R)>,
}

impl<E, Q, P, R> Ddpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = ActionValue>,
    P: SubModel1<Output = Action>,
    R: ReplayBufferBase,
    E::Obs: Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    /// Maximizes the critic's value of the actor's own actions.
    ///
    /// The loss is the negated mean action value. Gradients flow through
    /// the critic, but only the actor's parameters are updated.
    fn update_actor(&mut self, batch: &R::Batch) -> Result<f32> {
        let loss = {
            let obs = batch.obs().clone();
            let act = self.pi.forward(&obs.clone().into());
            let qval = self.qnet.forward(&obs.into(), &act.into());
            qval.mean_all()?.neg()?
        };

        self.pi.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    /// Regresses the critic towards one-step Bellman targets.
    ///
    /// Targets are computed with the target actor and target critic and
    /// detached, so the regression treats them as constants. Terminated
    /// transitions drop the bootstrap term; truncated ones keep it.
    fn update_critic(&mut self, batch: R::Batch) -> Result<f32> {
        let loss = {
            let (obs, act, next_obs, reward, is_terminated, _is_truncated) = batch.unpack();
            let reward = util::reward_batch(&reward, &self.device)?;
            let not_done = util::not_done(&is_terminated, &self.device)?;

            let pred = self.qnet.forward(&obs.into(), &act.into());
            let tgt = {
                let next_act = self.pi_tgt.forward(&next_obs.clone().into());
                let next_q = self
                    .qnet_tgt
                    .forward(&next_obs.into(), &next_act.detach().into());
                (reward + ((not_done * self.gamma)? * next_q)?)?
            }
            .detach();

            debug_assert_eq!(pred.dims(), [self.batch_size, 1]);
            debug_assert_eq!(tgt.dims(), [self.batch_size, 1]);

            mse(&pred, &tgt)?
        };

        self.qnet.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    /// Moves both target networks towards their online networks.
    fn soft_update(&mut self) -> Result<()> {
        util::track(self.pi_tgt.get_varmap(), self.pi.get_varmap(), self.tau)?;
        util::track(self.qnet_tgt.get_varmap(), self.qnet.get_varmap(), self.tau)?;
        Ok(())
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let mut loss_actor = 0f32;
        let mut loss_critic = 0f32;

        for _ in 0..self.n_updates_per_opt {
            trace!("batch()");
            let batch = buffer.batch(self.batch_size)?;

            // Both losses are computed against the parameters from before
            // this update
            trace!("update_actor()");
            loss_actor += self.update_actor(&batch)?;

            trace!("update_critic()");
            loss_critic += self.update_critic(batch)?;

            trace!("soft_update()");
            self.soft_update()?;

            self.n_opts += 1;
        }

        loss_actor /= self.n_updates_per_opt as f32;
        loss_critic /= self.n_updates_per_opt as f32;

        Ok(Record::from_slice(&[
            ("loss_actor", RecordValue::Scalar(loss_actor)),
            ("loss_critic", RecordValue::Scalar(loss_critic)),
        ]))
    }
}

impl<E, Q, P, R> Policy<E> for Ddpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = ActionValue>,
    P: SubModel1<Output = Action>,
    R: ReplayBufferBase,
    E::Obs: Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    /// Samples an action with the deterministic actor.
    ///
    /// In training mode, the action is perturbed by the exploration noise
    /// process, whose state persists across calls.
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let act = self.pi.forward(&obs.clone().into()).detach();
        let act = match (self.train, &mut self.noise) {
            (true, Some(noise)) => {
                let eps = noise.sample().expect("Failed to sample exploration noise");
                (act + eps).expect("Failed to perturb the action")
            }
            _ => act,
        };
        act.into()
    }
}

impl<E, Q, P, R> Configurable for Ddpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = ActionValue>,
    P: SubModel1<Output = Action>,
    R: ReplayBufferBase,
    E::Obs: Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    type Config = DdpgConfig<Q::Config, P::Config>;

    /// Constructs a [`Ddpg`] agent.
    ///
    /// Both target networks start as exact copies of their online
    /// counterparts.
    fn build(config: Self::Config) -> Self {
        assert!(
            0.0 < config.tau && config.tau <= 1.0,
            "tau must be in (0, 1]: {}",
            config.tau
        );
        assert!(
            (0.0..=1.0).contains(&config.gamma),
            "gamma must be in [0, 1]: {}",
            config.gamma
        );

        let device: Device = config
            .device
            .expect("No device is given for the DDPG agent")
            .into();
        let pi = Actor::build(config.actor_config, device.clone()).unwrap();
        let pi_tgt = pi.clone();
        let qnet = Critic::build(config.critic_config, device.clone()).unwrap();
        let qnet_tgt = qnet.clone();
        let noise = config
            .noise_config
            .map(|c| OuNoise::new(c, pi.out_dim() as usize, &device).unwrap());

        Ddpg {
            pi,
            pi_tgt,
            qnet,
            qnet_tgt,
            gamma: config.gamma,
            tau: config.tau,
            n_updates_per_opt: config.n_updates_per_opt,
            batch_size: config.batch_size,
            train: config.train,
            noise,
            n_opts: 0,
            device,
            phantom: PhantomData,
        }
    }
}

impl<E, Q, P, R> Agent<E, R> for Ddpg<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Output = ActionValue>,
    P: SubModel1<Output = Action>,
    R: ReplayBufferBase,
    E::Obs: Into<P::Input>,
    E::Act: From<Tensor>,
    Q::Input2: From<Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input1> + Into<P::Input> + Clone,
    <R::Batch as TransitionBatch>::ActBatch: Into<Q::Input2>,
{
    fn train(&mut self) {
        self.train = true;
        if self.noise.is_none() {
            warn!("Training without exploration noise; actions are deterministic");
        }
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record> {
        self.opt_(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ddpg::{ActorConfig, CriticConfig, OuNoiseConfig},
        mlp::{Mlp, MlpConfig},
        Activation, TensorBatch,
    };
    use candle_nn::VarMap;
    use ddpg_core::{
        replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig, SimpleTransitionBatch},
        ExperienceBufferBase, Step,
    };

    const DIM_OBS: i64 = 4;
    const DIM_ACT: i64 = 2;

    #[derive(Clone, Debug)]
    struct TestObs(Tensor);

    impl ddpg_core::Obs for TestObs {
        fn len(&self) -> usize {
            1
        }
    }

    impl From<TestObs> for Tensor {
        fn from(obs: TestObs) -> Self {
            obs.0
        }
    }

    #[derive(Clone, Debug)]
    struct TestAct(Tensor);

    impl ddpg_core::Act for TestAct {
        fn len(&self) -> usize {
            1
        }
    }

    impl From<Tensor> for TestAct {
        fn from(t: Tensor) -> Self {
            Self(t)
        }
    }

    /// The tests below feed the buffer directly, so stepping is never used.
    struct TestEnv;

    impl Env for TestEnv {
        type Config = ();
        type Obs = TestObs;
        type Act = TestAct;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn step(&mut self, _a: &Self::Act) -> (Step<Self>, Record) {
            unimplemented!()
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            unimplemented!()
        }

        fn step_with_reset(&mut self, _a: &Self::Act) -> (Step<Self>, Record) {
            unimplemented!()
        }

        fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
            unimplemented!()
        }
    }

    type TestBuffer = SimpleReplayBuffer<TensorBatch, TensorBatch>;
    type TestAgent = Ddpg<TestEnv, Mlp, Mlp, TestBuffer>;

    fn agent_config() -> DdpgConfig<MlpConfig, MlpConfig> {
        let actor_config = ActorConfig::default().pi_config(MlpConfig::new(
            DIM_OBS,
            vec![16, 16],
            DIM_ACT,
            Activation::Tanh,
        ));
        let critic_config = CriticConfig::default().q_config(MlpConfig::new(
            DIM_OBS + DIM_ACT,
            vec![16, 16],
            1,
            Activation::None,
        ));
        DdpgConfig::default()
            .actor_config(actor_config)
            .critic_config(critic_config)
            .batch_size(32)
            .noise_config(OuNoiseConfig::default())
            .device(crate::Device::Cpu)
    }

    fn filled_buffer(n: usize) -> TestBuffer {
        let config = SimpleReplayBufferConfig::default().capacity(100).seed(0);
        let mut buffer = TestBuffer::build(&config);
        for _ in 0..n {
            let obs = Tensor::randn(0f32, 1f32, (1, DIM_OBS as usize), &Device::Cpu).unwrap();
            let act = Tensor::randn(0f32, 1f32, (1, DIM_ACT as usize), &Device::Cpu).unwrap();
            let next_obs = Tensor::randn(0f32, 1f32, (1, DIM_OBS as usize), &Device::Cpu).unwrap();
            buffer
                .push(SimpleTransitionBatch {
                    obs: TensorBatch::from_tensor(obs),
                    act: TensorBatch::from_tensor(act),
                    next_obs: TensorBatch::from_tensor(next_obs),
                    reward: vec![1.0],
                    is_terminated: vec![0],
                    is_truncated: vec![0],
                })
                .unwrap();
        }
        buffer
    }

    /// Flattens all variables of a varmap in key order.
    fn params(varmap: &VarMap) -> Vec<f32> {
        let data = varmap.data().lock().unwrap();
        let mut keys: Vec<_> = data.keys().cloned().collect();
        keys.sort();
        keys.iter()
            .flat_map(|k| {
                data[k]
                    .as_tensor()
                    .flatten_all()
                    .unwrap()
                    .to_vec1::<f32>()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_targets_equal_online_networks_after_build() {
        let agent = TestAgent::build(agent_config());

        assert_eq!(
            params(agent.pi.get_varmap()),
            params(agent.pi_tgt.get_varmap())
        );
        assert_eq!(
            params(agent.qnet.get_varmap()),
            params(agent.qnet_tgt.get_varmap())
        );
    }

    #[test]
    fn test_opt_updates_all_four_networks() -> Result<()> {
        let mut agent = TestAgent::build(agent_config());
        agent.train();
        let mut buffer = filled_buffer(50);

        let before = [
            params(agent.pi.get_varmap()),
            params(agent.pi_tgt.get_varmap()),
            params(agent.qnet.get_varmap()),
            params(agent.qnet_tgt.get_varmap()),
        ];

        let record = agent.opt_with_record(&mut buffer)?;

        let loss_critic = record.get_scalar("loss_critic")?;
        assert!(loss_critic.is_finite());
        assert!(loss_critic >= 0.0);
        assert!(record.get_scalar("loss_actor")?.is_finite());

        let after = [
            params(agent.pi.get_varmap()),
            params(agent.pi_tgt.get_varmap()),
            params(agent.qnet.get_varmap()),
            params(agent.qnet_tgt.get_varmap()),
        ];
        for (b, a) in before.iter().zip(after.iter()) {
            assert_ne!(b, a);
        }
        Ok(())
    }
}
