use anyhow::Result;
use candle_core::Tensor;
use ddpg_candle_agent::{
    ddpg::{ActorConfig, CriticConfig, Ddpg, DdpgConfig, OuNoiseConfig},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    util::arrayd_to_tensor,
    Activation, Device, TensorBatch,
};
use ddpg_core::{
    record::{NullRecorder, Record},
    replay_buffer::{
        SimpleReplayBuffer, SimpleReplayBufferConfig, SimpleStepProcessor,
        SimpleStepProcessorConfig,
    },
    Agent, Configurable, DdpgError, DefaultEvaluator, Policy, ReplayBufferBase, Step, Trainer,
    TrainerConfig,
};
use ddpg_trader_env::{Candle, TraderAct, TraderEnv, TraderEnvConfig, TraderObs};

const LOOKBACK_PERIOD: usize = 3;
const DIM_OBS: i64 = ((LOOKBACK_PERIOD + 1) * 5) as i64;
const DIM_ACT: i64 = 2;
const LR_ACTOR: f64 = 1e-4;
const LR_CRITIC: f64 = 1e-3;
const DISCOUNT_FACTOR: f64 = 0.99;
const TAU: f64 = 0.01;
const BATCH_SIZE: usize = 8;
const N_UPDATES_PER_OPT: usize = 1;
const WARMUP_PERIOD: usize = 16;
const OPT_INTERVAL: usize = 1;
const EVAL_INTERVAL: usize = 10;
const MAX_OPTS: usize = 20;
const REPLAY_BUFFER_CAPACITY: usize = 64;
const N_EPISODES_PER_EVAL: usize = 2;
const MAX_EPISODE_STEPS: usize = 10;
const INIT_BALANCE: f32 = 1000.0;

#[derive(Clone, Debug)]
struct Obs(Tensor);

impl ddpg_core::Obs for Obs {
    fn len(&self) -> usize {
        1
    }
}

impl From<Obs> for Tensor {
    fn from(obs: Obs) -> Tensor {
        obs.0
    }
}

impl From<Obs> for TensorBatch {
    fn from(obs: Obs) -> TensorBatch {
        TensorBatch::from_tensor(obs.0)
    }
}

#[derive(Clone, Debug)]
struct Act(Tensor);

impl ddpg_core::Act for Act {
    fn len(&self) -> usize {
        1
    }
}

impl From<Tensor> for Act {
    fn from(t: Tensor) -> Act {
        Act(t)
    }
}

impl From<Act> for TensorBatch {
    fn from(act: Act) -> TensorBatch {
        TensorBatch::from_tensor(act.0)
    }
}

fn convert_obs(obs: TraderObs) -> Obs {
    Obs(arrayd_to_tensor::<f32, f32>(obs.0, true).unwrap())
}

/// Maps an action vector in `[-1, 1]^2` to the trader's action encoding.
fn convert_act(act: &Act) -> TraderAct {
    let v = act.0.flatten_all().unwrap().to_vec1::<f32>().unwrap();
    let action_type = ((v[0] + 1.0) * 1.5).clamp(0.0, 2.99);
    let amount = ((v[1] + 1.0) / 2.0).clamp(0.0, 1.0);
    TraderAct::new(action_type, amount)
}

fn convert_step(step: Step<TraderEnv>, act: &Act) -> Step<Env> {
    Step::new(
        convert_obs(step.obs),
        act.clone(),
        step.reward,
        step.is_terminated,
        step.is_truncated,
        (),
        step.init_obs.map(convert_obs),
    )
}

struct Env(TraderEnv);

impl ddpg_core::Env for Env {
    type Config = TraderEnvConfig;
    type Obs = Obs;
    type Act = Act;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self(TraderEnv::build(config, seed)?))
    }

    fn step(&mut self, a: &Act) -> (Step<Self>, Record) {
        let (step, record) = self.0.step(&convert_act(a));
        (convert_step(step, a), record)
    }

    fn reset(&mut self) -> Result<Obs> {
        Ok(convert_obs(self.0.reset()?))
    }

    fn step_with_reset(&mut self, a: &Act) -> (Step<Self>, Record) {
        let (step, record) = self.0.step_with_reset(&convert_act(a));
        (convert_step(step, a), record)
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Obs> {
        Ok(convert_obs(self.0.reset_with_index(ix)?))
    }
}

type StepProc = SimpleStepProcessor<Env, TensorBatch, TensorBatch>;
type ReplayBuffer = SimpleReplayBuffer<TensorBatch, TensorBatch>;
type DdpgAgent = Ddpg<Env, Mlp, Mlp, ReplayBuffer>;

fn candles() -> Vec<Candle> {
    (0..16)
        .map(|i| {
            let base = 10.0 + (i % 8) as f32;
            Candle::new(base, base + 1.0, base - 1.0, base + 0.5, 1000.0)
        })
        .collect()
}

fn env_config() -> TraderEnvConfig {
    TraderEnvConfig::default()
        .candles(candles())
        .lookback_period(LOOKBACK_PERIOD)
        .init_balance(INIT_BALANCE)
        .max_episode_steps(MAX_EPISODE_STEPS)
}

fn agent_config() -> DdpgConfig<MlpConfig, MlpConfig> {
    let actor_config = ActorConfig::default()
        .opt_config(OptimizerConfig::Adam { lr: LR_ACTOR })
        .pi_config(MlpConfig::new(
            DIM_OBS,
            vec![64, 64],
            DIM_ACT,
            Activation::Tanh,
        ));
    let critic_config = CriticConfig::default()
        .opt_config(OptimizerConfig::Adam { lr: LR_CRITIC })
        .q_config(MlpConfig::new(
            DIM_OBS + DIM_ACT,
            vec![64, 64],
            1,
            Activation::None,
        ));

    DdpgConfig::default()
        .actor_config(actor_config)
        .critic_config(critic_config)
        .discount_factor(DISCOUNT_FACTOR)
        .tau(TAU)
        .batch_size(BATCH_SIZE)
        .n_updates_per_opt(N_UPDATES_PER_OPT)
        .noise_config(OuNoiseConfig::default())
        .device(Device::Cpu)
}

#[test]
fn test_ddpg_trader_training() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let env_config = env_config();
    let trainer_config = TrainerConfig::default()
        .max_opts(MAX_OPTS)
        .opt_interval(OPT_INTERVAL)
        .eval_interval(EVAL_INTERVAL)
        .warmup_period(WARMUP_PERIOD);
    let replay_buffer_config = SimpleReplayBufferConfig::default()
        .capacity(REPLAY_BUFFER_CAPACITY)
        .seed(7);

    let mut trainer = Trainer::<Env, StepProc, ReplayBuffer>::build(
        trainer_config,
        env_config.clone(),
        SimpleStepProcessorConfig::default(),
        replay_buffer_config,
    );
    let mut agent = DdpgAgent::build(agent_config());
    let mut recorder = NullRecorder {};
    let mut evaluator = DefaultEvaluator::<Env>::new(&env_config, 17, N_EPISODES_PER_EVAL)?;

    trainer.train(&mut agent, &mut recorder, &mut evaluator)?;
    Ok(())
}

#[test]
fn test_eval_actions_are_deterministic() -> Result<()> {
    use ddpg_core::Env as _;

    let mut env = Env::build(&env_config(), 3)?;
    let obs = env.reset()?;
    let mut agent = DdpgAgent::build(agent_config());
    agent.eval();

    let a1 = agent.sample(&obs);
    let a2 = agent.sample(&obs);
    assert_eq!(a1.0.to_vec2::<f32>()?, a2.0.to_vec2::<f32>()?);
    Ok(())
}

#[test]
fn test_train_mode_adds_exploration_noise() -> Result<()> {
    use ddpg_core::Env as _;

    let mut env = Env::build(&env_config(), 5)?;
    let obs = env.reset()?;
    let mut agent = DdpgAgent::build(agent_config());
    agent.train();

    let a1 = agent.sample(&obs);
    let a2 = agent.sample(&obs);
    assert_ne!(a1.0.to_vec2::<f32>()?, a2.0.to_vec2::<f32>()?);
    Ok(())
}

#[test]
fn test_opt_requires_enough_samples() {
    let config = SimpleReplayBufferConfig::default()
        .capacity(REPLAY_BUFFER_CAPACITY)
        .seed(0);
    let mut buffer = ReplayBuffer::build(&config);
    let mut agent = DdpgAgent::build(agent_config());
    agent.train();

    let err = agent
        .opt_with_record(&mut buffer)
        .expect_err("an empty buffer cannot provide a batch");
    assert!(matches!(
        err.downcast_ref::<DdpgError>(),
        Some(DdpgError::InsufficientSamples { .. })
    ));
}
