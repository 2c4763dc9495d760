//! Train an [`Agent`].
mod config;
mod sampler;

use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, Evaluator, ExperienceBufferBase, ReplayBufferBase, StepProcessor,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
pub use sampler::Sampler;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop and related objects.
///
/// Training alternates strictly between rollout collection and learning:
/// every environment step pushes one transition into the replay buffer, and
/// every `opt_interval` environment steps (after `warmup_period` steps have
/// filled the buffer) the agent performs one optimization step on batches
/// sampled from the buffer.
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[StepProcessor]
///     C -->|ExperienceBufferBase::Item|D[ReplayBufferBase]
///     D -->|TransitionBatch|A
/// ```
pub struct Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Configuration of the environment for training.
    env_config: E::Config,

    /// Configuration of the transition producer.
    step_proc_config: P::Config,

    /// Configuration of the replay buffer.
    replay_buffer_config: R::Config,

    /// Interval of optimization in environment steps.
    opt_interval: usize,

    /// Interval of evaluation in optimization steps.
    eval_interval: usize,

    /// The maximal number of optimization steps.
    max_opts: usize,

    /// Warmup period, for filling the replay buffer, in environment steps.
    warmup_period: usize,
}

impl<E, P, R> Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Constructs a trainer.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        step_proc_config: P::Config,
        replay_buffer_config: R::Config,
    ) -> Self {
        Self {
            env_config,
            step_proc_config,
            replay_buffer_config,
            opt_interval: config.opt_interval,
            eval_interval: config.eval_interval,
            max_opts: config.max_opts,
            warmup_period: config.warmup_period,
        }
    }

    /// Performs a training step: one environment step, and, when due, one
    /// optimization step.
    ///
    /// The second return value tells if an optimization step was done.
    pub fn train_step<A>(
        &mut self,
        agent: &mut A,
        buffer: &mut R,
        sampler: &mut Sampler<E, P>,
        env_steps: &mut usize,
        opt_steps: &mut usize,
    ) -> Result<(Record, bool)>
    where
        A: Agent<E, R>,
    {
        let mut record = sampler.sample_and_push(agent, buffer)?;
        *env_steps += 1;

        if *env_steps < self.warmup_period || *env_steps % self.opt_interval != 0 {
            Ok((record, false))
        } else {
            let record_agent = agent.opt_with_record(buffer)?;
            *opt_steps += 1;
            record = record.merge(record_agent);
            Ok((record, true))
        }
    }

    /// Trains the agent.
    pub fn train<A, D, S>(
        &mut self,
        agent: &mut A,
        recorder: &mut S,
        evaluator: &mut D,
    ) -> Result<()>
    where
        A: Agent<E, R>,
        D: Evaluator<E>,
        S: Recorder,
    {
        let env = E::build(&self.env_config, 0)?;
        let step_processor = P::build(&self.step_proc_config);
        let mut buffer = R::build(&self.replay_buffer_config);
        let mut sampler = Sampler::new(env, step_processor);
        let mut env_steps: usize = 0;
        let mut opt_steps: usize = 0;
        agent.train();

        loop {
            let (mut record, is_opt) = self.train_step(
                agent,
                &mut buffer,
                &mut sampler,
                &mut env_steps,
                &mut opt_steps,
            )?;

            if is_opt {
                if opt_steps % self.eval_interval == 0 {
                    info!("Starts evaluation of the trained policy");
                    agent.eval();
                    let eval_reward = evaluator.evaluate(agent)?;
                    agent.train();
                    record.insert("eval_reward", Scalar(eval_reward));
                }

                if opt_steps == self.max_opts {
                    if !record.is_empty() {
                        recorder.write(record);
                    }
                    break;
                }
            }

            if !record.is_empty() {
                recorder.write(record);
            }
        }

        Ok(())
    }
}
