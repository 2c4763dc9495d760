//! Configuration of [`Ddpg`](super::Ddpg) agent.
use super::{ActorConfig, CriticConfig, OuNoiseConfig};
use crate::{util::OutDim, Device};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Ddpg`](super::Ddpg) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdpgConfig<Q, P>
where
    Q: OutDim + Clone,
    P: OutDim + Clone,
{
    /// Configuration of the actor.
    pub actor_config: ActorConfig<P>,

    /// Configuration of the critic.
    pub critic_config: CriticConfig<Q>,

    /// Discount factor, in `[0, 1]`.
    pub gamma: f64,

    /// Polyak coefficient of the target network updates, in `(0, 1]`.
    pub tau: f64,

    /// The number of mini-batch updates per optimization step.
    pub n_updates_per_opt: usize,

    /// Mini-batch size.
    pub batch_size: usize,

    /// Configuration of the exploration noise.
    ///
    /// If `None`, the agent acts deterministically even in training mode.
    pub noise_config: Option<OuNoiseConfig>,

    /// Initial training mode.
    pub train: bool,

    /// Device on which the networks are placed.
    pub device: Option<Device>,
}

impl<Q, P> Default for DdpgConfig<Q, P>
where
    Q: OutDim + Clone,
    P: OutDim + Clone,
{
    fn default() -> Self {
        Self {
            actor_config: Default::default(),
            critic_config: Default::default(),
            gamma: 0.99,
            tau: 0.01,
            n_updates_per_opt: 1,
            batch_size: 64,
            noise_config: None,
            train: false,
            device: None,
        }
    }
}

impl<Q, P> DdpgConfig<Q, P>
where
    Q: DeserializeOwned + Serialize + OutDim + Clone,
    P: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Sets the number of mini-batch updates per optimization step.
    pub fn n_updates_per_opt(mut self, v: usize) -> Self {
        self.n_updates_per_opt = v;
        self
    }

    /// Sets the mini-batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the Polyak coefficient of the target network updates.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Sets the configuration of the actor.
    pub fn actor_config(mut self, actor_config: ActorConfig<P>) -> Self {
        self.actor_config = actor_config;
        self
    }

    /// Sets the configuration of the critic.
    pub fn critic_config(mut self, critic_config: CriticConfig<Q>) -> Self {
        self.critic_config = critic_config;
        self
    }

    /// Enables exploration noise with the given configuration.
    pub fn noise_config(mut self, v: OuNoiseConfig) -> Self {
        self.noise_config = Some(v);
        self
    }

    /// Sets the device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Constructs [`DdpgConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdpgConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::MlpConfig;
    use crate::Activation;
    use tempdir::TempDir;

    #[test]
    fn test_serde_ddpg_config() -> Result<()> {
        let config: DdpgConfig<MlpConfig, MlpConfig> = DdpgConfig::default()
            .batch_size(32)
            .discount_factor(0.98)
            .tau(0.05)
            .noise_config(OuNoiseConfig::default())
            .actor_config(
                ActorConfig::default().pi_config(MlpConfig::new(
                    3,
                    vec![64, 64],
                    1,
                    Activation::Tanh,
                )),
            )
            .device(Device::Cpu);

        let dir = TempDir::new("ddpg_config")?;
        let path = dir.path().join("ddpg_config.yaml");
        config.save(&path)?;
        let loaded: DdpgConfig<MlpConfig, MlpConfig> = DdpgConfig::load(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }
}
