//! Critic of the DDPG agent.
use crate::{
    model::SubModel2,
    opt::{Optimizer, OptimizerConfig},
    util::{self, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Critic`].
pub struct CriticConfig<Q: OutDim> {
    q_config: Option<Q>,
    opt_config: OptimizerConfig,
}

impl<Q: OutDim> Default for CriticConfig<Q> {
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::Adam { lr: 1e-3 },
        }
    }
}

impl<Q> CriticConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the action-value network.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`CriticConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CriticConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function of the DDPG agent.
///
/// Maps an observation-action pair to a scalar action value. Cloning a
/// critic builds a network of the same architecture and copies the
/// parameter values into it, which is how the target critic is initialized.
pub struct Critic<Q>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    device: Device,
    varmap: VarMap,

    // Action-value network
    q_config: Q::Config,
    q: Q,

    // Optimizer
    opt_config: OptimizerConfig,
    opt: Optimizer,
}

impl<Q> Critic<Q>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`Critic`].
    pub fn build(config: CriticConfig<Q::Config>, device: Device) -> Result<Critic<Q>> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config.clone())
        };
        let opt_config = config.opt_config;

        Self::_build(device, opt_config, q_config, q, varmap, None)
    }

    fn _build(
        device: Device,
        opt_config: OptimizerConfig,
        q_config: Q::Config,
        q: Q,
        varmap: VarMap,
        varmap_src: Option<&VarMap>,
    ) -> Result<Self> {
        let opt = opt_config.build(varmap.all_vars())?;

        // Copy the parameter values of the source network
        if let Some(varmap_src) = varmap_src {
            util::copy(&varmap, varmap_src)?;
        }

        Ok(Self {
            device,
            opt_config,
            varmap,
            opt,
            q,
            q_config,
        })
    }

    /// Outputs a batch of action values given batches of observations and
    /// actions.
    pub fn forward(&self, obs: &Q::Input1, act: &Q::Input2) -> Tensor {
        self.q.forward(obs, act)
    }

    /// Runs a backward pass on `loss` and updates the action-value network.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)?;
        Ok(())
    }

    /// Returns the variables of the action-value network.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl<Q> Clone for Critic<Q>
where
    Q: SubModel2<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn clone(&self) -> Self {
        let device = self.device.clone();
        let opt_config = self.opt_config.clone();
        let varmap = VarMap::new();
        let q_config = self.q_config.clone();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config.clone())
        };

        Self::_build(device, opt_config, q_config, q, varmap, Some(&self.varmap))
            .expect("Failed to clone Critic")
    }
}
