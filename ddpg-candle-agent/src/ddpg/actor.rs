//! Actor of the DDPG agent.
use crate::{
    model::SubModel1,
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
/// Configuration of [`Actor`].
pub struct ActorConfig<P: OutDim> {
    pi_config: Option<P>,
    opt_config: OptimizerConfig,
}

impl<P: OutDim> Default for ActorConfig<P> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::Adam { lr: 1e-4 },
        }
    }
}

impl<P> ActorConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the policy network.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets the output dimension of the policy network.
    pub fn out_dim(mut self, v: i64) -> Self {
        match &mut self.pi_config {
            None => {}
            Some(pi_config) => pi_config.set_out_dim(v),
        };
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`ActorConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Deterministic policy of the DDPG agent.
///
/// Maps an observation to a single action vector. Cloning an actor builds
/// a network of the same architecture and copies the parameter values into
/// it, which is how the target actor is initialized.
pub struct Actor<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    device: Device,
    varmap: VarMap,

    // Dimension of the action vector.
    out_dim: i64,

    // Policy network
    pi_config: P::Config,
    pi: P,

    // Optimizer
    opt_config: OptimizerConfig,
    opt: Optimizer,
}

impl<P> Actor<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`Actor`].
    pub fn build(config: ActorConfig<P::Config>, device: Device) -> Result<Actor<P>> {
        let pi_config = config.pi_config.context("pi_config is not set.")?;
        let out_dim = pi_config.get_out_dim();
        let varmap = VarMap::new();
        let pi = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, pi_config.clone())
        };
        let opt_config = config.opt_config;

        Self::_build(device, out_dim, opt_config, pi_config, pi, varmap, None)
    }

    fn _build(
        device: Device,
        out_dim: i64,
        opt_config: OptimizerConfig,
        pi_config: P::Config,
        pi: P,
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
            out_dim,
            opt_config,
            varmap,
            opt,
            pi,
            pi_config,
        })
    }

    /// Outputs an action batch given an observation batch.
    pub fn forward(&self, x: &P::Input) -> Tensor {
        let a = self.pi.forward(x);
        debug_assert_eq!(a.dims()[1], self.out_dim as usize);
        a
    }

    /// Runs a backward pass on `loss` and updates the policy network.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)?;
        Ok(())
    }

    /// Returns the variables of the policy network.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the dimension of the action vector.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }
}

impl<P> Clone for Actor<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn clone(&self) -> Self {
        let device = self.device.clone();
        let opt_config = self.opt_config.clone();
        let varmap = VarMap::new();
        let pi_config = self.pi_config.clone();
        let pi = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, pi_config.clone())
        };
        let out_dim = self.out_dim;

        Self::_build(
            device,
            out_dim,
            opt_config,
            pi_config,
            pi,
            varmap,
            Some(&self.varmap),
        )
        .expect("Failed to clone Actor")
    }
}
