#![warn(missing_docs)]
//! DDPG agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! The main entry point is [`Ddpg`](ddpg::Ddpg), a deterministic actor-critic
//! agent for continuous action spaces. The actor and critic networks are
//! generic over [`SubModel1`](model::SubModel1) and
//! [`SubModel2`](model::SubModel2), for which a multilayer perceptron
//! implementation is provided in [`mlp`].
pub mod ddpg;
pub mod mlp;
pub mod model;
pub mod opt;
mod tensor_batch;
pub mod util;
use serde::{Deserialize, Serialize};
pub use tensor_batch::TensorBatch;

/// Device on which tensors of the agent are placed.
///
/// This is a serializable mirror of [`candle_core::Device`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Device {
    /// The main CPU.
    Cpu,

    /// The main GPU.
    Cuda(usize),
}

impl From<candle_core::Device> for Device {
    fn from(device: candle_core::Device) -> Self {
        match device {
            candle_core::Device::Cpu => Self::Cpu,
            candle_core::Device::Cuda(_) => Self::Cuda(0),
            _ => panic!("Unsupported device: {:?}", device),
        }
    }
}

impl From<Device> for candle_core::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => Self::Cpu,
            Device::Cuda(n) => {
                Self::new_cuda(n).expect("Failed to create a candle cuda device")
            }
        }
    }
}

/// Activation function at the output of a network layer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Activation {
    /// No activation, the identity function.
    None,

    /// Rectified linear unit.
    ReLU,

    /// Hyperbolic tangent, squashing outputs into `[-1, 1]`.
    Tanh,
}

impl Activation {
    /// Applies the activation to a tensor.
    pub fn forward(&self, xs: &candle_core::Tensor) -> candle_core::Result<candle_core::Tensor> {
        match self {
            Activation::None => Ok(xs.clone()),
            Activation::ReLU => xs.relu(),
            Activation::Tanh => xs.tanh(),
        }
    }
}
