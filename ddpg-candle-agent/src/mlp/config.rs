use crate::{util::OutDim, Activation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: i64,
    pub(super) units: Vec<i64>,
    pub(super) out_dim: i64,
    pub(super) out_activation: Activation,
}

impl MlpConfig {
    /// Creates configuration of an MLP.
    ///
    /// Hidden layers use ReLU; `out_activation` is applied to the final
    /// layer. An actor squashing actions into `[-1, 1]` uses
    /// [`Activation::Tanh`], while a critic producing unbounded action
    /// values uses [`Activation::None`].
    pub fn new(in_dim: i64, units: Vec<i64>, out_dim: i64, out_activation: Activation) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            out_activation,
        }
    }
}

impl OutDim for MlpConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}
