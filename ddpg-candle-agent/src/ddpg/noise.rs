//! Ornstein-Uhlenbeck exploration noise.
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use serde::{Deserialize, Serialize};

/// Configuration of [`OuNoise`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OuNoiseConfig {
    /// Long-run mean of the process.
    pub mu: f64,

    /// Speed of mean reversion.
    pub theta: f64,

    /// Scale of the Gaussian increments.
    pub sigma: f64,
}

impl Default for OuNoiseConfig {
    fn default() -> Self {
        Self {
            mu: 0.0,
            theta: 0.15,
            sigma: 0.1,
        }
    }
}

impl OuNoiseConfig {
    /// Sets the long-run mean of the process.
    pub fn mu(mut self, v: f64) -> Self {
        self.mu = v;
        self
    }

    /// Sets the speed of mean reversion.
    pub fn theta(mut self, v: f64) -> Self {
        self.theta = v;
        self
    }

    /// Sets the scale of the Gaussian increments.
    pub fn sigma(mut self, v: f64) -> Self {
        self.sigma = v;
        self
    }
}

/// Temporally correlated noise for exploration in continuous action spaces.
///
/// The internal state follows the discretized Ornstein-Uhlenbeck process
/// `x += theta * (mu - x) + sigma * N(0, 1)` and is carried across calls,
/// so consecutive samples are correlated.
pub struct OuNoise {
    config: OuNoiseConfig,
    state: Tensor,
}

impl OuNoise {
    /// Creates a noise process over action vectors of dimension `dim`.
    pub fn new(config: OuNoiseConfig, dim: usize, device: &Device) -> Result<Self> {
        let state = Tensor::zeros((1, dim), DType::F32, device)?;
        Ok(Self { config, state })
    }

    /// Advances the process by one step and returns the new state.
    pub fn sample(&mut self) -> Result<Tensor> {
        let drift = (self.state.affine(-1.0, self.config.mu)? * self.config.theta)?;
        let diffusion = (self.state.randn_like(0.0, 1.0)? * self.config.sigma)?;
        self.state = ((&self.state + drift)? + diffusion)?;
        Ok(self.state.clone())
    }

    /// Resets the state to zero.
    pub fn reset(&mut self) -> Result<()> {
        self.state = self.state.zeros_like()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_reversion_without_diffusion() -> Result<()> {
        let config = OuNoiseConfig::default().mu(1.0).theta(0.5).sigma(0.0);
        let mut noise = OuNoise::new(config, 2, &Device::Cpu)?;

        // Without diffusion the state converges monotonically towards mu
        let mut prev = 0f32;
        for _ in 0..10 {
            let x = noise.sample()?.flatten_all()?.to_vec1::<f32>()?[0];
            assert!(x > prev);
            assert!(x <= 1.0);
            prev = x;
        }
        assert!((prev - 1.0).abs() < 1e-2);
        Ok(())
    }

    #[test]
    fn test_reset_zeroes_the_state() -> Result<()> {
        let mut noise = OuNoise::new(OuNoiseConfig::default(), 3, &Device::Cpu)?;
        let _ = noise.sample()?;
        noise.reset()?;
        let state = noise.sample()?;
        assert_eq!(state.dims(), &[1, 3]);
        Ok(())
    }
}
