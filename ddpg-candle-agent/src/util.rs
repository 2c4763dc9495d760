//! Utilities for tensors and network parameters.
use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor, WithDType};
use candle_nn::VarMap;
use ddpg_core::DdpgError;
use ndarray::ArrayD;
use num_traits::AsPrimitive;

/// Returns the dimension of the output vectors of a neural network.
pub trait OutDim {
    /// Returns the dimension of the output vectors of a neural network.
    fn get_out_dim(&self) -> i64;

    /// Sets the  dimension of the output vectors of a neural network.
    fn set_out_dim(&mut self, v: i64);
}

/// Moves the variables in `dest` towards those in `src` by the Polyak
/// coefficient `tau`.
///
/// For each variable, `dest = tau * src + (1 - tau) * dest`. Both maps
/// must contain variables of identical names and shapes.
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    let src = src.data().lock().unwrap();
    let dest = dest.data().lock().unwrap();
    debug_assert_eq!(src.len(), dest.len());

    for (name, v_src) in src.iter() {
        let v_dest = dest
            .get(name)
            .ok_or_else(|| anyhow!("missing variable {name} in the target network"))?;
        let t_src = v_src.as_tensor().detach();
        let t_dest = v_dest.as_tensor().detach();
        let t_dest = ((t_src * tau)? + (t_dest * (1.0 - tau))?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Copies the values of the variables in `src` into `dest`.
///
/// Used to initialize a target network with the exact parameters of its
/// source network.
pub fn copy(dest: &VarMap, src: &VarMap) -> Result<()> {
    let src = src.data().lock().unwrap();
    let dest = dest.data().lock().unwrap();
    debug_assert_eq!(src.len(), dest.len());

    for (name, v_src) in src.iter() {
        let v_dest = dest
            .get(name)
            .ok_or_else(|| anyhow!("missing variable {name} in the target network"))?;
        v_dest.set(&v_src.as_tensor().detach())?;
    }

    Ok(())
}

/// Converts a batch of scalar rewards into a column tensor of shape
/// `(batch_size, 1)`.
///
/// Fails with [`DdpgError::MalformedTransition`] if any reward is not
/// finite.
pub fn reward_batch(rewards: &[f32], device: &Device) -> Result<Tensor> {
    if let Some(r) = rewards.iter().find(|r| !r.is_finite()) {
        return Err(DdpgError::MalformedTransition(format!(
            "non-finite reward {r} in a sampled batch"
        ))
        .into());
    }
    Ok(Tensor::from_slice(rewards, (rewards.len(), 1), device)?)
}

/// Converts termination flags into a column tensor of `1 - is_terminated`
/// of shape `(batch_size, 1)`.
///
/// Truncated episodes are not masked, so the value of the next observation
/// is still bootstrapped after a time limit.
pub fn not_done(is_terminated: &[i8], device: &Device) -> Result<Tensor> {
    let v = is_terminated
        .iter()
        .map(|e| 1f32 - *e as f32)
        .collect::<Vec<_>>();
    Ok(Tensor::from_vec(v, (is_terminated.len(), 1), device)?)
}

/// Converts [`ndarray::ArrayD`] into [`Tensor`] on the CPU.
///
/// The first dimension of the array is interpreted as the batch dimension
/// unless `add_batch_dim` is `true`, in which case a batch dimension of
/// size one is prepended.
pub fn arrayd_to_tensor<T1, T2>(a: ArrayD<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let shape = a.shape().to_vec();
    let data = a.iter().map(|e| e.as_()).collect::<Vec<T2>>();
    let t = Tensor::from_vec(data, shape, &Device::Cpu)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

/// Converts [`Tensor`] into [`ndarray::ArrayD`].
///
/// If `delete_batch_dim` is `true`, the first dimension of the tensor is
/// dropped from the shape of the resulting array.
pub fn tensor_to_arrayd<T>(t: Tensor, delete_batch_dim: bool) -> Result<ArrayD<T>>
where
    T: WithDType + Clone,
{
    let shape = match delete_batch_dim {
        false => t.dims().to_vec(),
        true => t.dims()[1..].to_vec(),
    };
    let v = t.to_dtype(T::DTYPE)?.flatten_all()?.to_vec1::<T>()?;
    Ok(ArrayD::from_shape_vec(ndarray::IxDyn(&shape), v)?)
}

/// Converts a flat vector into a [`Tensor`] on the CPU.
pub fn vec_to_tensor<T1, T2>(v: Vec<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let data = v.iter().map(|e| e.as_()).collect::<Vec<T2>>();
    let len = data.len();
    let t = Tensor::from_vec(data, len, &Device::Cpu)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::Init;

    fn const_varmap(value: f64) -> Result<VarMap> {
        let varmap = VarMap::new();
        let _ = varmap.get((2, 3), "w", Init::Const(value), DType::F32, &Device::Cpu)?;
        Ok(varmap)
    }

    fn values(varmap: &VarMap) -> Vec<f32> {
        let data = varmap.data().lock().unwrap();
        data.get("w")
            .unwrap()
            .as_tensor()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap()
    }

    #[test]
    fn test_track_interpolates_towards_src() -> Result<()> {
        let src = const_varmap(1.0)?;
        let dest = const_varmap(0.0)?;

        track(&dest, &src, 0.1)?;

        for v in values(&dest) {
            assert!((v - 0.1).abs() < 1e-6);
        }
        for v in values(&src) {
            assert!((v - 1.0).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_track_with_tau_one_copies_src() -> Result<()> {
        let src = const_varmap(0.5)?;
        let dest = const_varmap(-2.0)?;

        track(&dest, &src, 1.0)?;

        for v in values(&dest) {
            assert!((v - 0.5).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_copy_is_exact() -> Result<()> {
        let src = const_varmap(0.25)?;
        let dest = const_varmap(7.0)?;

        copy(&dest, &src)?;

        assert_eq!(values(&dest), values(&src));
        Ok(())
    }

    #[test]
    fn test_reward_batch_rejects_non_finite() {
        let rewards = vec![0.5, f32::NAN, 1.0];
        let result = reward_batch(&rewards, &Device::Cpu);
        let err = result.expect_err("non-finite reward must be rejected");
        assert!(matches!(
            err.downcast_ref::<DdpgError>(),
            Some(DdpgError::MalformedTransition(_))
        ));
    }

    #[test]
    fn test_not_done_masks_terminated() -> Result<()> {
        let t = not_done(&[0, 1, 0], &Device::Cpu)?;
        assert_eq!(t.dims(), &[3, 1]);
        assert_eq!(t.flatten_all()?.to_vec1::<f32>()?, vec![1.0, 0.0, 1.0]);
        Ok(())
    }
}
