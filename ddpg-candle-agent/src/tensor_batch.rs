//! A [`SubBatch`] backed by a [`Tensor`].
use candle_core::{Device, IndexOp, Tensor};
use ddpg_core::replay_buffer::SubBatch;

/// A slab of stacked observations or actions stored as a single [`Tensor`].
///
/// The first dimension of the tensor is the row index; the remaining
/// dimensions are the shape of a single observation or action. The tensor is
/// allocated lazily at the first push, when the row shape and dtype become
/// known.
#[derive(Clone, Debug)]
pub struct TensorBatch {
    buf: Option<Tensor>,
    capacity: usize,
}

impl TensorBatch {
    /// Wraps an existing tensor, whose first dimension becomes the capacity.
    pub fn from_tensor(t: Tensor) -> Self {
        let capacity = t.dims()[0];
        Self {
            buf: Some(t),
            capacity,
        }
    }

    /// Moves the underlying tensor to the given device.
    pub fn to(&mut self, device: &Device) -> candle_core::Result<()> {
        if let Some(buf) = &self.buf {
            self.buf = Some(buf.to_device(device)?);
        }
        Ok(())
    }
}

impl SubBatch for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: None,
            capacity,
        }
    }

    fn push(&mut self, ix: usize, data: Self) {
        let data = match data.buf {
            Some(data) => data,
            None => return,
        };
        let n_rows = data.dims()[0];
        if n_rows == 0 {
            return;
        }

        if self.buf.is_none() {
            let mut shape = data.dims().to_vec();
            shape[0] = self.capacity;
            self.buf = Some(
                Tensor::zeros(shape, data.dtype(), &Device::Cpu)
                    .expect("Failed to allocate the tensor slab"),
            );
        }
        let buf = self.buf.as_mut().unwrap();

        if ix + n_rows > self.capacity {
            // Wrap around the end of the slab
            let n_head = self.capacity - ix;
            let head = data.i((..n_head,)).unwrap();
            let tail = data.i((n_head..,)).unwrap();
            buf.slice_set(&head, 0, ix).unwrap();
            buf.slice_set(&tail, 0, 0).unwrap();
        } else {
            buf.slice_set(&data, 0, ix).unwrap();
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let buf = self.buf.as_ref().expect("Sampled from an empty slab");
        let ixs = {
            let ixs: Vec<u32> = ixs.iter().map(|ix| *ix as u32).collect();
            let n = ixs.len();
            Tensor::from_vec(ixs, n, buf.device()).unwrap()
        };
        Self {
            capacity: ixs.dims()[0],
            buf: Some(buf.index_select(&ixs, 0).unwrap()),
        }
    }
}

impl From<TensorBatch> for Tensor {
    fn from(b: TensorBatch) -> Self {
        b.buf.expect("Converted an empty TensorBatch into a Tensor")
    }
}
