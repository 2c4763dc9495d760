//! Types for recording training metrics.
//!
//! [`Record`] is a container of key-value pairs produced during training and
//! evaluation, for example the critic and actor losses of an optimization
//! step. [`Recorder`] is the interface for writing records somewhere;
//! [`NullRecorder`] discards them.
//!
//! ```rust
//! use ddpg_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("loss_critic", RecordValue::Scalar(0.1));
//! record.insert("loss_actor", RecordValue::Scalar(-1.3));
//! assert_eq!(record.get_scalar("loss_critic").unwrap(), 0.1);
//! ```
mod base;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
