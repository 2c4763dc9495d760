use super::{Record, Recorder};

/// A recorder that ignores any record. Useful for tests.
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    /// Discards the given record.
    fn write(&mut self, _record: Record) {}
}
