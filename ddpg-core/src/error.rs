//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum DdpgError {
    /// A batch of more transitions than currently stored was requested.
    ///
    /// This is a caller-avoidable precondition violation: check
    /// [`ExperienceBufferBase::len`](crate::ExperienceBufferBase::len) before
    /// sampling. The request is never silently truncated.
    #[error("requested a batch of {requested} transitions, but only {stored} are stored")]
    InsufficientSamples {
        /// Requested batch size.
        requested: usize,
        /// Number of transitions currently stored.
        stored: usize,
    },

    /// A reward could not be coerced to a finite scalar.
    #[error("malformed transition: {0}")]
    MalformedTransition(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
