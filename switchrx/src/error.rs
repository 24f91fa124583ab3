use thiserror::Error;

/// Errors returned by the coalescer itself.
///
/// Failures of the pushed operations are never wrapped in this type. They are
/// delivered unchanged on the error output of the coalescer.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum CoalescerError {
    /// The coalescer was disposed, either explicitly or because its teardown
    /// signal fired. No further operations are started.
    #[error("coalescer was disposed")]
    Disposed,
}

impl CoalescerError {
    /// Returns true if this error reports a disposed coalescer.
    pub fn is_disposed(&self) -> bool {
        matches!(self, CoalescerError::Disposed)
    }
}
