//! Error types returned by every state-changing carver operation.

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, LqrError>;

/// Everything that can go wrong inside the carver.
///
/// Mirrors the OK/ERROR/NOMEM/USRCANCEL return taxonomy of the
/// underlying library: `Ok` stands for OK, `InvalidArgument` and
/// `InvalidState` stand for ERROR, `OutOfMemory` for NOMEM, and
/// `UserCancelled` for USRCANCEL.
#[derive(Debug, thiserror::Error)]
pub enum LqrError {
    /// A caller-supplied argument is out of range or inconsistent
    /// with the carver's current configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The carver is not in a state that allows this operation (for
    /// example, attaching to a carver that is mid-resize).
    #[error("invalid carver state for this operation: {0}")]
    InvalidState(String),

    /// A large allocation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// The running operation observed a cancellation request.
    #[error("operation cancelled by user")]
    UserCancelled,

    /// An invariant that should never be violated by correct callers
    /// was violated anyway.
    #[error("internal invariant violated: {0}")]
    Generic(String),
}

impl LqrError {
    /// True for [`LqrError::UserCancelled`]; callers that want to
    /// distinguish a cooperative cancellation from a real failure
    /// can match on this instead of the enum variant directly.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LqrError::UserCancelled)
    }
}

pub(crate) fn try_reserve_exact<T>(v: &mut Vec<T>, additional: usize) -> Result<()> {
    v.try_reserve_exact(additional).map_err(|_| LqrError::OutOfMemory)
}

/// Allocate a `Vec<T>` of `len` copies of `value`, reporting allocation
/// failure as [`LqrError::OutOfMemory`] instead of aborting the process.
/// Used for the large per-pixel buffers (`rgb`, `vs`, `en`, `m`, `least`)
/// that a caller might reasonably want to recover from failing to grow.
pub(crate) fn try_vec_filled<T: Clone>(value: T, len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    try_reserve_exact(&mut v, len)?;
    v.resize(len, value);
    Ok(v)
}
