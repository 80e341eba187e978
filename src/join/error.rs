use thiserror::Error;

/// Errors raised by the join subsystem.
#[derive(Debug, Error)]
pub enum CombineError {
    /// A join policy failed while combining the channel buffers. Fatal for
    /// the joiner instance: its buffers are left untouched and no further
    /// output is produced.
    #[error("join policy failed")]
    Policy(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A [`GroupBuffer`](super::GroupBuffer) observed the end marker with no
    /// value left to carry the last-group tag. Kept distinct from
    /// [`CombineError::Policy`] so callers can treat it as "no final output"
    /// rather than a hard failure, as
    /// [`RightAfterLeft`](super::RightAfterLeft) does.
    #[error("channel ended with no value to carry the last-group marker")]
    EmptyFinalGroup,
}

impl CombineError {
    /// Wraps an arbitrary error as a fatal policy failure.
    pub fn policy<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CombineError::Policy(err.into())
    }

    pub fn is_empty_final_group(&self) -> bool {
        matches!(self, CombineError::EmptyFinalGroup)
    }
}
