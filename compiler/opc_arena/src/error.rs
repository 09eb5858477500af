//! Arena errors.

/// Failure of an arena operation. A failed operation changes nothing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// Storing `requested` bytes would push live usage past the quota.
    #[error("blob quota exceeded: {requested} more bytes requested with {used} of {quota} in use")]
    QuotaExceeded {
        requested: usize,
        used: usize,
        quota: usize,
    },
}
