use std::error::Error;
use std::fmt;

use crate::score::EntityId;
use crate::store::StoreError;

/// Why an operation stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Cancelled,
    /// The caller's deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "cancelled"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Error type for ranking engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    /// The entity has no score on record.
    NotFound(EntityId),
    /// Talking to the score store failed.
    StoreUnavailable {
        operation: &'static str,
        source: StoreError,
    },
    /// The caller cancelled the operation or its deadline passed.
    Cancelled {
        operation: &'static str,
        reason: CancelReason,
    },
    /// Malformed request (negative offset, non-positive limit, ...).
    InvalidArgument(String),
}

impl fmt::Display for RankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankError::NotFound(id) => write!(f, "entity {} has no score", id),
            RankError::StoreUnavailable { operation, source } => {
                write!(f, "{} failed: {}", operation, source)
            }
            RankError::Cancelled { operation, reason } => {
                write!(f, "{} {}", operation, reason)
            }
            RankError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl Error for RankError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RankError::StoreUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl RankError {
    pub(crate) fn store(operation: &'static str, source: StoreError) -> Self {
        RankError::StoreUnavailable { operation, source }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            RankError::NotFound(_) => 404,
            RankError::InvalidArgument(_) => 400,
            RankError::StoreUnavailable { .. } => 503,
            RankError::Cancelled {
                reason: CancelReason::Cancelled,
                ..
            } => 499,
            RankError::Cancelled {
                reason: CancelReason::DeadlineExceeded,
                ..
            } => 504,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RankError::Cancelled { .. })
    }
}
