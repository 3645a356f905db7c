//! One-shot holder for the latest non-retriable failure.
//!
//! Request managers that hit a failure no retry can fix park it here. A
//! dependent collects it on its own schedule with [`FatalErrorSlot::take`]
//! and reports it upward. Until collected, the error is only replaced by a
//! newer fatal error.

use super::error::ClientError;

/// Single-slot fatal error holder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FatalErrorSlot {
    error: Option<ClientError>,
}

impl FatalErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `error`, returning the one it replaced.
    pub fn set(&mut self, error: ClientError) -> Option<ClientError> {
        self.error.replace(error)
    }

    /// Look at the error without clearing it.
    #[inline]
    pub fn peek(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    /// Collect the error, leaving the slot empty.
    #[inline]
    pub fn take(&mut self) -> Option<ClientError> {
        self.error.take()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.error.is_some()
    }
}
