//! Tagged capability handles
//!
//! A capability is either a live component or an inert stand-in carrying
//! the reason it is unavailable. There is no third state: lookups always
//! produce a value callers can hold, and only `require` turns absence
//! into an error.

use std::sync::Arc;

use crate::error::{Error, Result};

/// A runtime capability: live, or a stand-in with a reason.
pub enum Capability<T: ?Sized> {
    /// The component is live and usable
    Available(Arc<T>),
    /// The component is missing; operations on it must fail with
    /// `CapabilityUnavailable`
    Unavailable {
        /// Why the component is unavailable
        reason: String,
    },
}

impl<T: ?Sized> Capability<T> {
    /// Wrap a live component.
    #[must_use]
    pub fn available(value: Arc<T>) -> Self {
        Self::Available(value)
    }

    /// Build a stand-in.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the capability is live. Stand-ins answer `false`,
    /// which is the `is_mock` signal of the stand-in contract.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// The unavailability reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }

    /// Borrow the live component or fail with `CapabilityUnavailable`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityUnavailable`] for stand-ins.
    pub fn require(&self, name: &str) -> Result<Arc<T>> {
        match self {
            Self::Available(value) => Ok(Arc::clone(value)),
            Self::Unavailable { reason } => Err(Error::capability(name, reason.clone())),
        }
    }

    /// The live component, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        match self {
            Self::Available(value) => Some(Arc::clone(value)),
            Self::Unavailable { .. } => None,
        }
    }
}

impl<T: ?Sized> Clone for Capability<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Available(value) => Self::Available(Arc::clone(value)),
            Self::Unavailable { reason } => Self::Unavailable {
                reason: reason.clone(),
            },
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(_) => f.write_str("Capability::Available"),
            Self::Unavailable { reason } => write!(f, "Capability::Unavailable({reason})"),
        }
    }
}
