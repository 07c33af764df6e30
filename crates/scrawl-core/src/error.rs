//! Error types for the editor core.

use crate::shapes::ShapeId;
use thiserror::Error;

/// Errors raised by the editor core.
///
/// These are configuration errors: they indicate a programming or
/// integration mistake (an unregistered shape kind, a transition to a state
/// that does not exist) rather than a recoverable runtime condition, and are
/// expected to surface to the host application. Transient geometric
/// invalidity (zero-size drags and the like) is clamped during validation
/// and never produces an error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A shape model referenced a kind with no registered behavior.
    #[error("no shape kind registered for type '{0}'")]
    UnregisteredShapeType(String),

    /// A state transition targeted an id that is not a direct child.
    #[error("state '{from}' has no child state '{target}'")]
    UnknownState { from: String, target: String },

    /// A transition was requested on a state with no children.
    #[error("state '{0}' has no child states to transition between")]
    NoChildStates(String),

    /// A shape id lookup failed where the shape was required to exist.
    #[error("shape '{0}' not found in document")]
    ShapeNotFound(ShapeId),

    /// A history patch failed to apply against the current document value.
    #[error("patch application failed: {0}")]
    Patch(String),
}

/// Convenience alias used throughout the core.
pub type Result<T> = std::result::Result<T, CoreError>;
