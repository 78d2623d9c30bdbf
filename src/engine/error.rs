//! Error types for the entity–component–system registry.
//!
//! Every fallible registry operation returns [`ECSResult`]. The error enum is
//! deliberately flat: each variant models a single failure mode and carries
//! enough context (kind names, attribute names, handle families) to make the
//! failure actionable from a log line alone.
//!
//! ## Taxonomy
//! * **Definition errors:** [`ECSError::DuplicateKind`],
//!   [`ECSError::NameCollision`], [`ECSError::DuplicateName`].
//! * **Lookup errors:** [`ECSError::NoSuchComponent`],
//!   [`ECSError::UnknownAttribute`].
//! * **Precondition violations:** [`ECSError::PreconditionViolation`] is
//!   returned for any handle whose slot has been freed. Deleting an entity or
//!   component twice is reported this way rather than silently ignored.
//! * **Callback failures:** systems return `ECSResult<()>`; a callback can
//!   raise [`ECSError::SystemFailed`] and dispatch stops at the first error.
//!
//! ## Usage hints are not errors
//! Ambiguous single-owner and single-component lookups only emit a usage hint
//! (see [`ECSManager::usage_hints`]). They never surface here.
//!
//! ## Example
//! ```ignore
//! match ecs.single_component(entity, health) {
//!     Ok(component) => { /* … */ }
//!     Err(ECSError::NoSuchComponent { kind, .. }) => {
//!         eprintln!("entity has no {kind}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! [`ECSManager::usage_hints`]: crate::engine::manager::ECSManager::usage_hints

use thiserror::Error;

use crate::engine::types::HandleKind;


/// Result alias used by every registry operation.
pub type ECSResult<T> = Result<T, ECSError>;

/// Aggregate error for registry operations.
///
/// ### Display
/// `Display` messages are short and suitable for logs. `Debug` retains the
/// full structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ECSError {

    /// A component kind with this name is already defined.
    #[error("component kind '{name}' is already defined")]
    DuplicateKind {
        /// Declared kind name.
        name: String,
    },

    /// An attribute name collides with a reserved name or another attribute
    /// declared on the same kind.
    #[error("attribute name '{attribute}' on kind '{kind}' collides with {reason}")]
    NameCollision {
        /// Kind being defined.
        kind: String,

        /// Offending attribute name.
        attribute: String,

        /// What the name collided with.
        reason: &'static str,
    },

    /// A system or scene with this name is already registered.
    #[error("{registry} named '{name}' is already registered")]
    DuplicateName {
        /// Registry that rejected the name (`"system"` or `"scene"`).
        registry: &'static str,

        /// Requested name.
        name: String,
    },

    /// A single-component lookup found no component of the requested kind.
    #[error("entity has no components of kind '{kind}'")]
    NoSuchComponent {
        /// Requested kind name.
        kind: String,
    },

    /// An attribute that the kind does not declare was read, written or
    /// watched.
    #[error("kind '{kind}' has no attribute '{attribute}'")]
    UnknownAttribute {
        /// Kind name.
        kind: String,

        /// Requested attribute name.
        attribute: String,
    },

    /// A handle referred to a deleted (or never created) registry object.
    #[error("stale or deleted {0} handle")]
    PreconditionViolation(HandleKind),

    /// A system callback reported a failure.
    #[error("system '{system}' failed: {message}")]
    SystemFailed {
        /// Name of the failing system.
        system: String,

        /// Message supplied by the callback.
        message: String,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ECSError {

    /// Builds a callback failure; intended for use inside system callbacks.
    pub fn system_failed(system: impl Into<String>, message: impl Into<String>) -> Self {
        ECSError::SystemFailed { system: system.into(), message: message.into() }
    }

    /// Returns `true` if the error reports use of a stale handle.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, ECSError::PreconditionViolation(_))
    }
}

impl From<toml::de::Error> for ECSError {
    fn from(e: toml::de::Error) -> Self {
        ECSError::Config(e.to_string())
    }
}
