//! Binding errors

/// Errors raised while resolving, binding or releasing companions.
///
/// All of these are configuration or programming errors; unbinding a target
/// that was never bound is not an error and never produces one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// A companion registered under the expected path targets another type.
    /// Usually a stale artifact or a flattening collision.
    #[error("Unable to find binding constructor for {type_name}: {companion} binds {found}")]
    SignatureMismatch {
        type_name: String,
        companion: String,
        found: String,
    },

    /// Neither the type nor any ancestor below the framework boundary has a companion
    #[error("No theme binding for {0}; does it have any bound fields?")]
    NoBinding(String),

    /// The companion's target reference was already cleared
    #[error("Bindings already cleared: {0}")]
    AlreadyCleared(String),

    #[error("Target type mismatch: expected {expected}, found {found}")]
    TargetMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The parent chain of a type does not reach the companion's target type
    #[error("Ancestor chain of {0} does not reach the companion's target type")]
    BrokenAncestry(String),
}
