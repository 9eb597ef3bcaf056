//! Error types for routing, coercion and plugin discovery.
//!
//! None of these escape [`Router::dispatch`](crate::router::Router::dispatch):
//! the router logs them and reports the request as unhandled. They exist so
//! that each miss carries a reason that tests and logs can inspect.

use std::path::PathBuf;

use thiserror::Error;

use crate::handler::ParamType;

/// Why a path was not dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteRejection {
    /// Fewer segments than class + method (+ context).
    #[error("too few path components: found {found}, need at least {minimum}")]
    Incomplete { found: usize, minimum: usize },

    /// More than eight argument pairs.
    #[error("too many path components: found {found}, at most {maximum} allowed")]
    Excessive { found: usize, maximum: usize },

    /// The first segment is not this router's context.
    #[error("path context '{found}' does not match router context '{expected}'")]
    ContextMismatch { expected: String, found: String },

    /// The segments after class and method cannot be paired up.
    #[error("odd number of argument components ({count})")]
    OddArguments { count: usize },

    #[error("no handler registered for class '{0}'")]
    UnknownClass(String),

    #[error("class '{class}' has no method named '{method}'")]
    UnknownMethod { class: String, method: String },

    /// The method name exists but no overload takes exactly the supplied argument names.
    #[error("no overload of '{class}.{method}' accepts arguments {arguments:?}")]
    NoMatchingSignature {
        class: String,
        method: String,
        arguments: Vec<String>,
    },
}

impl RouteRejection {
    /// Structural problems with the path itself, as opposed to a lookup miss.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RouteRejection::Incomplete { .. }
                | RouteRejection::Excessive { .. }
                | RouteRejection::OddArguments { .. }
        )
    }
}

/// A path argument that could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{value}' to {expected} for parameter '{parameter}'")]
pub struct CoercionError {
    pub parameter: String,
    pub value: String,
    pub expected: ParamType,
}

/// Failures while locating or loading handler modules.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PluginError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid module manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The loader could not turn the module into handler instances.
    #[error("could not load module {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
}

impl PluginError {
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginError::Load {
            path: path.into(),
            message: message.into(),
        }
    }
}
