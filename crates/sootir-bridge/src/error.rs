//! Bridge error types.

use sootir::LiftError;

/// Errors raised while serving a session.
///
/// Only `Io` and `Json` on the transport itself end a session; everything
/// else is reported to the peer as a failed frame.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Transport or pickle-file I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Malformed frame or unserializable result
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Lifting or configuration error
    #[error("{0}")]
    Lift(#[from] LiftError),

    /// An operation arrived before `__init__`
    #[error("No lifter instance; send __init__ first")]
    NoInstance,

    #[error("Unknown operation {op}")]
    UnknownOp { op: String },

    #[error("Operation {op} needs a string argument {name}")]
    MissingArgument { op: String, name: &'static str },
}
