//! Sootir bridge
//!
//! Serves lifted IR to a peer runtime over a line-delimited JSON session:
//! `__init__` builds a lifter from a configuration and an engine dump, later
//! requests query the lifted classes, and `__exit` ends the session.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod protocol;
pub mod session;

pub use error::BridgeError;
pub use protocol::{ContainerKind, Frame, Request, TransportOptions};
pub use session::Session;
