//! Sootir: typed Jimple/Shimple IR for JVM classes
//!
//! An external bytecode-analysis engine decomposes each class into basic
//! blocks; this crate turns that output into an immutable, serializable IR
//! in either the three-address dialect (Jimple) or the SSA dialect (Shimple),
//! and renders it as canonical text.
//!
//! # Modules
//!
//! - `engine` - The engine hand-over format
//! - `ir` - The IR data model and renderer
//! - `lower` - Engine output to IR translation
//! - `config` / `lifter` - Configuration and the lifting entry point
//! - `hierarchy` - Subclass queries

#![warn(rust_2018_idioms)]

pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod ir;
pub mod lifter;
pub mod lower;

pub use config::{InputFormat, IrFormat, LifterConfig};
pub use engine::Program;
pub use error::{LiftError, LiftResult, ParameterError};
pub use hierarchy::Hierarchy;
pub use ir::{IrClass, IrMethod, PrettyPrint};
pub use lifter::{load_classes, save_classes, ClassMap, Lifter};
pub use lower::Lowerer;
