//! Lifting errors

use crate::engine::UnitId;
use crate::ir::Label;
use std::path::PathBuf;
use thiserror::Error;

pub type LiftResult<T> = Result<T, LiftError>;

/// Fatal translation errors.
///
/// None of these are retried: a closed-table miss cannot succeed on a second
/// attempt, and malformed engine input stays malformed.
#[derive(Debug, Error)]
pub enum LiftError {
    #[error("Unsupported value type {kind}")]
    UnsupportedValue { kind: String },

    #[error("Unsupported expression type {kind}")]
    UnsupportedExpr { kind: String },

    #[error("Statement type {kind} is not supported")]
    UnsupportedStmt { kind: String },

    #[error("Unrecognized modifier bits {bits:#x}")]
    UnknownModifier { bits: u32 },

    #[error("{kind} is missing its {operand} operand")]
    MissingOperand { kind: String, operand: &'static str },

    #[error("{kind} expected {expected} operand")]
    UnexpectedOperand { kind: String, expected: &'static str },

    #[error("Unit {unit} is referenced but is not part of the method body")]
    UnknownUnit { unit: UnitId },

    #[error("Unit {unit} appears more than once in the method body")]
    DuplicateUnit { unit: UnitId },

    #[error("Block {block} does not exist (method has {count} blocks)")]
    UnknownBlock { block: usize, count: usize },

    #[error("Block {block} has no units")]
    EmptyBlock { block: usize },

    #[error("Phi expression outside of an assignment right-hand side")]
    MisplacedPhi,

    #[error("Phi expression at label {label} in a non-SSA dialect")]
    PhiOutsideSsa { label: Label },

    #[error("Phi argument at label {label} comes from unit {unit}, which belongs to no block")]
    UnresolvedPhiSource { label: Label, unit: UnitId },

    #[error("Class {class} has no superclass")]
    MissingSuperclass { class: String },

    #[error("Unknown class {name}")]
    UnknownClass { name: String },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration errors, raised before any translation work begins.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("ir_format needs to be in {allowed:?}, got {value:?}")]
    UnsupportedIrFormat {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("input_format needs to be in {allowed:?}, got {value:?}")]
    UnsupportedInputFormat {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("when input_format is apk, android_sdk should point to something like ~/Android/Sdk/platforms")]
    MissingAndroidSdk,

    #[error("these jars contain the classpath separator {separator:?} in their path: {paths:?}")]
    SeparatorInJarPath { separator: char, paths: Vec<PathBuf> },

    #[error("program was produced in {program} but the lifter is configured for {configured}")]
    DialectMismatch {
        configured: &'static str,
        program: &'static str,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
