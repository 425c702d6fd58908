//! Engine Contract
//!
//! The bytecode-analysis engine runs outside this crate. It hands over each
//! class already decomposed into basic blocks, and this module is the shape of
//! that hand-over: plain data, usually deserialized from a JSON dump.
//!
//! Units (instructions) are identified by an engine-assigned [`UnitId`]
//! handle rather than by structure, so two identical instructions at different
//! program points stay distinct. Blocks refer to each other by their position
//! in [`RawBody::blocks`].

pub mod kind;

pub use kind::{is_expr_kind, normalize_value_kind, ExprKind, UnitKind, ValueKind};

use crate::config::IrFormat;
use crate::error::{LiftError, LiftResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine handle of a single unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Everything the engine produced for one input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    /// Dialect the engine was run in
    #[serde(default)]
    pub ir_format: IrFormat,
    /// Classes in engine order
    #[serde(default)]
    pub classes: Vec<RawClass>,
}

impl Program {
    /// Parse an engine dump
    pub fn from_json(content: &str) -> LiftResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read an engine dump from disk
    pub fn from_file(path: &Path) -> LiftResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LiftError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn class(&self, name: &str) -> Option<&RawClass> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClass {
    pub name: String,
    /// `None` only for the root object type (or a broken engine)
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub modifiers: u32,
    /// Whether the full code of the class is available
    #[serde(default = "default_true")]
    pub application: bool,
    #[serde(default)]
    pub library: bool,
    #[serde(default)]
    pub java_library: bool,
    #[serde(default)]
    pub phantom: bool,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub modifiers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMethod {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub return_type: String,
    #[serde(default)]
    pub modifiers: u32,
    #[serde(default)]
    pub exceptions: Vec<String>,
    /// `None` for methods without an executable body
    #[serde(default)]
    pub body: Option<RawBody>,
}

/// A method body as the engine's exceptional block graph sees it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBody {
    /// All units, in body order
    pub units: Vec<RawUnit>,
    /// Basic blocks, in graph iteration order
    pub blocks: Vec<RawBlock>,
}

impl RawBody {
    pub fn unit(&self, id: UnitId) -> Option<&RawUnit> {
        self.units.iter().find(|u| u.id == id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBlock {
    /// Units in execution order; the first one is the head
    pub units: Vec<UnitId>,
    /// Normal successors
    #[serde(default)]
    pub succs: Vec<usize>,
    /// Blocks reaching this one only through an exception-handler edge
    #[serde(default)]
    pub exceptional_preds: Vec<usize>,
}

/// One engine instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUnit {
    pub id: UnitId,
    pub kind: String,
    #[serde(default)]
    pub left: Option<RawValue>,
    #[serde(default)]
    pub right: Option<RawValue>,
    /// Monitor object, returned value, thrown value
    #[serde(default)]
    pub op: Option<RawValue>,
    #[serde(default)]
    pub condition: Option<RawValue>,
    #[serde(default)]
    pub invoke: Option<RawValue>,
    /// Switch key
    #[serde(default)]
    pub key: Option<RawValue>,
    #[serde(default)]
    pub target: Option<UnitId>,
    #[serde(default)]
    pub targets: Vec<UnitId>,
    #[serde(default)]
    pub default_target: Option<UnitId>,
    #[serde(default)]
    pub lookup_values: Vec<i32>,
    #[serde(default)]
    pub low_index: Option<i32>,
    #[serde(default)]
    pub high_index: Option<i32>,
}

impl RawUnit {
    /// A unit of the given kind with every slot empty
    pub fn new(id: UnitId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            left: None,
            right: None,
            op: None,
            condition: None,
            invoke: None,
            key: None,
            target: None,
            targets: Vec::new(),
            default_target: None,
            lookup_values: Vec::new(),
            low_index: None,
            high_index: None,
        }
    }

    pub(crate) fn require<'a, T>(&self, slot: Option<&'a T>, operand: &'static str) -> LiftResult<&'a T> {
        slot.ok_or_else(|| LiftError::MissingOperand {
            kind: self.kind.clone(),
            operand,
        })
    }
}

/// Constant payload of a constant operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawConstant {
    Int(i64),
    Real(f64),
    Text(String),
}

/// Field reference as `(name, declaring class)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFieldRef {
    pub name: String,
    pub declaring_class: String,
}

/// Called method signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMethodRef {
    pub declaring_class: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

/// Phi argument: a value and the unit that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPhiArg {
    pub value: RawValue,
    pub unit: UnitId,
}

/// One engine operand or expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawValue {
    pub kind: String,
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<RawConstant>,
    #[serde(default)]
    pub param_index: Option<u32>,
    #[serde(default)]
    pub field: Option<RawFieldRef>,
    /// Array base, field base or invoke receiver
    #[serde(default)]
    pub base: Option<Box<RawValue>>,
    /// Array index
    #[serde(default)]
    pub index: Option<Box<RawValue>>,
    #[serde(default)]
    pub op1: Option<Box<RawValue>>,
    #[serde(default)]
    pub op2: Option<Box<RawValue>>,
    /// Single operand of unary, cast, length and instanceof expressions
    #[serde(default)]
    pub op: Option<Box<RawValue>>,
    #[serde(default)]
    pub cast_type: Option<String>,
    #[serde(default)]
    pub check_type: Option<String>,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub size: Option<Box<RawValue>>,
    #[serde(default)]
    pub sizes: Vec<RawValue>,
    #[serde(default)]
    pub method: Option<RawMethodRef>,
    #[serde(default)]
    pub args: Vec<RawValue>,
    #[serde(default)]
    pub bootstrap_method: Option<RawMethodRef>,
    #[serde(default)]
    pub bootstrap_args: Vec<RawValue>,
    #[serde(default)]
    pub phi_args: Vec<RawPhiArg>,
}

impl RawValue {
    /// An operand of the given kind and type with every slot empty
    pub fn new(kind: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ty: ty.into(),
            name: None,
            value: None,
            param_index: None,
            field: None,
            base: None,
            index: None,
            op1: None,
            op2: None,
            op: None,
            cast_type: None,
            check_type: None,
            base_type: None,
            size: None,
            sizes: Vec::new(),
            method: None,
            args: Vec::new(),
            bootstrap_method: None,
            bootstrap_args: Vec::new(),
            phi_args: Vec::new(),
        }
    }

    pub(crate) fn require<'a, T: ?Sized>(
        &self,
        slot: Option<&'a T>,
        operand: &'static str,
    ) -> LiftResult<&'a T> {
        slot.ok_or_else(|| LiftError::MissingOperand {
            kind: self.kind.clone(),
            operand,
        })
    }
}
