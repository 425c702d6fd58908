//! Intermediate Representation (IR)
//!
//! A typed, immutable rendition of a JVM class body in either the plain
//! three-address dialect (Jimple) or the SSA dialect (Shimple).
//!
//! # Structure
//!
//! - `IrClass` - Class header, field table and translated methods
//! - `IrMethod` - Signature, basic blocks and the two block-edge relations
//! - `BasicBlock` - Ordered statements with a stable label and index
//! - `Stmt` - One IR node per engine instruction
//! - `Expr` / `Value` - Composite operators and leaf operands

pub mod block;
pub mod class;
pub mod expr;
pub mod method;
pub mod modifier;
pub mod pretty;
pub mod stmt;
pub mod value;

pub use block::{BasicBlock, BlockIdx};
pub use class::{IrClass, IrField};
pub use expr::{Bootstrap, Expr, InvokeExpr, InvokeKind, MethodRef, Opcode, PhiArg};
pub use method::{EdgeMap, IrMethod};
pub use modifier::{decode_modifiers, render_attributes, Attribute};
pub use pretty::{strip_comments, PrettyPrint};
pub use stmt::{Label, Stmt, StmtKind};
pub use value::{FieldRef, Real, Value};
