//! Kind Tables
//!
//! Engine runtime type names mapped onto closed enums. Every table is a plain
//! `match`: adding an engine kind means adding an arm, and anything not listed
//! is reported by the caller as a coverage gap.

use crate::ir::{InvokeKind, Opcode};
use std::borrow::Cow;

/// Leaf operand kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Local,
    ArrayRef,
    CaughtExceptionRef,
    InstanceFieldRef,
    ParamRef,
    ThisRef,
    StaticFieldRef,
    ClassConstant,
    DoubleConstant,
    FloatConstant,
    IntConstant,
    LongConstant,
    NullConstant,
    StringConstant,
}

impl ValueKind {
    /// Look up a normalized kind name (see [`normalize_value_kind`])
    pub fn from_engine(kind: &str) -> Option<Self> {
        let kind = match kind {
            "Local" => ValueKind::Local,
            "JArrayRef" => ValueKind::ArrayRef,
            "JCaughtExceptionRef" => ValueKind::CaughtExceptionRef,
            "JInstanceFieldRef" => ValueKind::InstanceFieldRef,
            "ParameterRef" => ValueKind::ParamRef,
            "ThisRef" => ValueKind::ThisRef,
            "StaticFieldRef" => ValueKind::StaticFieldRef,
            "ClassConstant" => ValueKind::ClassConstant,
            "DoubleConstant" => ValueKind::DoubleConstant,
            "FloatConstant" => ValueKind::FloatConstant,
            "IntConstant" => ValueKind::IntConstant,
            "LongConstant" => ValueKind::LongConstant,
            "NullConstant" => ValueKind::NullConstant,
            "StringConstant" => ValueKind::StringConstant,
            _ => return None,
        };
        Some(kind)
    }
}

/// Strip the dialect infix the engine puts in some operand class names
/// (`JimpleLocal` and `ShimpleLocal` are both `Local`).
pub fn normalize_value_kind(kind: &str) -> Cow<'_, str> {
    if kind.contains("Jimple") || kind.contains("Shimple") {
        Cow::Owned(kind.replace("Jimple", "").replace("Shimple", ""))
    } else {
        Cow::Borrowed(kind)
    }
}

/// Whether a normalized operand kind names a composite expression
pub fn is_expr_kind(normalized: &str) -> bool {
    normalized.ends_with("Expr")
}

/// Composite expression kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Binop(Opcode),
    Unop(Opcode),
    Condition(Opcode),
    Cast,
    Length,
    New,
    NewArray,
    NewMultiArray,
    InstanceOf,
    Phi,
    Invoke(InvokeKind),
}

impl ExprKind {
    pub fn from_engine(kind: &str) -> Option<Self> {
        let kind = match kind {
            "JCastExpr" => ExprKind::Cast,
            "JLengthExpr" => ExprKind::Length,
            "JNewExpr" => ExprKind::New,
            "JNewArrayExpr" => ExprKind::NewArray,
            "JNewMultiArrayExpr" => ExprKind::NewMultiArray,
            "JInstanceOfExpr" => ExprKind::InstanceOf,
            "SPhiExpr" => ExprKind::Phi,
            "JDynamicInvokeExpr" => ExprKind::Invoke(InvokeKind::Dynamic),
            "JInterfaceInvokeExpr" => ExprKind::Invoke(InvokeKind::Interface),
            "JSpecialInvokeExpr" => ExprKind::Invoke(InvokeKind::Special),
            "JStaticInvokeExpr" => ExprKind::Invoke(InvokeKind::Static),
            "JVirtualInvokeExpr" => ExprKind::Invoke(InvokeKind::Virtual),
            "JEqExpr" => ExprKind::Condition(Opcode::Eq),
            "JGeExpr" => ExprKind::Condition(Opcode::Ge),
            "JGtExpr" => ExprKind::Condition(Opcode::Gt),
            "JLeExpr" => ExprKind::Condition(Opcode::Le),
            "JLtExpr" => ExprKind::Condition(Opcode::Lt),
            "JNeExpr" => ExprKind::Condition(Opcode::Ne),
            "JNegExpr" => ExprKind::Unop(Opcode::Neg),
            "JAddExpr" => ExprKind::Binop(Opcode::Add),
            "JAndExpr" => ExprKind::Binop(Opcode::And),
            "JCmpExpr" => ExprKind::Binop(Opcode::Cmp),
            "JCmpgExpr" => ExprKind::Binop(Opcode::Cmpg),
            "JCmplExpr" => ExprKind::Binop(Opcode::Cmpl),
            "JDivExpr" => ExprKind::Binop(Opcode::Div),
            "JMulExpr" => ExprKind::Binop(Opcode::Mul),
            "JOrExpr" => ExprKind::Binop(Opcode::Or),
            "JRemExpr" => ExprKind::Binop(Opcode::Rem),
            "JShlExpr" => ExprKind::Binop(Opcode::Shl),
            "JShrExpr" => ExprKind::Binop(Opcode::Shr),
            "JSubExpr" => ExprKind::Binop(Opcode::Sub),
            "JUshrExpr" => ExprKind::Binop(Opcode::Ushr),
            "JXorExpr" => ExprKind::Binop(Opcode::Xor),
            _ => return None,
        };
        Some(kind)
    }
}

/// Instruction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Assign,
    Breakpoint,
    EnterMonitor,
    ExitMonitor,
    Goto,
    Identity,
    If,
    Invoke,
    LookupSwitch,
    Return,
    ReturnVoid,
    TableSwitch,
    Throw,
}

impl UnitKind {
    pub fn from_engine(kind: &str) -> Option<Self> {
        let kind = match kind {
            "JAssignStmt" => UnitKind::Assign,
            "JBreakpointStmt" => UnitKind::Breakpoint,
            "JEnterMonitorStmt" => UnitKind::EnterMonitor,
            "JExitMonitorStmt" => UnitKind::ExitMonitor,
            "JGotoStmt" => UnitKind::Goto,
            "JIdentityStmt" => UnitKind::Identity,
            "JIfStmt" => UnitKind::If,
            "JInvokeStmt" => UnitKind::Invoke,
            "JLookupSwitchStmt" => UnitKind::LookupSwitch,
            "JReturnStmt" => UnitKind::Return,
            "JReturnVoidStmt" => UnitKind::ReturnVoid,
            "JTableSwitchStmt" => UnitKind::TableSwitch,
            "JThrowStmt" => UnitKind::Throw,
            _ => return None,
        };
        Some(kind)
    }
}
