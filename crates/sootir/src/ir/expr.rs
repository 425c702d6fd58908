//! IR Expressions
//!
//! Composite, value-producing operators built on [`Value`].

use super::block::BlockIdx;
use super::value::Value;
use serde::{Deserialize, Serialize};

/// Canonical lower-case operator opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opcode {
    // Conditions
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Ne,

    // Unary
    Neg,

    // Binary
    Add,
    And,
    Cmp,
    Cmpg,
    Cmpl,
    Div,
    Mul,
    Or,
    Rem,
    Shl,
    Shr,
    Sub,
    Ushr,
    Xor,
}

impl Opcode {
    /// Canonical opcode name
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Eq => "eq",
            Opcode::Ge => "ge",
            Opcode::Gt => "gt",
            Opcode::Le => "le",
            Opcode::Lt => "lt",
            Opcode::Ne => "ne",
            Opcode::Neg => "neg",
            Opcode::Add => "add",
            Opcode::And => "and",
            Opcode::Cmp => "cmp",
            Opcode::Cmpg => "cmpg",
            Opcode::Cmpl => "cmpl",
            Opcode::Div => "div",
            Opcode::Mul => "mul",
            Opcode::Or => "or",
            Opcode::Rem => "rem",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::Sub => "sub",
            Opcode::Ushr => "ushr",
            Opcode::Xor => "xor",
        }
    }

    /// Human-readable operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Opcode::Eq => "==",
            Opcode::Ge => ">=",
            Opcode::Gt => ">",
            Opcode::Le => "<=",
            Opcode::Lt => "<",
            Opcode::Ne => "!=",
            Opcode::Neg => "-",
            Opcode::Add => "+",
            Opcode::And => "&",
            Opcode::Cmp => "cmp",
            Opcode::Cmpg => "cmpg",
            Opcode::Cmpl => "cmpl",
            Opcode::Div => "/",
            Opcode::Mul => "*",
            Opcode::Or => "|",
            Opcode::Rem => "%",
            Opcode::Shl => "<<",
            Opcode::Shr => ">>",
            Opcode::Sub => "-",
            Opcode::Ushr => ">>>",
            Opcode::Xor => "^",
        }
    }

    /// Check if this is a comparison producing a branch condition
    pub fn is_condition(&self) -> bool {
        matches!(
            self,
            Opcode::Eq | Opcode::Ge | Opcode::Gt | Opcode::Le | Opcode::Lt | Opcode::Ne
        )
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Opcode::Neg)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispatch flavour of a method call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeKind {
    Virtual,
    Interface,
    Special,
    Static,
    Dynamic,
}

impl InvokeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvokeKind::Virtual => "virtualinvoke",
            InvokeKind::Interface => "interfaceinvoke",
            InvokeKind::Special => "specialinvoke",
            InvokeKind::Static => "staticinvoke",
            InvokeKind::Dynamic => "dynamicinvoke",
        }
    }

    /// Whether a receiver must be present
    pub fn requires_receiver(&self) -> bool {
        matches!(
            self,
            InvokeKind::Virtual | InvokeKind::Interface | InvokeKind::Special
        )
    }
}

/// Fully-qualified call target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub class_name: String,
    pub name: String,
    pub params: Vec<String>,
}

impl MethodRef {
    pub fn new(class_name: impl Into<String>, name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            params,
        }
    }
}

impl std::fmt::Display for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}({})", self.class_name, self.name, self.params.join(", "))
    }
}

/// Bootstrap data of a dynamic call site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bootstrap {
    pub method: MethodRef,
    pub args: Vec<Value>,
}

/// A method call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvokeExpr {
    pub kind: InvokeKind,
    pub ty: String,
    pub target: MethodRef,
    /// Receiver; never present for static calls
    pub base: Option<Value>,
    pub args: Vec<Value>,
    pub bootstrap: Option<Bootstrap>,
}

impl std::fmt::Display for InvokeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(base) = &self.base {
            write!(f, "{}.", base)?;
        }
        write!(
            f,
            "{}({}) [{} {}",
            self.target.name,
            join_values(&self.args),
            self.kind.as_str(),
            self.target
        )?;
        if let Some(bootstrap) = &self.bootstrap {
            write!(
                f,
                " bootstrap {}({})",
                bootstrap.method,
                join_values(&bootstrap.args)
            )?;
        }
        write!(f, "]")
    }
}

/// One phi source: a value and the index of the block it flows in from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhiArg {
    pub value: Value,
    pub block: BlockIdx,
}

/// Composite expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Binop {
        ty: String,
        op: Opcode,
        left: Value,
        right: Value,
    },
    Unop {
        ty: String,
        op: Opcode,
        value: Value,
    },
    Cast {
        ty: String,
        cast_type: String,
        value: Value,
    },
    Condition {
        ty: String,
        op: Opcode,
        left: Value,
        right: Value,
    },
    Length {
        ty: String,
        value: Value,
    },
    New {
        ty: String,
        base_type: String,
    },
    NewArray {
        ty: String,
        base_type: String,
        size: Value,
    },
    NewMultiArray {
        ty: String,
        base_type: String,
        sizes: Vec<Value>,
    },
    /// Arguments are filled in once every block of the method is known
    Phi {
        ty: String,
        args: Vec<PhiArg>,
    },
    InstanceOf {
        ty: String,
        check_type: String,
        value: Value,
    },
    Invoke(InvokeExpr),
}

impl Expr {
    pub fn ty(&self) -> &str {
        match self {
            Expr::Binop { ty, .. }
            | Expr::Unop { ty, .. }
            | Expr::Cast { ty, .. }
            | Expr::Condition { ty, .. }
            | Expr::Length { ty, .. }
            | Expr::New { ty, .. }
            | Expr::NewArray { ty, .. }
            | Expr::NewMultiArray { ty, .. }
            | Expr::Phi { ty, .. }
            | Expr::InstanceOf { ty, .. } => ty,
            Expr::Invoke(invoke) => &invoke.ty,
        }
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Expr::Phi { .. })
    }

    pub fn as_invoke(&self) -> Option<&InvokeExpr> {
        match self {
            Expr::Invoke(invoke) => Some(invoke),
            _ => None,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Binop {
                op, left, right, ..
            }
            | Expr::Condition {
                op, left, right, ..
            } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Unop { op, value, .. } => write!(f, "{} {}", op.symbol(), value),
            Expr::Cast {
                cast_type, value, ..
            } => write!(f, "(({}) {})", cast_type, value),
            Expr::Length { value, .. } => write!(f, "len({})", value),
            Expr::New { base_type, .. } => write!(f, "new {}", base_type),
            Expr::NewArray {
                base_type, size, ..
            } => write!(f, "new {}[{}]", base_type, size),
            Expr::NewMultiArray {
                base_type, sizes, ..
            } => {
                write!(f, "new {}", base_type.replace(['[', ']'], ""))?;
                for size in sizes {
                    write!(f, "[{}]", size)?;
                }
                Ok(())
            }
            Expr::Phi { args, .. } => {
                write!(f, "Phi(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} #{}", arg.value, arg.block.as_u32())?;
                }
                write!(f, ")")
            }
            Expr::InstanceOf {
                check_type, value, ..
            } => write!(f, "{} instanceof {}", value, check_type),
            Expr::Invoke(invoke) => write!(f, "{}", invoke),
        }
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(kind: InvokeKind, base: Option<Value>) -> InvokeExpr {
        InvokeExpr {
            kind,
            ty: "java.lang.Integer".to_string(),
            target: MethodRef::new("java.lang.Integer", "valueOf", vec!["int".to_string()]),
            base,
            args: vec![Value::int(7)],
            bootstrap: None,
        }
    }

    #[test]
    fn test_opcode_tables() {
        assert_eq!(Opcode::Add.as_str(), "add");
        assert_eq!(Opcode::Add.symbol(), "+");
        assert_eq!(Opcode::Ushr.symbol(), ">>>");
        assert_eq!(format!("{}", Opcode::Cmpl), "cmpl");
        assert!(Opcode::Ne.is_condition());
        assert!(!Opcode::Sub.is_condition());
        assert!(Opcode::Neg.is_unary());
    }

    #[test]
    fn test_binop_display() {
        let e = Expr::Binop {
            ty: "int".to_string(),
            op: Opcode::Add,
            left: Value::local("i0", "int"),
            right: Value::int(2),
        };
        assert_eq!(format!("{}", e), "i0 + 2");
    }

    #[test]
    fn test_invoke_display() {
        let s = call(InvokeKind::Static, None);
        assert_eq!(
            format!("{}", s),
            "valueOf(7) [staticinvoke java.lang.Integer.valueOf(int)]"
        );

        let v = call(InvokeKind::Virtual, Some(Value::local("r0", "java.lang.Integer")));
        assert_eq!(
            format!("{}", v),
            "r0.valueOf(7) [virtualinvoke java.lang.Integer.valueOf(int)]"
        );
        assert!(InvokeKind::Special.requires_receiver());
        assert!(!InvokeKind::Dynamic.requires_receiver());
    }

    #[test]
    fn test_new_multi_array_display() {
        let e = Expr::NewMultiArray {
            ty: "int[][]".to_string(),
            base_type: "int[][]".to_string(),
            sizes: vec![Value::int(2), Value::local("i1", "int")],
        };
        assert_eq!(format!("{}", e), "new int[2][i1]");
    }

    #[test]
    fn test_phi_display() {
        let e = Expr::Phi {
            ty: "int".to_string(),
            args: vec![
                PhiArg {
                    value: Value::local("i0", "int"),
                    block: BlockIdx(1),
                },
                PhiArg {
                    value: Value::local("i0_1", "int"),
                    block: BlockIdx(2),
                },
            ],
        };
        assert_eq!(format!("{}", e), "Phi(i0 #1, i0_1 #2)");
    }

    #[test]
    fn test_expr_serde_roundtrip_through_value() {
        let v = Value::from(Expr::Invoke(call(InvokeKind::Static, None)));
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
