//! IR Values
//!
//! Leaf operands. Every variant carries the string form of its static type.

use super::expr::Expr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};

/// Floating-point payload compared and hashed by bit pattern
#[derive(Debug, Clone, Copy)]
pub struct Real(pub f64);

impl Real {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Real {}

impl Hash for Real {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

// JSON has no NaN or infinities, so those travel as text.
impl Serialize for Real {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_str(&self.0.to_string())
        }
    }
}

impl<'de> Deserialize<'de> for Real {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Real(v)),
            Repr::Text(s) => s
                .parse::<f64>()
                .map(Real)
                .map_err(|_| serde::de::Error::custom(format!("invalid real constant {:?}", s))),
        }
    }
}

/// A field reference as `(name, declaring class)`, never a live field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub name: String,
    pub class_name: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}: {}>", self.class_name, self.name)
    }
}

/// IR operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Value {
    Local {
        ty: String,
        name: String,
    },
    ArrayRef {
        ty: String,
        base: Box<Value>,
        index: Box<Value>,
    },
    CaughtExceptionRef {
        ty: String,
    },
    ParamRef {
        ty: String,
        index: u32,
    },
    ThisRef {
        ty: String,
    },
    StaticFieldRef {
        ty: String,
        field: FieldRef,
    },
    InstanceFieldRef {
        ty: String,
        base: Box<Value>,
        field: FieldRef,
    },
    ClassConstant {
        ty: String,
        value: String,
    },
    DoubleConstant {
        ty: String,
        value: Real,
    },
    FloatConstant {
        ty: String,
        value: Real,
    },
    IntConstant {
        ty: String,
        value: i32,
    },
    LongConstant {
        ty: String,
        value: i64,
    },
    NullConstant {
        ty: String,
    },
    StringConstant {
        ty: String,
        value: String,
    },
    /// A composite, value-producing expression
    Expr(Box<Expr>),
}

impl Value {
    pub fn local(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Value::Local {
            ty: ty.into(),
            name: name.into(),
        }
    }

    pub fn int(value: i32) -> Self {
        Value::IntConstant {
            ty: "int".to_string(),
            value,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::StringConstant {
            ty: "java.lang.String".to_string(),
            value: value.into(),
        }
    }

    /// Static type of this value
    pub fn ty(&self) -> &str {
        match self {
            Value::Local { ty, .. }
            | Value::ArrayRef { ty, .. }
            | Value::CaughtExceptionRef { ty }
            | Value::ParamRef { ty, .. }
            | Value::ThisRef { ty }
            | Value::StaticFieldRef { ty, .. }
            | Value::InstanceFieldRef { ty, .. }
            | Value::ClassConstant { ty, .. }
            | Value::DoubleConstant { ty, .. }
            | Value::FloatConstant { ty, .. }
            | Value::IntConstant { ty, .. }
            | Value::LongConstant { ty, .. }
            | Value::NullConstant { ty }
            | Value::StringConstant { ty, .. } => ty,
            Value::Expr(expr) => expr.ty(),
        }
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Value::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    /// Check if this is a constant
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Value::ClassConstant { .. }
                | Value::DoubleConstant { .. }
                | Value::FloatConstant { .. }
                | Value::IntConstant { .. }
                | Value::LongConstant { .. }
                | Value::NullConstant { .. }
                | Value::StringConstant { .. }
        )
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Value::Expr(Box::new(expr))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Local { name, .. } => write!(f, "{}", name),
            Value::ArrayRef { base, index, .. } => write!(f, "{}[{}]", base, index),
            Value::CaughtExceptionRef { ty } => write!(f, "Caught({})", ty),
            Value::ParamRef { ty, index } => write!(f, "@parameter{}[{}]", index, ty),
            Value::ThisRef { ty } => write!(f, "@this[{}]", ty),
            Value::StaticFieldRef { field, .. } => write!(f, "StaticFieldRef {}", field),
            Value::InstanceFieldRef { base, field, .. } => write!(f, "{}.{}", base, field),
            Value::ClassConstant { value, .. } => write!(f, "{}", value),
            Value::DoubleConstant { value, .. } => write!(f, "{:?}d", value.0),
            Value::FloatConstant { value, .. } => write!(f, "{:?}f", value.0 as f32),
            Value::IntConstant { value, .. } => write!(f, "{}", value),
            Value::LongConstant { value, .. } => write!(f, "{}L", value),
            Value::NullConstant { .. } => write!(f, "null"),
            Value::StringConstant { value, .. } => write!(f, "{:?}", value),
            Value::Expr(expr) => write!(f, "{}", expr),
        }
    }
}
