//! Value and Expression Lowering
//!
//! Converts engine operands into IR values. Dispatch goes through the closed
//! kind tables; a kind missing from them is a coverage gap and fails the
//! whole method.

use super::MethodLowerer;
use crate::engine::{
    is_expr_kind, normalize_value_kind, ExprKind, RawConstant, RawMethodRef, RawValue, ValueKind,
};
use crate::error::{LiftError, LiftResult};
use crate::ir::{Bootstrap, Expr, FieldRef, InvokeExpr, InvokeKind, MethodRef, Real, Value};

/// Whether an engine operand is a phi expression
pub(crate) fn is_phi(raw: &RawValue) -> bool {
    ExprKind::from_engine(&normalize_value_kind(&raw.kind)) == Some(ExprKind::Phi)
}

impl<'a> MethodLowerer<'a> {
    /// Lower one operand into a value or expression
    pub fn lower_value(&self, raw: &RawValue) -> LiftResult<Value> {
        let kind = normalize_value_kind(&raw.kind);
        if is_expr_kind(&kind) {
            let expr_kind = ExprKind::from_engine(&kind).ok_or_else(|| LiftError::UnsupportedExpr {
                kind: raw.kind.clone(),
            })?;
            return Ok(Value::from(self.lower_expr(expr_kind, raw)?));
        }

        let value_kind = ValueKind::from_engine(&kind).ok_or_else(|| LiftError::UnsupportedValue {
            kind: raw.kind.clone(),
        })?;
        let ty = raw.ty.clone();

        let value = match value_kind {
            ValueKind::Local => Value::Local {
                ty,
                name: raw.require(raw.name.as_ref(), "name")?.clone(),
            },
            ValueKind::ArrayRef => Value::ArrayRef {
                ty,
                base: Box::new(self.lower_value(raw.require(raw.base.as_deref(), "base")?)?),
                index: Box::new(self.lower_value(raw.require(raw.index.as_deref(), "index")?)?),
            },
            ValueKind::CaughtExceptionRef => Value::CaughtExceptionRef { ty },
            ValueKind::InstanceFieldRef => Value::InstanceFieldRef {
                ty,
                base: Box::new(self.lower_value(raw.require(raw.base.as_deref(), "base")?)?),
                field: field_ref(raw)?,
            },
            ValueKind::ParamRef => Value::ParamRef {
                ty,
                index: *raw.require(raw.param_index.as_ref(), "param_index")?,
            },
            ValueKind::ThisRef => Value::ThisRef { ty },
            ValueKind::StaticFieldRef => Value::StaticFieldRef {
                ty,
                field: field_ref(raw)?,
            },
            ValueKind::ClassConstant => Value::ClassConstant {
                ty,
                value: text_constant(raw)?,
            },
            ValueKind::DoubleConstant => Value::DoubleConstant {
                ty,
                value: real_constant(raw)?,
            },
            ValueKind::FloatConstant => Value::FloatConstant {
                ty,
                value: real_constant(raw)?,
            },
            ValueKind::IntConstant => {
                let value = integer_constant(raw)?;
                Value::IntConstant {
                    ty,
                    value: i32::try_from(value).map_err(|_| LiftError::UnexpectedOperand {
                        kind: raw.kind.clone(),
                        expected: "32-bit integer",
                    })?,
                }
            }
            ValueKind::LongConstant => Value::LongConstant {
                ty,
                value: integer_constant(raw)?,
            },
            ValueKind::NullConstant => Value::NullConstant { ty },
            ValueKind::StringConstant => Value::StringConstant {
                ty,
                value: text_constant(raw)?,
            },
        };
        Ok(value)
    }

    fn lower_expr(&self, kind: ExprKind, raw: &RawValue) -> LiftResult<Expr> {
        let ty = raw.ty.clone();
        let expr = match kind {
            ExprKind::Binop(op) => Expr::Binop {
                ty,
                op,
                left: self.operand(raw, raw.op1.as_deref(), "op1")?,
                right: self.operand(raw, raw.op2.as_deref(), "op2")?,
            },
            ExprKind::Condition(op) => Expr::Condition {
                ty,
                op,
                left: self.operand(raw, raw.op1.as_deref(), "op1")?,
                right: self.operand(raw, raw.op2.as_deref(), "op2")?,
            },
            ExprKind::Unop(op) => Expr::Unop {
                ty,
                op,
                value: self.operand(raw, raw.op.as_deref(), "op")?,
            },
            ExprKind::Cast => Expr::Cast {
                ty,
                cast_type: raw.require(raw.cast_type.as_ref(), "cast_type")?.clone(),
                value: self.operand(raw, raw.op.as_deref(), "op")?,
            },
            ExprKind::Length => Expr::Length {
                ty,
                value: self.operand(raw, raw.op.as_deref(), "op")?,
            },
            ExprKind::New => Expr::New {
                ty,
                base_type: raw.require(raw.base_type.as_ref(), "base_type")?.clone(),
            },
            ExprKind::NewArray => Expr::NewArray {
                ty,
                base_type: raw.require(raw.base_type.as_ref(), "base_type")?.clone(),
                size: self.operand(raw, raw.size.as_deref(), "size")?,
            },
            ExprKind::NewMultiArray => Expr::NewMultiArray {
                ty,
                base_type: raw.require(raw.base_type.as_ref(), "base_type")?.clone(),
                sizes: self.lower_values(&raw.sizes)?,
            },
            ExprKind::InstanceOf => Expr::InstanceOf {
                ty,
                check_type: raw.require(raw.check_type.as_ref(), "check_type")?.clone(),
                value: self.operand(raw, raw.op.as_deref(), "op")?,
            },
            // Phi only exists as an assignment right-hand side, handled there
            ExprKind::Phi => return Err(LiftError::MisplacedPhi),
            ExprKind::Invoke(invoke_kind) => Expr::Invoke(self.lower_invoke(invoke_kind, raw)?),
        };
        Ok(expr)
    }

    /// Lower a call expression
    pub(crate) fn lower_invoke(&self, kind: InvokeKind, raw: &RawValue) -> LiftResult<InvokeExpr> {
        let target = method_ref(raw.require(raw.method.as_ref(), "method")?);

        let base = match (kind, raw.base.as_deref()) {
            (InvokeKind::Static, Some(_)) => {
                return Err(LiftError::UnexpectedOperand {
                    kind: raw.kind.clone(),
                    expected: "no receiver",
                })
            }
            (kind, None) if kind.requires_receiver() => {
                return Err(LiftError::MissingOperand {
                    kind: raw.kind.clone(),
                    operand: "base",
                })
            }
            (_, Some(base)) => Some(self.lower_value(base)?),
            (_, None) => None,
        };

        let bootstrap = match (kind, raw.bootstrap_method.as_ref()) {
            (InvokeKind::Dynamic, Some(method)) => Some(Bootstrap {
                method: method_ref(method),
                args: self.lower_values(&raw.bootstrap_args)?,
            }),
            _ => None,
        };

        Ok(InvokeExpr {
            kind,
            ty: raw.ty.clone(),
            target,
            base,
            args: self.lower_values(&raw.args)?,
            bootstrap,
        })
    }

    pub(crate) fn lower_values(&self, raws: &[RawValue]) -> LiftResult<Vec<Value>> {
        raws.iter().map(|raw| self.lower_value(raw)).collect()
    }

    fn operand(&self, owner: &RawValue, slot: Option<&RawValue>, name: &'static str) -> LiftResult<Value> {
        self.lower_value(owner.require(slot, name)?)
    }
}

fn method_ref(raw: &RawMethodRef) -> MethodRef {
    MethodRef::new(raw.declaring_class.clone(), raw.name.clone(), raw.params.clone())
}

fn field_ref(raw: &RawValue) -> LiftResult<FieldRef> {
    let field = raw.require(raw.field.as_ref(), "field")?;
    Ok(FieldRef::new(field.name.clone(), field.declaring_class.clone()))
}

fn constant(raw: &RawValue) -> LiftResult<&RawConstant> {
    raw.require(raw.value.as_ref(), "value")
}

fn text_constant(raw: &RawValue) -> LiftResult<String> {
    match constant(raw)? {
        RawConstant::Text(text) => Ok(text.clone()),
        _ => Err(LiftError::UnexpectedOperand {
            kind: raw.kind.clone(),
            expected: "text",
        }),
    }
}

fn integer_constant(raw: &RawValue) -> LiftResult<i64> {
    match constant(raw)? {
        RawConstant::Int(value) => Ok(*value),
        _ => Err(LiftError::UnexpectedOperand {
            kind: raw.kind.clone(),
            expected: "integer",
        }),
    }
}

// Non-finite reals arrive as text ("NaN", "Infinity", "-Infinity").
fn real_constant(raw: &RawValue) -> LiftResult<Real> {
    match constant(raw)? {
        RawConstant::Real(value) => Ok(Real(*value)),
        RawConstant::Int(value) => Ok(Real(*value as f64)),
        RawConstant::Text(text) => {
            text.parse::<f64>()
                .map(Real)
                .map_err(|_| LiftError::UnexpectedOperand {
                    kind: raw.kind.clone(),
                    expected: "floating-point",
                })
        }
    }
}
