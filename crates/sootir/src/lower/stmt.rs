//! Statement Lowering
//!
//! One IR statement per engine unit. Branch targets are resolved to labels
//! through the method's label map.

use super::expr::is_phi;
use super::MethodLowerer;
use crate::engine::{normalize_value_kind, ExprKind, RawUnit, UnitId, UnitKind};
use crate::error::{LiftError, LiftResult};
use crate::ir::{Expr, Label, Stmt, StmtKind, Value};

impl<'a> MethodLowerer<'a> {
    /// Lower a unit into a statement
    pub fn lower_stmt(&self, unit: &RawUnit) -> LiftResult<Stmt> {
        let label = self.labels.label(unit.id)?;
        let kind = UnitKind::from_engine(&unit.kind).ok_or_else(|| LiftError::UnsupportedStmt {
            kind: unit.kind.clone(),
        })?;

        let stmt_kind = match kind {
            UnitKind::Assign => {
                let left = self.lower_value(unit.require(unit.left.as_ref(), "left")?)?;
                let right = unit.require(unit.right.as_ref(), "right")?;
                let right = if is_phi(right) {
                    if !self.ssa {
                        return Err(LiftError::PhiOutsideSsa { label });
                    }
                    // Arguments are attached once every block is known
                    Value::from(Expr::Phi {
                        ty: right.ty.clone(),
                        args: Vec::new(),
                    })
                } else {
                    self.lower_value(right)?
                };
                StmtKind::Assign { left, right }
            }
            UnitKind::Identity => StmtKind::Identity {
                left: self.lower_value(unit.require(unit.left.as_ref(), "left")?)?,
                right: self.lower_value(unit.require(unit.right.as_ref(), "right")?)?,
            },
            UnitKind::Breakpoint => StmtKind::Breakpoint,
            UnitKind::EnterMonitor => StmtKind::EnterMonitor {
                obj: self.lower_value(unit.require(unit.op.as_ref(), "op")?)?,
            },
            UnitKind::ExitMonitor => StmtKind::ExitMonitor {
                obj: self.lower_value(unit.require(unit.op.as_ref(), "op")?)?,
            },
            UnitKind::Goto => StmtKind::Goto {
                target: self.target(unit)?,
            },
            UnitKind::If => StmtKind::If {
                condition: self.lower_value(unit.require(unit.condition.as_ref(), "condition")?)?,
                target: self.target(unit)?,
            },
            UnitKind::Invoke => {
                let raw = unit.require(unit.invoke.as_ref(), "invoke")?;
                match ExprKind::from_engine(&normalize_value_kind(&raw.kind)) {
                    Some(ExprKind::Invoke(invoke_kind)) => {
                        StmtKind::Invoke(self.lower_invoke(invoke_kind, raw)?)
                    }
                    _ => {
                        return Err(LiftError::UnexpectedOperand {
                            kind: unit.kind.clone(),
                            expected: "invoke expression",
                        })
                    }
                }
            }
            UnitKind::Return => StmtKind::Return {
                value: self.lower_value(unit.require(unit.op.as_ref(), "op")?)?,
            },
            UnitKind::ReturnVoid => StmtKind::ReturnVoid,
            UnitKind::LookupSwitch => {
                if unit.lookup_values.len() != unit.targets.len() {
                    return Err(LiftError::UnexpectedOperand {
                        kind: unit.kind.clone(),
                        expected: "one target per lookup value",
                    });
                }
                let lookup = unit
                    .lookup_values
                    .iter()
                    .zip(&unit.targets)
                    .map(|(&value, &target)| Ok((value, self.labels.label(target)?)))
                    .collect::<LiftResult<Vec<_>>>()?;
                StmtKind::LookupSwitch {
                    key: self.lower_value(unit.require(unit.key.as_ref(), "key")?)?,
                    lookup,
                    default_target: self.default_target(unit)?,
                }
            }
            UnitKind::TableSwitch => {
                let low_index = *unit.require(unit.low_index.as_ref(), "low_index")?;
                let high_index = *unit.require(unit.high_index.as_ref(), "high_index")?;
                let span = i64::from(high_index) - i64::from(low_index) + 1;
                if span < 0 || span as usize != unit.targets.len() {
                    return Err(LiftError::UnexpectedOperand {
                        kind: unit.kind.clone(),
                        expected: "one target per index",
                    });
                }
                let targets = self.resolve_targets(&unit.targets)?;
                let lookup = (low_index..=high_index).zip(targets.iter().copied()).collect();
                StmtKind::TableSwitch {
                    key: self.lower_value(unit.require(unit.key.as_ref(), "key")?)?,
                    low_index,
                    high_index,
                    targets,
                    lookup,
                    default_target: self.default_target(unit)?,
                }
            }
            UnitKind::Throw => StmtKind::Throw {
                obj: self.lower_value(unit.require(unit.op.as_ref(), "op")?)?,
            },
        };

        Ok(Stmt::new(label, stmt_kind))
    }

    fn target(&self, unit: &RawUnit) -> LiftResult<Label> {
        self.labels
            .label(*unit.require(unit.target.as_ref(), "target")?)
    }

    fn default_target(&self, unit: &RawUnit) -> LiftResult<Label> {
        self.labels
            .label(*unit.require(unit.default_target.as_ref(), "default_target")?)
    }

    fn resolve_targets(&self, targets: &[UnitId]) -> LiftResult<Vec<Label>> {
        targets.iter().map(|&t| self.labels.label(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RawBody, RawConstant, RawMethodRef, RawValue};

    fn local(name: &str) -> RawValue {
        let mut v = RawValue::new("JimpleLocal", "int");
        v.name = Some(name.to_string());
        v
    }

    fn body_of(units: Vec<RawUnit>) -> RawBody {
        RawBody {
            units,
            blocks: vec![],
        }
    }

    fn ret(id: u32) -> RawUnit {
        RawUnit::new(UnitId(id), "JReturnVoidStmt")
    }

    #[test]
    fn test_goto_resolves_label() {
        let mut goto = RawUnit::new(UnitId(10), "JGotoStmt");
        goto.target = Some(UnitId(20));
        let body = body_of(vec![goto.clone(), ret(20)]);
        let lowerer = MethodLowerer::new(&body, false).unwrap();
        let stmt = lowerer.lower_stmt(&goto).unwrap();
        assert_eq!(stmt.label, Label(0));
        assert_eq!(stmt.offset, 0);
        assert_eq!(stmt.kind, StmtKind::Goto { target: Label(1) });
    }

    #[test]
    fn test_unknown_target() {
        let mut goto = RawUnit::new(UnitId(10), "JGotoStmt");
        goto.target = Some(UnitId(99));
        let body = body_of(vec![goto.clone()]);
        let lowerer = MethodLowerer::new(&body, false).unwrap();
        assert!(matches!(
            lowerer.lower_stmt(&goto),
            Err(LiftError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_lookup_switch() {
        let mut switch = RawUnit::new(UnitId(0), "JLookupSwitchStmt");
        switch.key = Some(local("i0"));
        switch.lookup_values = vec![1, 10];
        switch.targets = vec![UnitId(1), UnitId(2)];
        switch.default_target = Some(UnitId(3));
        let body = body_of(vec![switch.clone(), ret(1), ret(2), ret(3)]);
        let lowerer = MethodLowerer::new(&body, false).unwrap();
        let stmt = lowerer.lower_stmt(&switch).unwrap();
        assert_eq!(format!("{}", stmt), "switch_table(i0) {1: 1, 10: 2} default: 3");
    }

    #[test]
    fn test_table_switch() {
        let mut switch = RawUnit::new(UnitId(0), "JTableSwitchStmt");
        switch.key = Some(local("i0"));
        switch.low_index = Some(4);
        switch.high_index = Some(5);
        switch.targets = vec![UnitId(1), UnitId(2)];
        switch.default_target = Some(UnitId(1));
        let body = body_of(vec![switch.clone(), ret(1), ret(2)]);
        let lowerer = MethodLowerer::new(&body, false).unwrap();
        let stmt = lowerer.lower_stmt(&switch).unwrap();
        assert_eq!(format!("{}", stmt), "switch_range(i0)[4..5] {4: 1, 5: 2} default: 1");

        switch.high_index = Some(9);
        assert!(matches!(
            lowerer.lower_stmt(&switch),
            Err(LiftError::UnexpectedOperand { .. })
        ));
    }

    #[test]
    fn test_phi_assignment_per_dialect() {
        let mut assign = RawUnit::new(UnitId(0), "JAssignStmt");
        assign.left = Some(local("i0_2"));
        assign.right = Some(RawValue::new("SPhiExpr", "int"));
        let body = body_of(vec![assign.clone()]);

        let ssa = MethodLowerer::new(&body, true).unwrap();
        let stmt = ssa.lower_stmt(&assign).unwrap();
        assert!(stmt.is_phi());
        assert_eq!(format!("{}", stmt), "i0_2 = Phi()");

        let plain = MethodLowerer::new(&body, false).unwrap();
        assert!(matches!(
            plain.lower_stmt(&assign),
            Err(LiftError::PhiOutsideSsa { label: Label(0) })
        ));
    }

    #[test]
    fn test_invoke_stmt() {
        let mut call = RawValue::new("JStaticInvokeExpr", "java.lang.Integer");
        call.method = Some(RawMethodRef {
            declaring_class: "java.lang.Integer".to_string(),
            name: "valueOf".to_string(),
            params: vec!["int".to_string()],
        });
        let mut arg = RawValue::new("IntConstant", "int");
        arg.value = Some(RawConstant::Int(5));
        call.args = vec![arg];

        let mut unit = RawUnit::new(UnitId(0), "JInvokeStmt");
        unit.invoke = Some(call);
        let body = body_of(vec![unit.clone()]);
        let lowerer = MethodLowerer::new(&body, false).unwrap();
        assert_eq!(
            format!("{}", lowerer.lower_stmt(&unit).unwrap()),
            "valueOf(5) [staticinvoke java.lang.Integer.valueOf(int)]"
        );

        unit.invoke = Some(local("r0"));
        assert!(matches!(
            lowerer.lower_stmt(&unit),
            Err(LiftError::UnexpectedOperand { .. })
        ));
    }

    #[test]
    fn test_unsupported_stmt() {
        let unit = RawUnit::new(UnitId(0), "JRetStmt");
        let body = body_of(vec![unit.clone()]);
        let lowerer = MethodLowerer::new(&body, false).unwrap();
        assert!(matches!(
            lowerer.lower_stmt(&unit),
            Err(LiftError::UnsupportedStmt { .. })
        ));
    }
}
