//! IR Statements
//!
//! One statement per engine unit. Statements are addressed by their [`Label`],
//! a per-method ordinal assigned in body order.

use super::expr::{Expr, InvokeExpr, PhiArg};
use super::value::Value;
use serde::{Deserialize, Serialize};

/// Statement label, unique within a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub u32);

impl Label {
    pub fn new(label: u32) -> Self {
        Self(label)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A labeled statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stmt {
    pub label: Label,
    /// Bytecode offset; the engine does not report one, so this is always 0
    pub offset: u32,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(label: Label, kind: StmtKind) -> Self {
        Self {
            label,
            offset: 0,
            kind,
        }
    }

    /// Labels this statement may transfer control to
    pub fn branch_targets(&self) -> Vec<Label> {
        self.kind.branch_targets()
    }

    /// Replace the arguments of a phi right-hand side.
    ///
    /// Statements that do not assign a phi are returned unchanged.
    pub fn with_phi_args(self, phi_args: Vec<PhiArg>) -> Self {
        let Stmt {
            label,
            offset,
            kind,
        } = self;
        let kind = match kind {
            StmtKind::Assign {
                left,
                right: Value::Expr(expr),
            } => match *expr {
                Expr::Phi { ty, .. } => StmtKind::Assign {
                    left,
                    right: Value::from(Expr::Phi { ty, args: phi_args }),
                },
                other => StmtKind::Assign {
                    left,
                    right: Value::Expr(Box::new(other)),
                },
            },
            other => other,
        };
        Stmt {
            label,
            offset,
            kind,
        }
    }

    /// Check if the right-hand side of this statement is a phi
    pub fn is_phi(&self) -> bool {
        matches!(
            &self.kind,
            StmtKind::Assign { right: Value::Expr(expr), .. } if expr.is_phi()
        )
    }
}

impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Statement variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum StmtKind {
    Assign {
        left: Value,
        right: Value,
    },
    /// Binds a parameter, `this` or a caught exception to a local
    Identity {
        left: Value,
        right: Value,
    },
    Breakpoint,
    EnterMonitor {
        obj: Value,
    },
    ExitMonitor {
        obj: Value,
    },
    Goto {
        target: Label,
    },
    If {
        condition: Value,
        target: Label,
    },
    Invoke(InvokeExpr),
    Return {
        value: Value,
    },
    ReturnVoid,
    LookupSwitch {
        key: Value,
        lookup: Vec<(i32, Label)>,
        default_target: Label,
    },
    TableSwitch {
        key: Value,
        low_index: i32,
        high_index: i32,
        targets: Vec<Label>,
        lookup: Vec<(i32, Label)>,
        default_target: Label,
    },
    Throw {
        obj: Value,
    },
}

impl StmtKind {
    pub fn branch_targets(&self) -> Vec<Label> {
        match self {
            StmtKind::Goto { target } | StmtKind::If { target, .. } => vec![*target],
            StmtKind::LookupSwitch {
                lookup,
                default_target,
                ..
            } => {
                let mut targets: Vec<_> = lookup.iter().map(|(_, label)| *label).collect();
                targets.push(*default_target);
                targets
            }
            StmtKind::TableSwitch {
                targets,
                lookup,
                default_target,
                ..
            } => {
                let mut all = targets.clone();
                all.extend(lookup.iter().map(|(_, label)| *label));
                all.push(*default_target);
                all
            }
            _ => Vec::new(),
        }
    }

    /// Check if this statement writes a local
    pub fn is_definition(&self) -> bool {
        matches!(self, StmtKind::Assign { .. } | StmtKind::Identity { .. })
    }

    /// Check if control never falls through to the next statement
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            StmtKind::Goto { .. }
                | StmtKind::Return { .. }
                | StmtKind::ReturnVoid
                | StmtKind::LookupSwitch { .. }
                | StmtKind::TableSwitch { .. }
                | StmtKind::Throw { .. }
        )
    }
}

impl std::fmt::Display for StmtKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StmtKind::Assign { left, right } => write!(f, "{} = {}", left, right),
            StmtKind::Identity { left, right } => write!(f, "{} <- {}", left, right),
            StmtKind::Breakpoint => write!(f, "breakpoint"),
            StmtKind::EnterMonitor { obj } => write!(f, "EnterMonitor({})", obj),
            StmtKind::ExitMonitor { obj } => write!(f, "ExitMonitor({})", obj),
            StmtKind::Goto { target } => write!(f, "goto {}", target),
            StmtKind::If { condition, target } => write!(f, "if({}) goto {}", condition, target),
            StmtKind::Invoke(invoke) => write!(f, "{}", invoke),
            StmtKind::Return { value } => write!(f, "return {}", value),
            StmtKind::ReturnVoid => write!(f, "return"),
            StmtKind::LookupSwitch {
                key,
                lookup,
                default_target,
            } => {
                write!(f, "switch_table({}) ", key)?;
                write_lookup(f, lookup)?;
                write!(f, " default: {}", default_target)
            }
            StmtKind::TableSwitch {
                key,
                low_index,
                high_index,
                lookup,
                default_target,
                ..
            } => {
                write!(f, "switch_range({})[{}..{}] ", key, low_index, high_index)?;
                write_lookup(f, lookup)?;
                write!(f, " default: {}", default_target)
            }
            StmtKind::Throw { obj } => write!(f, "Throw({})", obj),
        }
    }
}

fn write_lookup(f: &mut std::fmt::Formatter<'_>, lookup: &[(i32, Label)]) -> std::fmt::Result {
    write!(f, "{{")?;
    for (i, (value, target)) in lookup.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", value, target)?;
    }
    write!(f, "}}")
}
