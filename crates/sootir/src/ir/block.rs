//! Basic Blocks
//!
//! A block is a maximal run of statements entered only at its head. Its
//! index is its position in the owning method's block list, and its label is
//! the label of its first statement.

use super::stmt::{Label, Stmt};
use crate::error::{LiftError, LiftResult};
use serde::{Deserialize, Serialize};

/// Position of a block within its method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockIdx(pub u32);

impl BlockIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BlockIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A basic block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Label of the first statement
    pub label: Label,
    pub idx: BlockIdx,
    pub statements: Vec<Stmt>,
}

impl BasicBlock {
    /// Build a block from its statements; a block must have a head.
    pub fn from_statements(idx: BlockIdx, statements: Vec<Stmt>) -> LiftResult<Self> {
        let label = statements
            .first()
            .map(|s| s.label)
            .ok_or(LiftError::EmptyBlock {
                block: idx.as_usize(),
            })?;
        Ok(Self {
            label,
            idx,
            statements,
        })
    }

    pub fn head(&self) -> Option<&Stmt> {
        self.statements.first()
    }

    pub fn tail(&self) -> Option<&Stmt> {
        self.statements.last()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Find a statement of this block by label
    pub fn statement(&self, label: Label) -> Option<&Stmt> {
        self.statements.iter().find(|s| s.label == label)
    }
}
