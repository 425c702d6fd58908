//! IR Methods
//!
//! A method owns its blocks and two edge relations over them. Both relations
//! reference blocks by [`BlockIdx`]; a block appears as a key only when it has
//! at least one edge of that kind.

use super::block::{BasicBlock, BlockIdx};
use super::expr::Expr;
use super::modifier::Attribute;
use super::stmt::{Label, Stmt, StmtKind};
use super::value::Value;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Block edge relation, ordered by source block
pub type EdgeMap = BTreeMap<BlockIdx, Vec<BlockIdx>>;

/// A translated method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrMethod {
    /// Declaring class
    pub class_name: String,
    pub name: String,
    /// Parameter types
    pub params: Vec<String>,
    pub return_type: String,
    pub attrs: Vec<Attribute>,
    /// Declared exception types
    pub exceptions: Vec<String>,
    /// Blocks in translation order; `blocks[i].idx == i`
    pub blocks: Vec<BasicBlock>,
    /// Normal successors
    pub control_flow: EdgeMap,
    /// Blocks reaching a block only through an exception-handler edge
    pub exceptional_predecessors: EdgeMap,
}

impl IrMethod {
    /// A method without an executable body (abstract or native)
    pub fn without_body(
        class_name: impl Into<String>,
        name: impl Into<String>,
        params: Vec<String>,
        return_type: impl Into<String>,
        attrs: Vec<Attribute>,
        exceptions: Vec<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            params,
            return_type: return_type.into(),
            attrs,
            exceptions,
            blocks: Vec::new(),
            control_flow: EdgeMap::new(),
            exceptional_predecessors: EdgeMap::new(),
        }
    }

    /// Class-qualified name
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.class_name, self.name)
    }

    pub fn has_body(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn block(&self, idx: BlockIdx) -> Option<&BasicBlock> {
        self.blocks.get(idx.as_usize())
    }

    /// The block whose first statement carries `label`
    pub fn block_by_label(&self, label: Label) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// Normal successors of a block, in engine order
    pub fn successors(&self, idx: BlockIdx) -> &[BlockIdx] {
        self.control_flow.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exception-only predecessors of a block, in engine order
    pub fn exceptional_predecessors_of(&self, idx: BlockIdx) -> &[BlockIdx] {
        self.exceptional_predecessors
            .get(&idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over every statement of the method in block order
    pub fn statements(&self) -> impl Iterator<Item = &Stmt> {
        self.blocks.iter().flat_map(|b| b.statements.iter())
    }

    pub fn statement_count(&self) -> usize {
        self.blocks.iter().map(|b| b.len()).sum()
    }

    /// Validate the method structure
    pub fn validate(&self) -> Result<(), String> {
        let count = self.blocks.len();
        let mut labels = FxHashSet::default();

        for (position, block) in self.blocks.iter().enumerate() {
            if block.idx.as_usize() != position {
                return Err(format!(
                    "Block at position {} has index {}",
                    position, block.idx
                ));
            }

            let head = block
                .head()
                .ok_or_else(|| format!("Block {} has no statements", block.idx))?;
            if head.label != block.label {
                return Err(format!(
                    "Block {} is labeled {} but starts with statement {}",
                    block.idx, block.label, head.label
                ));
            }

            match self.block_by_label(block.label) {
                Some(found) if found.idx == block.idx => {}
                _ => {
                    return Err(format!(
                        "Label {} does not identify block {}",
                        block.label, block.idx
                    ))
                }
            }

            for stmt in &block.statements {
                if !labels.insert(stmt.label) {
                    return Err(format!("Label {} is used twice", stmt.label));
                }
            }
        }

        for (relation, edges) in [
            ("control flow", &self.control_flow),
            ("exceptional predecessor", &self.exceptional_predecessors),
        ] {
            for (from, targets) in edges {
                if targets.is_empty() {
                    return Err(format!("Block {} has an empty {} entry", from, relation));
                }
                for idx in std::iter::once(from).chain(targets.iter()) {
                    if idx.as_usize() >= count {
                        return Err(format!(
                            "{} edge of block {} references block {} (method has {} blocks)",
                            relation, from, idx, count
                        ));
                    }
                }
            }
        }

        for stmt in self.statements() {
            for target in stmt.branch_targets() {
                if !labels.contains(&target) {
                    return Err(format!(
                        "Statement {} branches to unknown label {}",
                        stmt.label, target
                    ));
                }
            }

            if let StmtKind::Assign {
                right: Value::Expr(expr),
                ..
            } = &stmt.kind
            {
                if let Expr::Phi { args, .. } = expr.as_ref() {
                    for arg in args {
                        if arg.block.as_usize() >= count {
                            return Err(format!(
                                "Phi at label {} references block {} (method has {} blocks)",
                                stmt.label, arg.block, count
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
