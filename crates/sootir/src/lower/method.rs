//! Method Lowering
//!
//! Two passes over the engine's block graph:
//!
//! 1. Build every block's statements, remembering which block each unit
//!    landed in. Phi right-hand sides are built without arguments.
//! 2. Walk the units again and compute the argument list of every phi as a
//!    separate output keyed by label, then merge it into the statements as
//!    the final blocks are assembled.
//!
//! A phi argument names the block its value flows in from, and block indices
//! are only known after pass 1, hence the split.

use super::expr::is_phi;
use super::{Lowerer, MethodLowerer};
use crate::engine::{RawBody, RawMethod, UnitId, UnitKind};
use crate::error::{LiftError, LiftResult};
use crate::ir::{decode_modifiers, BasicBlock, BlockIdx, EdgeMap, IrMethod, Label, PhiArg, Stmt};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Blocks as built by pass 1, before phi arguments are attached
struct DraftBlocks {
    blocks: Vec<(BlockIdx, Vec<Stmt>)>,
    /// Block each unit belongs to
    unit_blocks: FxHashMap<UnitId, BlockIdx>,
}

impl Lowerer {
    /// Lower one method of `class_name`
    pub fn lower_method(&self, class_name: &str, raw: &RawMethod) -> LiftResult<IrMethod> {
        let attrs = decode_modifiers(raw.modifiers)?;

        let Some(body) = &raw.body else {
            debug!(class = class_name, method = %raw.name, "method has no body");
            return Ok(IrMethod::without_body(
                class_name,
                raw.name.clone(),
                raw.params.clone(),
                raw.return_type.clone(),
                attrs,
                raw.exceptions.clone(),
            ));
        };

        let lowerer = MethodLowerer::new(body, self.ir_format().is_ssa())?;
        let drafts = lowerer.build_blocks()?;
        let (control_flow, exceptional_predecessors) = build_edges(body)?;
        let mut phi_args = lowerer.resolve_phis(&drafts.unit_blocks)?;

        let blocks = drafts
            .blocks
            .into_iter()
            .map(|(idx, statements)| {
                let statements = statements
                    .into_iter()
                    .map(|stmt| match phi_args.remove(&stmt.label) {
                        Some(args) => stmt.with_phi_args(args),
                        None => stmt,
                    })
                    .collect();
                BasicBlock::from_statements(idx, statements)
            })
            .collect::<LiftResult<Vec<_>>>()?;

        debug!(
            class = class_name,
            method = %raw.name,
            blocks = blocks.len(),
            units = lowerer.labels.len(),
            "lowered method"
        );

        Ok(IrMethod {
            class_name: class_name.to_string(),
            name: raw.name.clone(),
            params: raw.params.clone(),
            return_type: raw.return_type.clone(),
            attrs,
            exceptions: raw.exceptions.clone(),
            blocks,
            control_flow,
            exceptional_predecessors,
        })
    }
}

impl<'a> MethodLowerer<'a> {
    /// Pass 1: statements per block, plus the unit-to-block map
    fn build_blocks(&self) -> LiftResult<DraftBlocks> {
        let mut blocks = Vec::with_capacity(self.body.blocks.len());
        let mut unit_blocks = FxHashMap::default();

        for (position, raw_block) in self.body.blocks.iter().enumerate() {
            if raw_block.units.is_empty() {
                return Err(LiftError::EmptyBlock { block: position });
            }
            let idx = BlockIdx(position as u32);

            let mut statements = Vec::with_capacity(raw_block.units.len());
            for &unit_id in &raw_block.units {
                if unit_blocks.insert(unit_id, idx).is_some() {
                    return Err(LiftError::DuplicateUnit { unit: unit_id });
                }
                statements.push(self.lower_stmt(self.labels.unit(unit_id)?)?);
            }

            trace!(block = position, statements = statements.len(), "built block");
            blocks.push((idx, statements));
        }

        Ok(DraftBlocks {
            blocks,
            unit_blocks,
        })
    }

    /// Pass 2: phi arguments keyed by the label of their assignment
    fn resolve_phis(
        &self,
        unit_blocks: &FxHashMap<UnitId, BlockIdx>,
    ) -> LiftResult<FxHashMap<Label, Vec<PhiArg>>> {
        let mut resolved = FxHashMap::default();
        if !self.ssa {
            return Ok(resolved);
        }

        for unit in &self.body.units {
            if UnitKind::from_engine(&unit.kind) != Some(UnitKind::Assign) {
                continue;
            }
            let Some(right) = unit.right.as_ref().filter(|r| is_phi(r)) else {
                continue;
            };

            let label = self.labels.label(unit.id)?;
            let args = right
                .phi_args
                .iter()
                .map(|arg| {
                    let block = unit_blocks
                        .get(&arg.unit)
                        .copied()
                        .ok_or(LiftError::UnresolvedPhiSource {
                            label,
                            unit: arg.unit,
                        })?;
                    Ok(PhiArg {
                        value: self.lower_value(&arg.value)?,
                        block,
                    })
                })
                .collect::<LiftResult<Vec<_>>>()?;
            resolved.insert(label, args);
        }

        Ok(resolved)
    }
}

/// Both edge relations, keyed only by blocks that have edges of that kind
fn build_edges(body: &RawBody) -> LiftResult<(EdgeMap, EdgeMap)> {
    let count = body.blocks.len();
    let resolve = |targets: &[usize]| -> LiftResult<Vec<BlockIdx>> {
        targets
            .iter()
            .map(|&block| {
                if block < count {
                    Ok(BlockIdx(block as u32))
                } else {
                    Err(LiftError::UnknownBlock { block, count })
                }
            })
            .collect()
    };

    let mut control_flow = EdgeMap::new();
    let mut exceptional_predecessors = EdgeMap::new();
    for (position, raw_block) in body.blocks.iter().enumerate() {
        let idx = BlockIdx(position as u32);
        if !raw_block.succs.is_empty() {
            control_flow.insert(idx, resolve(&raw_block.succs)?);
        }
        if !raw_block.exceptional_preds.is_empty() {
            exceptional_predecessors.insert(idx, resolve(&raw_block.exceptional_preds)?);
        }
    }
    Ok((control_flow, exceptional_predecessors))
}
