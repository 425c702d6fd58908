//! Label Map
//!
//! Assigns every unit of a method body its sequential label, keyed by the
//! engine's unit handle. Lives only for the translation of one method.

use crate::engine::{RawBody, RawUnit, UnitId};
use crate::error::{LiftError, LiftResult};
use crate::ir::Label;
use rustc_hash::FxHashMap;

pub(crate) struct LabelMap<'a> {
    entries: FxHashMap<UnitId, (Label, &'a RawUnit)>,
}

impl<'a> LabelMap<'a> {
    /// Walk the body once, in body order, labeling units from 0
    pub fn build(body: &'a RawBody) -> LiftResult<Self> {
        let mut entries = FxHashMap::default();
        entries.reserve(body.units.len());
        for (position, unit) in body.units.iter().enumerate() {
            let label = Label(position as u32);
            if entries.insert(unit.id, (label, unit)).is_some() {
                return Err(LiftError::DuplicateUnit { unit: unit.id });
            }
        }
        Ok(Self { entries })
    }

    pub fn label(&self, unit: UnitId) -> LiftResult<Label> {
        self.entries
            .get(&unit)
            .map(|(label, _)| *label)
            .ok_or(LiftError::UnknownUnit { unit })
    }

    pub fn unit(&self, unit: UnitId) -> LiftResult<&'a RawUnit> {
        self.entries
            .get(&unit)
            .map(|(_, raw)| *raw)
            .ok_or(LiftError::UnknownUnit { unit })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(ids: &[u32]) -> RawBody {
        RawBody {
            units: ids
                .iter()
                .map(|&id| RawUnit::new(UnitId(id), "JReturnVoidStmt"))
                .collect(),
            blocks: vec![],
        }
    }

    #[test]
    fn test_labels_follow_body_order() {
        let body = body(&[40, 7, 12]);
        let labels = LabelMap::build(&body).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.label(UnitId(40)).unwrap(), Label(0));
        assert_eq!(labels.label(UnitId(7)).unwrap(), Label(1));
        assert_eq!(labels.label(UnitId(12)).unwrap(), Label(2));
        assert_eq!(labels.unit(UnitId(12)).unwrap().id, UnitId(12));
    }

    #[test]
    fn test_unknown_unit() {
        let body = body(&[1]);
        let labels = LabelMap::build(&body).unwrap();
        assert!(matches!(
            labels.label(UnitId(2)),
            Err(LiftError::UnknownUnit { unit: UnitId(2) })
        ));
    }

    #[test]
    fn test_duplicate_unit() {
        let body = body(&[3, 3]);
        assert!(matches!(
            LabelMap::build(&body),
            Err(LiftError::DuplicateUnit { unit: UnitId(3) })
        ));
    }
}
