//! Class Hierarchy
//!
//! Subclass queries over every class the engine reported, application and
//! library alike.

use crate::engine::Program;
use crate::error::{LiftError, LiftResult};
use crate::ir::Attribute;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Direct-subclass index of a program
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    /// Class names in program order
    classes: Vec<String>,
    /// Direct subclasses per class, in program order
    children: FxHashMap<String, Vec<String>>,
    interfaces: FxHashSet<String>,
}

impl Hierarchy {
    pub fn from_program(program: &Program) -> Self {
        let mut hierarchy = Self::default();
        let interface_bit = Attribute::Interface.bit().unwrap_or_default();

        for class in &program.classes {
            hierarchy.classes.push(class.name.clone());
            if class.modifiers & interface_bit != 0 {
                hierarchy.interfaces.insert(class.name.clone());
            }
            if let Some(parent) = &class.super_class {
                hierarchy
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(class.name.clone());
            }
        }
        hierarchy
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains(name)
    }

    /// Direct subclasses of a class
    pub fn direct_subclasses(&self, name: &str) -> &[String] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All transitive non-interface subclasses, breadth-first, excluding
    /// the class itself
    pub fn subclasses_of(&self, name: &str) -> LiftResult<Vec<String>> {
        if !self.contains(name) {
            return Err(LiftError::UnknownClass {
                name: name.to_string(),
            });
        }

        let mut seen = FxHashSet::default();
        seen.insert(name);
        let mut queue = VecDeque::from([name]);
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            for child in self.direct_subclasses(current) {
                if !seen.insert(child.as_str()) {
                    continue;
                }
                if !self.is_interface(child) {
                    result.push(child.clone());
                }
                queue.push_back(child.as_str());
            }
        }
        Ok(result)
    }
}
