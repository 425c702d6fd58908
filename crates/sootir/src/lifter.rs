//! Lifter
//!
//! Entry point tying configuration, engine output and the lowerer together.

use crate::config::LifterConfig;
use crate::engine::Program;
use crate::error::{LiftError, LiftResult, ParameterError};
use crate::hierarchy::Hierarchy;
use crate::ir::IrClass;
use crate::lower::Lowerer;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Lifted classes by name
pub type ClassMap = BTreeMap<String, IrClass>;

/// Validated lifter
#[derive(Debug, Clone)]
pub struct Lifter {
    config: LifterConfig,
    lowerer: Lowerer,
}

impl Lifter {
    /// Validate the configuration and build a lifter
    pub fn new(config: LifterConfig) -> LiftResult<Self> {
        config.validate()?;
        let lowerer = Lowerer::new(config.ir_format);
        Ok(Self { config, lowerer })
    }

    pub fn config(&self) -> &LifterConfig {
        &self.config
    }

    /// Translate every application class of the program
    pub fn lift(&self, program: &Program) -> LiftResult<ClassMap> {
        if program.ir_format != self.config.ir_format {
            return Err(ParameterError::DialectMismatch {
                configured: self.config.ir_format.as_str(),
                program: program.ir_format.as_str(),
            }
            .into());
        }

        let mut classes = ClassMap::new();
        let mut skipped = 0usize;
        for raw in &program.classes {
            if !raw.application {
                skipped += 1;
                continue;
            }
            classes.insert(raw.name.clone(), self.lowerer.lower_class(raw)?);
        }

        info!(
            input = ?self.config.input_file,
            dialect = self.config.ir_format.as_str(),
            classes = classes.len(),
            skipped,
            "lifted program"
        );

        if let Some(path) = &self.config.save_to_file {
            save_classes(&classes, path)?;
        }
        Ok(classes)
    }

    /// Lift a single application class by name
    pub fn lift_class(&self, program: &Program, name: &str) -> LiftResult<IrClass> {
        let raw = program
            .class(name)
            .filter(|c| c.application)
            .ok_or_else(|| LiftError::UnknownClass {
                name: name.to_string(),
            })?;
        self.lowerer.lower_class(raw)
    }

    pub fn hierarchy(&self, program: &Program) -> Hierarchy {
        Hierarchy::from_program(program)
    }
}

/// Write lifted classes as JSON
pub fn save_classes(classes: &ClassMap, path: &Path) -> LiftResult<()> {
    let json = serde_json::to_string(classes)?;
    std::fs::write(path, json).map_err(|source| LiftError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), classes = classes.len(), "saved lifted classes");
    Ok(())
}

/// Read classes written by [`save_classes`]
pub fn load_classes(path: &Path) -> LiftResult<ClassMap> {
    let content = std::fs::read_to_string(path).map_err(|source| LiftError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
