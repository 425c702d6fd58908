//! Engine to IR Lowering
//!
//! Converts the engine's decomposed classes into the IR representation.
//! Classes are independent of each other; every lookup table built while
//! lowering a method is owned by that method's [`MethodLowerer`] and dropped
//! with it.

mod expr;
mod labels;
mod method;
mod stmt;

use crate::config::IrFormat;
use crate::engine::{RawBody, RawClass};
use crate::error::{LiftError, LiftResult};
use crate::ir::{decode_modifiers, Attribute, IrClass, IrField};
use labels::LabelMap;
use tracing::debug;

/// Name of the only class without a superclass
pub const ROOT_CLASS: &str = "java.lang.Object";

/// Class lowerer for one IR dialect
#[derive(Debug, Clone, Copy)]
pub struct Lowerer {
    ir_format: IrFormat,
}

impl Lowerer {
    pub fn new(ir_format: IrFormat) -> Self {
        Self { ir_format }
    }

    pub fn ir_format(&self) -> IrFormat {
        self.ir_format
    }

    /// Lower a class with all of its fields and methods
    pub fn lower_class(&self, raw: &RawClass) -> LiftResult<IrClass> {
        let super_class = if raw.name == ROOT_CLASS {
            String::new()
        } else {
            raw.super_class
                .clone()
                .ok_or_else(|| LiftError::MissingSuperclass {
                    class: raw.name.clone(),
                })?
        };

        let mut attrs = decode_modifiers(raw.modifiers)?;
        for (flag, attr) in [
            (raw.library, Attribute::LibraryClass),
            (raw.java_library, Attribute::JavaLibraryClass),
            (raw.phantom, Attribute::Phantom),
        ] {
            if flag {
                attrs.push(attr);
            }
        }

        let fields = raw
            .fields
            .iter()
            .map(|field| {
                Ok(IrField {
                    name: field.name.clone(),
                    attrs: decode_modifiers(field.modifiers)?,
                    ty: field.ty.clone(),
                })
            })
            .collect::<LiftResult<Vec<_>>>()?;

        let methods = raw
            .methods
            .iter()
            .map(|method| self.lower_method(&raw.name, method))
            .collect::<LiftResult<Vec<_>>>()?;

        debug!(
            class = %raw.name,
            methods = methods.len(),
            fields = fields.len(),
            dialect = self.ir_format.as_str(),
            "lowered class"
        );

        Ok(IrClass {
            name: raw.name.clone(),
            super_class,
            interfaces: raw.interfaces.clone(),
            attrs,
            methods,
            fields,
        })
    }
}

/// Translation state of a single method body
pub(crate) struct MethodLowerer<'a> {
    body: &'a RawBody,
    ssa: bool,
    labels: LabelMap<'a>,
}

impl<'a> MethodLowerer<'a> {
    pub fn new(body: &'a RawBody, ssa: bool) -> LiftResult<Self> {
        Ok(Self {
            body,
            ssa,
            labels: LabelMap::build(body)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RawField, RawMethod};

    fn class(name: &str, super_class: Option<&str>) -> RawClass {
        RawClass {
            name: name.to_string(),
            super_class: super_class.map(str::to_string),
            interfaces: vec!["java.io.Serializable".to_string()],
            modifiers: 0x1,
            application: true,
            library: false,
            java_library: false,
            phantom: false,
            fields: vec![
                RawField {
                    name: "X".to_string(),
                    ty: "int".to_string(),
                    modifiers: 0x19,
                },
                RawField {
                    name: "a".to_string(),
                    ty: "long".to_string(),
                    modifiers: 0x2,
                },
            ],
            methods: vec![RawMethod {
                name: "run".to_string(),
                params: vec![],
                return_type: "void".to_string(),
                modifiers: 0x401,
                exceptions: vec![],
                body: None,
            }],
        }
    }

    #[test]
    fn test_lower_class() {
        let lowered = Lowerer::new(IrFormat::Jimple)
            .lower_class(&class("a.B", Some("java.lang.Object")))
            .unwrap();
        assert_eq!(lowered.super_class, "java.lang.Object");
        assert_eq!(lowered.attrs, vec![Attribute::Public]);
        assert_eq!(
            lowered.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["X", "a"]
        );
        assert_eq!(
            lowered.field("X").map(|f| f.attrs.clone()),
            Some(vec![Attribute::Public, Attribute::Static, Attribute::Final])
        );
        assert_eq!(lowered.methods[0].class_name, "a.B");
    }

    #[test]
    fn test_root_class_has_empty_superclass() {
        let lowered = Lowerer::new(IrFormat::Jimple)
            .lower_class(&class(ROOT_CLASS, None))
            .unwrap();
        assert_eq!(lowered.super_class, "");
    }

    #[test]
    fn test_missing_superclass() {
        let err = Lowerer::new(IrFormat::Jimple)
            .lower_class(&class("a.B", None))
            .unwrap_err();
        assert!(matches!(err, LiftError::MissingSuperclass { .. }));
    }

    #[test]
    fn test_extra_class_attributes() {
        let mut raw = class("a.B", Some(ROOT_CLASS));
        raw.library = true;
        raw.phantom = true;
        let lowered = Lowerer::new(IrFormat::Shimple).lower_class(&raw).unwrap();
        assert_eq!(
            lowered.attrs,
            vec![Attribute::Public, Attribute::LibraryClass, Attribute::Phantom]
        );
    }

    #[test]
    fn test_unknown_field_modifier() {
        let mut raw = class("a.B", Some(ROOT_CLASS));
        raw.fields[0].modifiers = 0x8000;
        let err = Lowerer::new(IrFormat::Jimple).lower_class(&raw).unwrap_err();
        assert!(matches!(err, LiftError::UnknownModifier { bits: 0x8000 }));
    }
}
