//! IR Classes

use super::method::IrMethod;
use super::modifier::Attribute;
use serde::{Deserialize, Serialize};

/// A declared field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrField {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub ty: String,
}

/// A translated class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrClass {
    pub name: String,
    /// Empty only for the root object type
    pub super_class: String,
    pub interfaces: Vec<String>,
    pub attrs: Vec<Attribute>,
    pub methods: Vec<IrMethod>,
    /// Fields in declaration order
    pub fields: Vec<IrField>,
}

impl IrClass {
    pub fn field(&self, name: &str) -> Option<&IrField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Methods with the given name, in declaration order (overloads included)
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a IrMethod> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn is_interface(&self) -> bool {
        self.attrs.contains(&Attribute::Interface)
    }

    /// Validate every method of the class
    pub fn validate(&self) -> Result<(), String> {
        for method in &self.methods {
            method
                .validate()
                .map_err(|e| format!("{}: {}", method.full_name(), e))?;
        }
        Ok(())
    }
}
