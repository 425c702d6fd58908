//! Modifier Decoding
//!
//! The engine reports declaration attributes as a bitmask using the JVM
//! access-flag layout plus two engine-specific bits.

use crate::error::{LiftError, LiftResult};
use serde::{Deserialize, Serialize};

/// Declaration attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Synchronized,
    Volatile,
    Transient,
    Native,
    Interface,
    Abstract,
    Strictfp,
    Synthetic,
    Annotation,
    Enum,
    Constructor,
    DeclaredSynchronized,

    // Class-level flags, not encoded in the bitmask
    #[serde(rename = "LibraryClass")]
    LibraryClass,
    #[serde(rename = "JavaLibraryClass")]
    JavaLibraryClass,
    #[serde(rename = "Phantom")]
    Phantom,
}

/// Bitmask entries in ascending bit order
const MODIFIER_BITS: &[(u32, Attribute)] = &[
    (0x0001, Attribute::Public),
    (0x0002, Attribute::Private),
    (0x0004, Attribute::Protected),
    (0x0008, Attribute::Static),
    (0x0010, Attribute::Final),
    (0x0020, Attribute::Synchronized),
    (0x0040, Attribute::Volatile),
    (0x0080, Attribute::Transient),
    (0x0100, Attribute::Native),
    (0x0200, Attribute::Interface),
    (0x0400, Attribute::Abstract),
    (0x0800, Attribute::Strictfp),
    (0x1000, Attribute::Synthetic),
    (0x2000, Attribute::Annotation),
    (0x4000, Attribute::Enum),
    (0x10000, Attribute::Constructor),
    (0x20000, Attribute::DeclaredSynchronized),
];

impl Attribute {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Public => "PUBLIC",
            Attribute::Private => "PRIVATE",
            Attribute::Protected => "PROTECTED",
            Attribute::Static => "STATIC",
            Attribute::Final => "FINAL",
            Attribute::Synchronized => "SYNCHRONIZED",
            Attribute::Volatile => "VOLATILE",
            Attribute::Transient => "TRANSIENT",
            Attribute::Native => "NATIVE",
            Attribute::Interface => "INTERFACE",
            Attribute::Abstract => "ABSTRACT",
            Attribute::Strictfp => "STRICTFP",
            Attribute::Synthetic => "SYNTHETIC",
            Attribute::Annotation => "ANNOTATION",
            Attribute::Enum => "ENUM",
            Attribute::Constructor => "CONSTRUCTOR",
            Attribute::DeclaredSynchronized => "DECLARED_SYNCHRONIZED",
            Attribute::LibraryClass => "LibraryClass",
            Attribute::JavaLibraryClass => "JavaLibraryClass",
            Attribute::Phantom => "Phantom",
        }
    }

    /// Bit of this attribute in the engine bitmask, if it has one
    pub fn bit(&self) -> Option<u32> {
        MODIFIER_BITS
            .iter()
            .find(|(_, attr)| attr == self)
            .map(|(bit, _)| *bit)
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode a modifier bitmask into attributes, lowest bit first.
///
/// Any bit outside the known layout fails the whole decode.
pub fn decode_modifiers(bits: u32) -> LiftResult<Vec<Attribute>> {
    let mut remaining = bits;
    let mut attrs = Vec::new();
    for &(bit, attr) in MODIFIER_BITS {
        if bits & bit != 0 {
            attrs.push(attr);
            remaining &= !bit;
        }
    }
    if remaining != 0 {
        return Err(LiftError::UnknownModifier { bits: remaining });
    }
    Ok(attrs)
}

/// Render an attribute list as lower-cased, space-separated names
pub fn render_attributes(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .map(|a| a.as_str().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_public_static_final() {
        let attrs = decode_modifiers(0x0019).unwrap();
        assert_eq!(attrs, vec![Attribute::Public, Attribute::Static, Attribute::Final]);
        assert_eq!(render_attributes(&attrs), "public static final");
    }

    #[test]
    fn test_decode_engine_bits() {
        let attrs = decode_modifiers(0x10001).unwrap();
        assert_eq!(attrs, vec![Attribute::Public, Attribute::Constructor]);
        assert!(decode_modifiers(0).unwrap().is_empty());
    }

    #[test]
    fn test_decode_unknown_bit() {
        let err = decode_modifiers(0x8001).unwrap_err();
        assert!(matches!(err, LiftError::UnknownModifier { bits: 0x8000 }));
    }

    #[test]
    fn test_attribute_bits() {
        assert_eq!(Attribute::Abstract.bit(), Some(0x400));
        assert_eq!(Attribute::Phantom.bit(), None);
        assert_eq!(format!("{}", Attribute::DeclaredSynchronized), "DECLARED_SYNCHRONIZED");
    }
}
