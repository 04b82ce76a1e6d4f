//! Semantic types for command-line argument values.
//!
//! [`CliType`] is a small type lattice describing what kind of data an
//! argument holds, independent of the argument's *shape* (that is
//! [`FlagArg`](crate::FlagArg)'s job). Types are inferred heuristically from
//! help text, so the lattice includes a reduction operation,
//! [`CliType::lowest_common_type`], that finds a single representation for a
//! set of possibly-disagreeing inferences.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by type reduction.
#[derive(Debug, Error)]
pub enum TypeError {
    /// The given types include complex types (file, directory, list, tuple,
    /// dict) that cannot degrade to a shared representation.
    #[error("no common type between {0}")]
    NoCommonType(String),
}

/// The semantic type of a single command-line value.
///
/// # Examples
///
/// ```
/// use cli_model_core::CliType;
///
/// let ty = CliType::default();
/// assert_eq!(ty, CliType::String);
///
/// let choices = CliType::Enum { values: vec!["sam".into(), "bam".into()] };
/// assert!(matches!(choices, CliType::Enum { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CliType {
    /// A free-form string (the universal fallback).
    #[default]
    String,
    /// An integer value.
    Integer,
    /// A floating-point value.
    Float,
    /// A boolean value, usually the presence or absence of a flag.
    Boolean,
    /// A file path. `output` is true when the command writes the file
    /// rather than reading it.
    File { output: bool },
    /// A directory path, with the same input/output distinction as `File`.
    Directory { output: bool },
    /// One of a fixed set of string literal choices.
    Enum { values: Vec<String> },
    /// An arbitrary-length list of homogeneous values.
    List { value: Box<CliType> },
    /// A mapping between keys and values. Never produced by inference, but
    /// part of the lattice so reduction treats it as complex.
    Dict {
        key: Box<CliType>,
        value: Box<CliType>,
    },
    /// A fixed-length sequence of possibly-heterogeneous values.
    Tuple { values: Vec<CliType> },
}

/// Discriminant-only view of [`CliType`], used for lattice logic where the
/// payload is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    String,
    Integer,
    Float,
    Boolean,
    File,
    Directory,
    Enum,
    List,
    Dict,
    Tuple,
}

impl CliType {
    /// Returns the payload-free discriminant of this type.
    pub fn kind(&self) -> TypeKind {
        match self {
            CliType::String => TypeKind::String,
            CliType::Integer => TypeKind::Integer,
            CliType::Float => TypeKind::Float,
            CliType::Boolean => TypeKind::Boolean,
            CliType::File { .. } => TypeKind::File,
            CliType::Directory { .. } => TypeKind::Directory,
            CliType::Enum { .. } => TypeKind::Enum,
            CliType::List { .. } => TypeKind::List,
            CliType::Dict { .. } => TypeKind::Dict,
            CliType::Tuple { .. } => TypeKind::Tuple,
        }
    }

    /// True for types that have no simpler representation: filesystem paths
    /// and container types.
    pub fn is_complex(&self) -> bool {
        matches!(
            self.kind(),
            TypeKind::File | TypeKind::Directory | TypeKind::List | TypeKind::Dict | TypeKind::Tuple
        )
    }

    /// True when this is a filesystem type the command writes to.
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            CliType::File { output: true } | CliType::Directory { output: true }
        )
    }

    /// The set of other kinds this type can degrade to without losing
    /// validity. An integer can always be read as a float; nothing else
    /// degrades.
    pub fn representable(&self) -> &'static [TypeKind] {
        match self.kind() {
            TypeKind::Integer => &[TypeKind::Float],
            _ => &[],
        }
    }

    /// Reduces a set of types to the most specific type every member can
    /// degrade to.
    ///
    /// A single kind reduces to itself; integers and floats reduce to
    /// [`CliType::Float`]; any other mix of primitives reduces to
    /// [`CliType::String`]. Complex types (file, directory, list, dict,
    /// tuple) mixed with anything else have no common representation and
    /// produce [`TypeError::NoCommonType`]. An empty input reduces to the
    /// universal fallback, [`CliType::String`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cli_model_core::CliType;
    ///
    /// let ty = CliType::lowest_common_type(&[CliType::Integer, CliType::Float]).unwrap();
    /// assert_eq!(ty, CliType::Float);
    /// ```
    pub fn lowest_common_type(types: &[CliType]) -> Result<CliType, TypeError> {
        let mut kinds: Vec<TypeKind> = Vec::new();
        for ty in types {
            if !kinds.contains(&ty.kind()) {
                kinds.push(ty.kind());
            }
        }

        match kinds.len() {
            0 => Ok(CliType::String),
            1 => Ok(types[0].clone()),
            _ => {
                if kinds.len() == 2
                    && kinds.contains(&TypeKind::Integer)
                    && kinds.contains(&TypeKind::Float)
                {
                    return Ok(CliType::Float);
                }
                if types.iter().any(CliType::is_complex) {
                    let names: Vec<String> =
                        kinds.iter().map(|kind| format!("{kind:?}")).collect();
                    return Err(TypeError::NoCommonType(names.join(", ")));
                }
                Ok(CliType::String)
            }
        }
    }
}

/// True when all types in the slice share one kind. Used to decide whether a
/// tuple can be flattened into a homogeneous list by renderers.
pub fn homogeneous(types: &[CliType]) -> bool {
    let mut kinds = types.iter().map(CliType::kind);
    match kinds.next() {
        Some(first) => kinds.all(|kind| kind == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_common_type_identical() {
        let ty = CliType::lowest_common_type(&[CliType::Integer, CliType::Integer]).unwrap();
        assert_eq!(ty, CliType::Integer);
    }

    #[test]
    fn test_lowest_common_type_numeric_widening() {
        let ty = CliType::lowest_common_type(&[CliType::Integer, CliType::Float]).unwrap();
        assert_eq!(ty, CliType::Float);
    }

    #[test]
    fn test_lowest_common_type_primitives_fall_back_to_string() {
        let ty = CliType::lowest_common_type(&[CliType::Boolean, CliType::Integer]).unwrap();
        assert_eq!(ty, CliType::String);
    }

    #[test]
    fn test_lowest_common_type_rejects_complex_mix() {
        let result =
            CliType::lowest_common_type(&[CliType::File { output: false }, CliType::Integer]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lowest_common_type_empty_is_string() {
        assert_eq!(
            CliType::lowest_common_type(&[]).unwrap(),
            CliType::String
        );
    }

    #[test]
    fn test_homogeneous_tuple_detection() {
        assert!(homogeneous(&[CliType::Integer, CliType::Integer]));
        assert!(!homogeneous(&[CliType::Integer, CliType::Float]));
        assert!(homogeneous(&[]));
    }

    #[test]
    fn test_serde_round_trip() {
        let ty = CliType::Tuple {
            values: vec![
                CliType::Float,
                CliType::List {
                    value: Box::new(CliType::String),
                },
            ],
        };
        let json = serde_json::to_string(&ty).unwrap();
        let back: CliType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }
}
