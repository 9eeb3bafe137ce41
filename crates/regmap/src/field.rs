//! Definition of the named fields that make up a [crate::directory::RegisterDirectory].

use crate::{
    directory::RegisterDirectory,
    errors::{BuildError, ResolveError},
    path::is_name_char,
};

/// A single named field of a register block: a scalar or array of either
/// fixed-width registers or nested blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    byte_offset: u64,
    dimensions: Vec<u64>,
    element_size: u64,
    kind: FieldKind,
}

/// Distinguishes fixed-width register fields from nested register blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Primitive register (or array of registers) with no inner structure.
    Terminal,
    /// Register block whose layout is described by its own directory.
    Composite(Box<RegisterDirectory>),
}

impl FieldDescriptor {
    /// Builds a descriptor, checking that the name is a valid path segment,
    /// every dimension and the element size are positive, and the whole field
    /// fits in a 64-bit address space.
    pub fn new(
        name: impl Into<String>,
        byte_offset: u64,
        dimensions: Vec<u64>,
        element_size: u64,
        child: Option<RegisterDirectory>,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BuildError::EmptyFieldName);
        }

        if !name.chars().all(is_name_char) {
            return Err(BuildError::InvalidFieldName { field: name });
        }

        if let Some(axis) = dimensions.iter().position(|&extent| extent == 0) {
            return Err(BuildError::ZeroDimension { field: name, axis });
        }

        if element_size == 0 {
            return Err(BuildError::ZeroElementSize { field: name });
        }

        let span = dimensions
            .iter()
            .try_fold(element_size, |acc, &extent| acc.checked_mul(extent));
        if span.and_then(|span| byte_offset.checked_add(span)).is_none() {
            return Err(BuildError::SpanOverflow { field: name });
        }

        let kind = match child {
            Some(directory) => FieldKind::Composite(Box::new(directory)),
            None => FieldKind::Terminal,
        };

        Ok(Self {
            name,
            byte_offset,
            dimensions,
            element_size,
            kind,
        })
    }

    /// Primitive register field, e.g. a 32-bit register has `element_size` 4.
    pub fn terminal(
        name: impl Into<String>,
        byte_offset: u64,
        dimensions: Vec<u64>,
        element_size: u64,
    ) -> Result<Self, BuildError> {
        Self::new(name, byte_offset, dimensions, element_size, None)
    }

    /// Nested block field; `element_size` is the size of one instance of `child`.
    pub fn composite(
        name: impl Into<String>,
        byte_offset: u64,
        dimensions: Vec<u64>,
        element_size: u64,
        child: RegisterDirectory,
    ) -> Result<Self, BuildError> {
        Self::new(name, byte_offset, dimensions, element_size, Some(child))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the field relative to the start of its owning block.
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Array extents, outermost first. Empty for scalars.
    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    pub fn element_size(&self) -> u64 {
        self.element_size
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, FieldKind::Composite(_))
    }

    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }

    /// Directory describing one element of this field.
    pub fn child_directory(&self) -> Result<&RegisterDirectory, ResolveError> {
        match &self.kind {
            FieldKind::Composite(directory) => Ok(directory),
            FieldKind::Terminal => Err(ResolveError::NotComposite {
                field: self.name.clone(),
            }),
        }
    }

    /// Number of elements, 1 for scalars.
    pub fn element_count(&self) -> u64 {
        // Cannot overflow: checked against the span in `new`.
        self.dimensions.iter().product()
    }

    /// Total number of bytes covered by every element of the field.
    pub fn span(&self) -> u64 {
        self.element_count() * self.element_size
    }

    /// First byte past the end of the field, relative to the owning block.
    pub fn end(&self) -> u64 {
        self.byte_offset + self.span()
    }

    /// True if the byte ranges of `self` and `other` intersect.
    pub(crate) fn overlaps(&self, other: &FieldDescriptor) -> bool {
        self.byte_offset < other.end() && other.byte_offset < self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> RegisterDirectory {
        RegisterDirectory::new(
            "Block_g",
            vec![FieldDescriptor::terminal("state", 0, vec![], 4).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_terminal_scalar() {
        let field = FieldDescriptor::terminal("scratch_reg", 0x10, vec![], 4).unwrap();

        assert_eq!(field.name(), "scratch_reg");
        assert_eq!(field.byte_offset(), 0x10);
        assert!(field.dimensions().is_empty());
        assert!(!field.is_composite());
        assert!(!field.is_array());
        assert_eq!(field.element_count(), 1);
        assert_eq!(field.span(), 4);
        assert_eq!(field.end(), 0x14);
    }

    #[test]
    fn test_multi_dimensional_span() {
        let field = FieldDescriptor::terminal("imem_subword16", 0, vec![2, 4, 4, 32], 2).unwrap();

        assert_eq!(field.element_count(), 2 * 4 * 4 * 32);
        assert_eq!(field.span(), 2 * 4 * 4 * 32 * 2);
    }

    #[test]
    fn test_composite_child() {
        let field = FieldDescriptor::composite("block", 0x100, vec![3], 4, block()).unwrap();

        assert!(field.is_composite());
        assert_eq!(field.child_directory().unwrap().name(), "Block_g");
    }

    #[test]
    fn test_child_of_terminal() {
        let field = FieldDescriptor::terminal("state", 0, vec![], 4).unwrap();

        assert_eq!(
            field.child_directory().unwrap_err(),
            ResolveError::NotComposite {
                field: "state".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_empty_name() {
        assert_eq!(
            FieldDescriptor::terminal("  ", 0, vec![], 4).unwrap_err(),
            BuildError::EmptyFieldName
        );
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert_eq!(
            FieldDescriptor::terminal("regs", 0, vec![4, 0], 4).unwrap_err(),
            BuildError::ZeroDimension {
                field: "regs".to_string(),
                axis: 1
            }
        );
    }

    #[test]
    fn test_rejects_names_unreachable_by_path() {
        for name in ["a.b", " x", "r[0]", "lane 0"] {
            assert_eq!(
                FieldDescriptor::terminal(name, 0, vec![], 4).unwrap_err(),
                BuildError::InvalidFieldName {
                    field: name.to_string()
                }
            );
        }

        assert!(FieldDescriptor::terminal("$ctrl_0", 0, vec![], 4).is_ok());
    }

    #[test]
    fn test_rejects_zero_element_size() {
        assert_eq!(
            FieldDescriptor::terminal("regs", 0, vec![], 0).unwrap_err(),
            BuildError::ZeroElementSize {
                field: "regs".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_span_overflow() {
        assert_eq!(
            FieldDescriptor::terminal("huge", 0, vec![u64::MAX, 2], 4).unwrap_err(),
            BuildError::SpanOverflow {
                field: "huge".to_string()
            }
        );
        assert_eq!(
            FieldDescriptor::terminal("late", u64::MAX - 2, vec![], 4).unwrap_err(),
            BuildError::SpanOverflow {
                field: "late".to_string()
            }
        );
    }

    #[test]
    fn test_overlaps() {
        let a = FieldDescriptor::terminal("a", 0, vec![2], 4).unwrap();
        let b = FieldDescriptor::terminal("b", 4, vec![], 4).unwrap();
        let c = FieldDescriptor::terminal("c", 8, vec![], 4).unwrap();

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }
}
