//! RegisterDirectory: one level of a register map, resolving names to fields
//! and paths to offsets.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    errors::{BuildError, PathError, ResolveError},
    field::{FieldDescriptor, FieldKind},
    leaves::Leaves,
    path::{PathSegment, RegisterPath},
    resolve::{Resolved, flat_index},
};

/// A named register block: an ordered table of [FieldDescriptor]s.
///
/// Directories are built bottom-up (children first) and never change after
/// construction. Each composite field owns its child directory, so a map is a
/// strict tree rooted at the chip-level directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDirectory {
    name: String,
    /// Fields in declaration order.
    fields: Vec<FieldDescriptor>,
    /// Field name to position in `fields`.
    index: HashMap<String, usize>,
}

impl RegisterDirectory {
    /// Builds a directory named `name` (the block's type name) from its fields.
    /// Fails if two fields share a name.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Self, BuildError> {
        let name = name.into();
        let mut index = HashMap::with_capacity(fields.len());

        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name().to_string(), position).is_some() {
                return Err(BuildError::DuplicateFieldName {
                    directory: name,
                    field: field.name().to_string(),
                });
            }
        }

        debug!(directory = %name, fields = fields.len(), "built register directory");

        Ok(Self {
            name,
            fields,
            index,
        })
    }

    /// Type name of the block this directory describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of bytes from the block base to the end of its last field.
    pub fn span(&self) -> u64 {
        self.fields.iter().map(FieldDescriptor::end).max().unwrap_or(0)
    }

    pub fn lookup(&self, name: &str) -> Result<&FieldDescriptor, ResolveError> {
        self.index
            .get(name)
            .map(|&position| &self.fields[position])
            .ok_or_else(|| ResolveError::UnknownField {
                field: name.to_string(),
                searched_in: self.name.clone(),
            })
    }

    /// Resolves `path` to an offset from this directory's base, the size of
    /// one element at the end of the path and the axes left unindexed.
    ///
    /// Every segment but the last must name a composite field. An array field
    /// is either indexed fully or not at all, in which case the path continues
    /// from its first element. The last segment may index a prefix of its
    /// axes or none at all.
    pub fn resolve(&self, path: &[PathSegment]) -> Result<Resolved, ResolveError> {
        let Some((last, parents)) = path.split_last() else {
            return Err(ResolveError::Path(PathError::Empty));
        };

        let mut offset = 0u64;
        let mut current = self;

        for segment in parents {
            let field = current.lookup(&segment.name)?;
            let directory = field.child_directory()?;

            let partial = segment.indices.len() != field.dimensions().len();
            if !segment.indices.is_empty() && partial {
                return Err(ResolveError::ArityMismatch {
                    field: segment.name.clone(),
                    supplied: segment.indices.len(),
                    expected: field.dimensions().len(),
                });
            }

            offset = advance(offset, field, &segment.indices)?;
            trace!(field = %segment.name, offset, "descending");
            current = directory;
        }

        let field = current.lookup(&last.name)?;
        if last.indices.len() > field.dimensions().len() {
            return Err(ResolveError::ArityMismatch {
                field: last.name.clone(),
                supplied: last.indices.len(),
                expected: field.dimensions().len(),
            });
        }

        offset = advance(offset, field, &last.indices)?;
        trace!(field = %last.name, offset, "resolved");

        let resolved = Resolved {
            offset,
            element_size: field.element_size(),
            dimensions: field.dimensions()[last.indices.len()..].to_vec(),
        };

        // every element of the residual array must be addressable too
        if resolved.end().is_none() {
            return Err(ResolveError::OffsetOverflow {
                field: last.name.clone(),
            });
        }

        Ok(resolved)
    }

    /// Parses `path` (e.g. `tm_top.block[5].state`) and resolves it.
    pub fn resolve_path(&self, path: &str) -> Result<Resolved, ResolveError> {
        let path = RegisterPath::parse(path)?;
        self.resolve(path.segments())
    }

    /// Depth-first iterator over every concrete terminal register instance,
    /// with array indices expanded.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self)
    }

    /// Checks that no two sibling fields share a byte and that every nested
    /// block fits in its declared element size, recursively.
    ///
    /// Not enforced by [RegisterDirectory::new]: generated maps may place
    /// several fields at offset 0 of their parent.
    pub fn validate_layout(&self) -> Result<(), BuildError> {
        let mut by_offset: Vec<&FieldDescriptor> = self.fields.iter().collect();
        by_offset.sort_by_key(|field| (field.byte_offset(), field.end()));

        for pair in by_offset.windows(2) {
            if pair[0].overlaps(pair[1]) {
                return Err(BuildError::OverlappingFields {
                    directory: self.name.clone(),
                    first: pair[0].name().to_string(),
                    second: pair[1].name().to_string(),
                });
            }
        }

        for field in &self.fields {
            if let FieldKind::Composite(child) = field.kind() {
                let span = child.span();
                if span > field.element_size() {
                    return Err(BuildError::ChildExceedsElement {
                        field: field.name().to_string(),
                        span,
                        element_size: field.element_size(),
                    });
                }

                child.validate_layout()?;
            }
        }

        Ok(())
    }
}

/// Adds the contribution of `field` indexed by `indices` to `offset`,
/// checking every index against its axis.
pub(crate) fn advance(
    offset: u64,
    field: &FieldDescriptor,
    indices: &[u64],
) -> Result<u64, ResolveError> {
    for (axis, (&index, &bound)) in indices.iter().zip(field.dimensions()).enumerate() {
        if index >= bound {
            return Err(ResolveError::IndexOutOfRange {
                field: field.name().to_string(),
                axis,
                index,
                bound,
            });
        }
    }

    let overflow = || ResolveError::OffsetOverflow {
        field: field.name().to_string(),
    };

    let flat = flat_index(indices, field.dimensions()).ok_or_else(overflow)?;

    flat.checked_mul(field.element_size())
        .and_then(|delta| delta.checked_add(field.byte_offset()))
        .and_then(|delta| offset.checked_add(delta))
        .ok_or_else(overflow)
}
