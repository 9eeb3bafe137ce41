//! Depth-first enumeration of every concrete register instance in a directory.

use std::fmt;

use crate::{
    directory::{RegisterDirectory, advance},
    errors::ResolveError,
    field::{FieldDescriptor, FieldKind},
    path::{PathSegment, RegisterPath},
};

/// One terminal register instance: its full path, offset from the root
/// directory's base and the descriptor of the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf<'a> {
    pub path: RegisterPath,
    pub offset: u64,
    pub descriptor: &'a FieldDescriptor,
}

impl Leaf<'_> {
    /// Width of this register in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.element_size()
    }
}

impl fmt::Display for Leaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x} {:>3} {}", self.offset, self.size(), self.path)
    }
}

/// Lazy pre-order walk returned by [RegisterDirectory::leaves].
///
/// Arrays are expanded in row-major order and composite arrays are descended
/// once per element, so every yielded path resolves to a single register.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<Frame<'a>>,
}

#[derive(Debug, Clone)]
enum Frame<'a> {
    /// Walking the fields of one block instance.
    Directory {
        directory: &'a RegisterDirectory,
        base: u64,
        path: RegisterPath,
        next_field: usize,
    },
    /// Walking the elements of one field.
    Elements {
        field: &'a FieldDescriptor,
        base: u64,
        path: RegisterPath,
        next: u64,
    },
}

impl<'a> Leaves<'a> {
    pub(crate) fn new(root: &'a RegisterDirectory) -> Self {
        Leaves {
            stack: vec![Frame::Directory {
                directory: root,
                base: 0,
                path: RegisterPath::default(),
                next_field: 0,
            }],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = Result<Leaf<'a>, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.last_mut()? {
                Frame::Directory {
                    directory,
                    base,
                    path,
                    next_field,
                } => {
                    let directory: &'a RegisterDirectory = *directory;
                    let Some(field) = directory.fields().get(*next_field) else {
                        self.stack.pop();
                        continue;
                    };
                    *next_field += 1;

                    let frame = Frame::Elements {
                        field,
                        base: *base,
                        path: path.clone(),
                        next: 0,
                    };
                    self.stack.push(frame);
                }
                Frame::Elements {
                    field,
                    base,
                    path,
                    next,
                } => {
                    let field: &'a FieldDescriptor = *field;
                    if *next >= field.element_count() {
                        self.stack.pop();
                        continue;
                    }

                    let indices = unravel(*next, field.dimensions());
                    *next += 1;

                    let offset = match advance(*base, field, &indices) {
                        Ok(offset) => offset,
                        Err(e) => return Some(Err(e)),
                    };
                    let path = path.join(PathSegment::indexed(field.name(), indices));

                    match field.kind() {
                        FieldKind::Terminal => {
                            if offset.checked_add(field.element_size()).is_none() {
                                return Some(Err(ResolveError::OffsetOverflow {
                                    field: field.name().to_string(),
                                }));
                            }

                            return Some(Ok(Leaf {
                                path,
                                offset,
                                descriptor: field,
                            }));
                        }
                        FieldKind::Composite(child) => self.stack.push(Frame::Directory {
                            directory: child.as_ref(),
                            base: offset,
                            path,
                            next_field: 0,
                        }),
                    }
                }
            }
        }
    }
}

/// Inverse of row-major flattening: the index tuple of element `flat`.
fn unravel(mut flat: u64, dimensions: &[u64]) -> Vec<u64> {
    let mut indices = vec![0; dimensions.len()];
    for (slot, &extent) in indices.iter_mut().zip(dimensions).rev() {
        *slot = flat % extent;
        flat /= extent;
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegisterDirectory {
        let lane = RegisterDirectory::new(
            "Lane_g",
            vec![
                FieldDescriptor::terminal("cfg", 0, vec![], 4).unwrap(),
                FieldDescriptor::terminal("cnt", 4, vec![2], 2).unwrap(),
            ],
        )
        .unwrap();

        RegisterDirectory::new(
            "Port_g",
            vec![
                FieldDescriptor::terminal("id", 0, vec![], 4).unwrap(),
                FieldDescriptor::composite("lane", 0x10, vec![2], 8, lane).unwrap(),
                FieldDescriptor::terminal("grid", 0x20, vec![2, 2], 1).unwrap(),
            ],
        )
        .unwrap()
    }

    fn listing(root: &RegisterDirectory) -> Vec<(String, u64)> {
        root.leaves()
            .map(|leaf| {
                let leaf = leaf.unwrap();
                (leaf.path.to_string(), leaf.offset)
            })
            .collect()
    }

    #[test]
    fn test_unravel() {
        assert_eq!(unravel(0, &[]), Vec::<u64>::new());
        assert_eq!(unravel(5, &[2, 3]), vec![1, 2]);
        assert_eq!(unravel(868, &[2, 4, 4, 32]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_depth_first_expansion() {
        let expected = vec![
            ("id", 0x0),
            ("lane[0].cfg", 0x10),
            ("lane[0].cnt[0]", 0x14),
            ("lane[0].cnt[1]", 0x16),
            ("lane[1].cfg", 0x18),
            ("lane[1].cnt[0]", 0x1c),
            ("lane[1].cnt[1]", 0x1e),
            ("grid[0][0]", 0x20),
            ("grid[0][1]", 0x21),
            ("grid[1][0]", 0x22),
            ("grid[1][1]", 0x23),
        ];

        let expected: Vec<_> = expected
            .into_iter()
            .map(|(path, offset)| (path.to_string(), offset))
            .collect();

        assert_eq!(listing(&sample()), expected);
    }

    #[test]
    fn test_leaves_match_resolution() {
        let root = sample();

        for leaf in root.leaves() {
            let leaf = leaf.unwrap();
            let resolved = root.resolve(leaf.path.segments()).unwrap();

            assert_eq!(resolved.offset, leaf.offset);
            assert_eq!(resolved.element_size, leaf.size());
            assert!(resolved.dimensions.is_empty());
        }
    }

    #[test]
    fn test_restartable() {
        let root = sample();
        assert_eq!(listing(&root), listing(&root));
    }

    #[test]
    fn test_empty_directory() {
        let root = RegisterDirectory::new("Empty", vec![]).unwrap();
        assert_eq!(root.leaves().count(), 0);
    }

    #[test]
    fn test_empty_child_block() {
        let empty = RegisterDirectory::new("Reserved_g", vec![]).unwrap();
        let root = RegisterDirectory::new(
            "Root",
            vec![
                FieldDescriptor::composite("reserved", 0, vec![4], 4, empty).unwrap(),
                FieldDescriptor::terminal("tail", 0x10, vec![], 4).unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(listing(&root), vec![("tail".to_string(), 0x10)]);
    }

    #[test]
    fn test_leaf_past_address_space() {
        let inner = RegisterDirectory::new(
            "Inner",
            vec![FieldDescriptor::terminal("reg", u64::MAX - 16, vec![4], 4).unwrap()],
        )
        .unwrap();
        let root = RegisterDirectory::new(
            "Outer",
            vec![FieldDescriptor::composite("inner", 0x10, vec![], 4, inner).unwrap()],
        )
        .unwrap();

        let leaves: Vec<_> = root.leaves().collect();

        assert!(leaves.iter().all(|leaf| leaf.is_err()));
        assert!(matches!(
            &leaves[0],
            Err(ResolveError::OffsetOverflow { field }) if field == "reg"
        ));
    }

    #[test]
    fn test_display() {
        let root = sample();
        let leaf = root.leaves().nth(2).unwrap().unwrap();

        assert_eq!(leaf.to_string(), "0x00000014   2 lane[0].cnt[0]");
    }
}
