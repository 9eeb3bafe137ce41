//! # regmap
//!
//! Hierarchical, string-addressable register maps.
//!
//! A chip's register space is described as a tree of [RegisterDirectory]
//! nodes. Each directory is a named block holding an ordered table of
//! [FieldDescriptor]s: plain registers, arrays of registers (any number of
//! dimensions), or nested blocks described by their own directory. Dotted
//! paths such as `tm_top.tm_caa_top.block[5].state` resolve to a byte offset
//! from the root's base, the element size and the shape of whatever the path
//! left unindexed. Every index is bounds-checked before an address is
//! produced.
//!
//! ## Example
//!
//! ```
//! use regmap::{FieldDescriptor, RegisterDirectory};
//!
//! let block = RegisterDirectory::new(
//!     "Block_g",
//!     vec![FieldDescriptor::terminal("state", 0, vec![], 4).unwrap()],
//! )
//! .unwrap();
//! let root = RegisterDirectory::new(
//!     "Chip_reg",
//!     vec![FieldDescriptor::composite("block", 0, vec![3], 4, block).unwrap()],
//! )
//! .unwrap();
//!
//! let resolved = root.resolve_path("block[2].state").unwrap();
//! assert_eq!(resolved.offset, 8);
//! assert_eq!(resolved.element_size, 4);
//! assert!(root.resolve_path("block[3].state").is_err());
//! ```
//!
//! With the `serde` feature, maps can be loaded from a JSON description (see
//! [crate::serde]).

pub mod directory;
pub mod errors;
pub mod field;
pub mod leaves;
pub mod path;
pub mod registry;
pub mod resolve;
#[cfg(feature = "serde")]
pub mod serde;

pub use directory::RegisterDirectory;
#[cfg(feature = "serde")]
pub use errors::LoadError;
pub use errors::{BuildError, PathError, RegistryError, ResolveError};
pub use field::{FieldDescriptor, FieldKind};
pub use leaves::Leaf;
pub use path::{PathSegment, RegisterPath};
pub use resolve::Resolved;
