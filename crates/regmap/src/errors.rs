//! Error types for directory construction, path parsing and address resolution.

use thiserror::Error;

/// Errors produced while building a [crate::field::FieldDescriptor] or a
/// [crate::directory::RegisterDirectory].
///
/// These indicate a malformed register description and abort construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Field name is empty or only whitespace.
    #[error("field name is empty")]
    EmptyFieldName,
    /// Field name contains a character that cannot appear in a path segment.
    #[error("field name `{field}` is not a valid path segment")]
    InvalidFieldName { field: String },
    /// Two fields of the same directory share a name.
    #[error("duplicate field `{field}` in `{directory}`")]
    DuplicateFieldName { directory: String, field: String },
    /// An array dimension has extent zero.
    #[error("field `{field}` declares a zero extent on axis {axis}")]
    ZeroDimension { field: String, axis: usize },
    /// Element size is zero.
    #[error("field `{field}` declares a zero element size")]
    ZeroElementSize { field: String },
    /// The field's byte range does not fit in 64 bits.
    #[error("field `{field}` spans past the 64-bit address space")]
    SpanOverflow { field: String },
    /// Two sibling fields share at least one byte.
    #[error("fields `{first}` and `{second}` overlap in `{directory}`")]
    OverlappingFields {
        directory: String,
        first: String,
        second: String,
    },
    /// A composite field's child block is larger than the declared element size.
    #[error("field `{field}` has element size {element_size} but its block spans {span} bytes")]
    ChildExceedsElement {
        field: String,
        span: u64,
        element_size: u64,
    },
    /// A field refers to a type that is not described.
    #[error("field `{field}` refers to unknown type `{type_name}`")]
    UnknownType { field: String, type_name: String },
    /// A type contains itself, directly or through other types.
    #[error("type `{type_name}` contains itself")]
    RecursiveType { type_name: String },
}

/// Errors produced while parsing a textual register path such as `block[5].state`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path has no segments.
    #[error("empty register path")]
    Empty,
    /// A segment has no name (e.g. `a..b` or a leading dot).
    #[error("empty path segment at position {position}")]
    EmptySegment { position: usize },
    /// An index list was opened but never closed.
    #[error("unclosed `[` in segment `{segment}`")]
    UnclosedBracket { segment: String },
    /// An index is not a non-negative integer.
    #[error("invalid index `{text}` in segment `{segment}`")]
    InvalidIndex { segment: String, text: String },
    /// A character that cannot appear at this point of a segment.
    #[error("unexpected `{character}` in segment `{segment}`")]
    UnexpectedCharacter { segment: String, character: char },
}

/// Errors produced while resolving a path against a directory.
///
/// All of them are recoverable and meant to be shown to whoever typed the path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No field with this name exists at the current level.
    #[error("no such register `{field}` in `{searched_in}`")]
    UnknownField { field: String, searched_in: String },
    /// An index is past the end of its axis.
    #[error("index {index} out of range for axis {axis} of `{field}` (extent {bound})")]
    IndexOutOfRange {
        field: String,
        axis: usize,
        index: u64,
        bound: u64,
    },
    /// Wrong number of indices for the field's dimensionality.
    #[error("`{field}` takes {expected} indices, {supplied} supplied")]
    ArityMismatch {
        field: String,
        supplied: usize,
        expected: usize,
    },
    /// The path continues past a terminal field.
    #[error("`{field}` is not a register block")]
    NotComposite { field: String },
    /// The computed address does not fit in 64 bits.
    #[error("address of `{field}` overflows 64 bits")]
    OffsetOverflow { field: String },
    /// The textual path could not be parsed.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors produced when loading a register map description from JSON.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid register map json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Errors produced by the process-wide [crate::registry].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A root directory was already published.
    #[error("a register directory is already installed")]
    AlreadyInstalled,
}
