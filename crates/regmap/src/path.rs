//! Dotted register paths such as `tm_top.tm_caa_top.block[5].state`.
//!
//! A path is a list of segments separated by `.`. Each segment names a field
//! and may carry indices for array fields, either as separate brackets
//! (`regs[1][2]`) or as a tuple (`regs[1, 2]`). Indices are decimal or
//! `0x`-prefixed hexadecimal.

use std::{fmt, str::FromStr};

use crate::errors::PathError;

/// One step of a [RegisterPath]: a field name plus the indices applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: String,
    /// Indices into the field's dimensions, outermost first. May be empty.
    pub indices: Vec<u64>,
}

impl PathSegment {
    pub fn new(name: impl Into<String>) -> Self {
        PathSegment {
            name: name.into(),
            indices: Vec::new(),
        }
    }

    pub fn indexed(name: impl Into<String>, indices: Vec<u64>) -> Self {
        PathSegment {
            name: name.into(),
            indices,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for index in &self.indices {
            write!(f, "[{index}]")?;
        }

        Ok(())
    }
}

/// A full path from a directory down to one of its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RegisterPath {
    segments: Vec<PathSegment>,
}

impl RegisterPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        RegisterPath { segments }
    }

    /// Parses the textual form. See the module documentation for the grammar.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let segments = text
            .split('.')
            .enumerate()
            .map(|(position, raw)| parse_segment(raw, position))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RegisterPath { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Returns a copy of this path extended by `segment`.
    pub fn join(&self, segment: PathSegment) -> RegisterPath {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl From<Vec<PathSegment>> for RegisterPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        RegisterPath { segments }
    }
}

impl FromStr for RegisterPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegisterPath::parse(s)
    }
}

impl fmt::Display for RegisterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }

        Ok(())
    }
}

fn parse_segment(raw: &str, position: usize) -> Result<PathSegment, PathError> {
    let raw = raw.trim();
    let name_end = raw.find('[').unwrap_or(raw.len());
    let name = raw[..name_end].trim_end();

    if name.is_empty() {
        return Err(PathError::EmptySegment { position });
    }

    if let Some(character) = name.chars().find(|&c| !is_name_char(c)) {
        return Err(PathError::UnexpectedCharacter {
            segment: raw.to_string(),
            character,
        });
    }

    let mut indices = Vec::new();
    let mut rest = &raw[name_end..];

    loop {
        rest = rest.trim_start();
        let Some(after_open) = rest.strip_prefix('[') else {
            match rest.chars().next() {
                None => break,
                Some(character) => {
                    return Err(PathError::UnexpectedCharacter {
                        segment: raw.to_string(),
                        character,
                    });
                }
            }
        };

        let close = after_open
            .find(']')
            .ok_or_else(|| PathError::UnclosedBracket {
                segment: raw.to_string(),
            })?;

        for text in after_open[..close].split(',') {
            indices.push(parse_index(text.trim(), raw)?);
        }

        rest = &after_open[close + 1..];
    }

    Ok(PathSegment {
        name: name.to_string(),
        indices,
    })
}

fn parse_index(text: &str, segment: &str) -> Result<u64, PathError> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };

    parsed.map_err(|_| PathError::InvalidIndex {
        segment: segment.to_string(),
        text: text.to_string(),
    })
}

/// Characters allowed in a field name, and so in a path segment name.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
