//! Result of resolving a register path: where it lives and what shape it has.

use crate::errors::ResolveError;

/// Location and shape of a resolved path, relative to the directory it was
/// resolved against.
///
/// `offset` points at the first element; `dimensions` holds the axes the path
/// left unindexed (empty for a single register or block instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resolved {
    pub offset: u64,
    pub element_size: u64,
    pub dimensions: Vec<u64>,
}

impl Resolved {
    /// Absolute address given the base address of the directory.
    pub fn address(&self, base: u64) -> Result<u64, ResolveError> {
        base.checked_add(self.offset)
            .ok_or_else(|| ResolveError::OffsetOverflow {
                field: format!("{base:#x} + {:#x}", self.offset),
            })
    }

    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Number of elements covered, 1 for a scalar.
    pub fn element_count(&self) -> u64 {
        self.dimensions.iter().product()
    }

    /// Number of bytes covered by every element, `None` if that does not fit
    /// in a `u64`.
    pub fn byte_len(&self) -> Option<u64> {
        self.dimensions
            .iter()
            .try_fold(self.element_size, |acc, &extent| acc.checked_mul(extent))
    }

    /// Offset one past the last byte covered, `None` past the address space.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.byte_len()?)
    }

    /// Offset of every element in row-major order. Stops early at the end of
    /// the address space, which cannot happen for a [Resolved] returned by
    /// [crate::RegisterDirectory::resolve].
    pub fn element_offsets(&self) -> ElementOffsets {
        ElementOffsets {
            next: Some(self.offset),
            element_size: self.element_size,
            remaining: self.element_count(),
        }
    }
}

/// Iterator returned by [Resolved::element_offsets].
///
/// Row-major layout makes consecutive flat indices consecutive elements, so
/// this walks the residual array with a fixed stride.
#[derive(Debug, Clone)]
pub struct ElementOffsets {
    next: Option<u64>,
    element_size: u64,
    remaining: u64,
}

impl Iterator for ElementOffsets {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let current = self.next?;
        self.remaining -= 1;
        self.next = current.checked_add(self.element_size);

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let reachable = match self.next {
            Some(next) => (u64::MAX - next)
                .checked_div(self.element_size)
                .map_or(u64::MAX, |n| n.saturating_add(1)),
            None => 0,
        };

        match usize::try_from(self.remaining.min(reachable)) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Flat row-major index of `indices` within an array of shape `dimensions`,
/// assuming `indices` is a prefix of the full index tuple. Axes left out are
/// treated as index 0, so the result is in units of whole elements.
///
/// Bounds are not checked here.
pub(crate) fn flat_index(indices: &[u64], dimensions: &[u64]) -> Option<u64> {
    dimensions
        .iter()
        .enumerate()
        .try_fold(0u64, |flat, (axis, &extent)| {
            let index = indices.get(axis).copied().unwrap_or(0);
            flat.checked_mul(extent)?.checked_add(index)
        })
}
