//! Lazily populated shape cache for expression nodes.
//!
//! A node's shape, dimension, and size are pure functions of its operand
//! shapes and the broadcast rule. The cache is the only mutable state on an
//! otherwise immutable node: statically-known shapes are fixed at
//! construction, dynamic shapes are resolved on first query and reused
//! thereafter.

use std::cell::OnceCell;

use crate::shape::Shape;

/// A resolved broadcast shape together with its triviality.
///
/// The broadcast is trivial iff every operand's own shape exactly equals the
/// resolved shape, i.e. no operand needs stretching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShape {
    pub shape: Shape,
    pub is_trivial: bool,
}

/// Shape cache with a fixed and a lazy variant behind one interface.
///
/// `Fixed` is chosen at node construction when the combined operand shape is
/// statically known; it never computes anything. `Lazy` is populated once and
/// reused; population is idempotent under repeated reads. The cell is `!Sync`,
/// so a first population racing across threads is rejected at compile time.
#[derive(Debug, Clone)]
pub enum ShapeCache {
    Fixed(ResolvedShape),
    Lazy(OnceCell<ResolvedShape>),
}

impl ShapeCache {
    /// Cache for a statically-known shape; always initialized.
    pub fn fixed(dims: &[usize]) -> Self {
        ShapeCache::Fixed(ResolvedShape {
            shape: Shape::from_slice(dims),
            is_trivial: true,
        })
    }

    /// Empty lazy cache.
    pub fn lazy() -> Self {
        ShapeCache::Lazy(OnceCell::new())
    }

    /// The resolved shape, if already available.
    #[inline]
    pub fn get(&self) -> Option<&ResolvedShape> {
        match self {
            ShapeCache::Fixed(r) => Some(r),
            ShapeCache::Lazy(cell) => cell.get(),
        }
    }

    /// True once the cache holds a resolved shape.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.get().is_some()
    }

    /// Return the cached shape, populating a lazy cache with `resolve` on
    /// first use. `resolve` runs at most once per node.
    pub fn get_or_resolve<E>(
        &self,
        resolve: impl FnOnce() -> std::result::Result<ResolvedShape, E>,
    ) -> std::result::Result<&ResolvedShape, E> {
        match self {
            ShapeCache::Fixed(r) => Ok(r),
            ShapeCache::Lazy(cell) => {
                if let Some(r) = cell.get() {
                    return Ok(r);
                }
                let resolved = resolve()?;
                Ok(cell.get_or_init(|| resolved))
            }
        }
    }
}

/// Compile-time merge of operand static shapes.
///
/// Conservative: `Some` only when both sides are statically known and equal
/// (all-scalar operand sets resolve to `Some(&[])`). Anything else defers to
/// the lazy cache.
pub const fn merge_static_shapes(
    a: Option<&'static [usize]>,
    b: Option<&'static [usize]>,
) -> Option<&'static [usize]> {
    match (a, b) {
        (Some(x), Some(y)) => {
            if dims_equal(x, y) {
                Some(x)
            } else {
                None
            }
        }
        _ => None,
    }
}

const fn dims_equal(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
