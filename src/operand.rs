//! Operand capability traits and the scalar operand.
//!
//! [`Operand`] is the seam everything composes through: dense arrays,
//! broadcast scalars, and expression nodes all implement it, so any of them
//! can appear as a child of a function node. The trait carries three access
//! styles, from most general to fastest:
//! - coordinate access (`value_at`, `element`),
//! - axis-wise traversal through a [`Stepper`],
//! - flat traversal through a [`FlatCursor`] when layouts agree.
//!
//! Scalars participate as rank-0 operands that broadcast everywhere; their
//! cursors are placeholders that flat iteration skips when measuring
//! progress.

use crate::layout::Layout;
use crate::shape::broadcast_dims_into;
use crate::simd::SimdScalar;
use crate::Result;

/// A value-producing operand of an expression.
///
/// Coordinate access comes in a checked and an unchecked flavor, mirroring
/// the container accessors. `element` is the relaxed form used internally by
/// broadcasting: it accepts more coordinates than the operand's rank and
/// applies the trailing ones.
pub trait Operand {
    type Item: Copy;

    /// Axis-wise traversal cursor borrowing from the operand.
    type Stepper<'a>: Stepper<Item = Self::Item>
    where
        Self: 'a;

    /// Flat traversal cursor borrowing from the operand.
    type Cursor<'a>: FlatCursor<Item = Self::Item>
    where
        Self: 'a;

    /// Shape known at compile time, when there is one. Rank-0 operands
    /// report `Some(&[])`.
    const STATIC_SHAPE: Option<&'static [usize]> = None;

    /// Layout preference known at compile time.
    const STATIC_LAYOUT: Layout;

    /// True when flat storage order matches the advertised layout.
    const CONTIGUOUS: bool;

    /// True for rank-0 operands that broadcast everywhere.
    const IS_SCALAR: bool = false;

    fn dimension(&self) -> usize;

    /// The operand's own shape. Expression nodes resolve their broadcast
    /// shape on first call, hence the fallible signature.
    fn shape(&self) -> Result<&[usize]>;

    fn layout(&self) -> Layout;

    /// Checked coordinate access: exact rank, bounds validated.
    fn value_at(&self, coords: &[usize]) -> Result<Self::Item>;

    /// Unchecked coordinate access.
    ///
    /// # Safety
    ///
    /// `coords` must have exactly the operand's rank and every coordinate
    /// must be in bounds. Anything else is undefined behavior.
    unsafe fn value_at_unchecked(&self, coords: &[usize]) -> Self::Item;

    /// Relaxed coordinate access: `coords` may be longer than the operand's
    /// rank; the trailing coordinates apply, the rest address outer broadcast
    /// axes and are ignored.
    fn element(&self, coords: &[usize]) -> Result<Self::Item>;

    /// Access by flat storage position. For computed operands this evaluates
    /// the element at that position of each child's storage.
    fn data_element(&self, index: usize) -> Self::Item;

    /// Merge this operand's shape into a shared broadcast buffer.
    ///
    /// Returns whether this operand is trivially broadcast against the buffer
    /// content after the merge (see [`broadcast_dims_into`]).
    fn broadcast_shape(&self, target: &mut [usize]) -> Result<bool>;

    /// True when the operand can be traversed flat in the given layout
    /// without coordinate bookkeeping.
    fn has_flat_traversal(&self, layout: Layout) -> bool;

    /// True when a stride-based linear walk with the candidate strides reads
    /// this operand's elements in the right order. Assignment engines use
    /// this to pick the linear fast path for a destination's strides.
    fn has_linear_assign(&self, strides: &[isize]) -> bool;

    /// Stepper positioned at the first element, broadcast to `shape`.
    fn stepper_begin(&self, shape: &[usize]) -> Self::Stepper<'_>;

    /// Stepper positioned one past the last element in `layout` order,
    /// broadcast to `shape`.
    fn stepper_end(&self, shape: &[usize], layout: Layout) -> Self::Stepper<'_>;

    /// Flat cursor at position 0.
    fn cursor_begin(&self) -> Self::Cursor<'_>;

    /// Flat cursor one past the last position.
    fn cursor_end(&self) -> Self::Cursor<'_>;
}

/// Axis-wise traversal over a broadcast operand.
///
/// A stepper tracks one position per axis of the broadcast shape. Stepping a
/// stretched axis is a no-op on the underlying storage, which is what makes
/// broadcast traversal free of per-element coordinate math.
///
/// No method validates its arguments: steppers are driven by iteration
/// machinery that already knows the shape. Stepping outside it is a contract
/// violation with unspecified (not undefined) results for dense operands.
pub trait Stepper {
    type Item: Copy;

    /// Value at the current position.
    fn value(&self) -> Self::Item;

    /// Advance `n` positions along `axis`.
    fn step(&mut self, axis: usize, n: usize);

    /// Retreat `n` positions along `axis`.
    fn step_back(&mut self, axis: usize, n: usize);

    /// Return to position 0 along `axis` (from position `extent - 1`, as
    /// rollover during odometer iteration).
    fn reset(&mut self, axis: usize);

    /// Return to position `extent - 1` along `axis` (reverse rollover).
    fn reset_back(&mut self, axis: usize);

    /// Jump to the first element.
    fn to_begin(&mut self);

    /// Jump one past the last element in `layout` order.
    fn to_end(&mut self, layout: Layout);

    /// Advance one position along the trailing axis (the fastest-varying
    /// one under row-major order) and return the value at the new position.
    fn step_leading(&mut self) -> Self::Item;
}

/// Axis-wise traversal with batch loads along the trailing axis.
pub trait SimdStepper: Stepper
where
    Self::Item: SimdScalar,
{
    /// Load a batch starting at the current position along the trailing
    /// axis, then advance past the loaded lanes.
    fn step_batch(&mut self) -> <Self::Item as SimdScalar>::Batch;
}

/// Flat traversal over an operand in its own storage order.
///
/// Only meaningful when every operand of an expression shares one concrete
/// layout and broadcasts trivially; the expression iterator enforces that
/// before handing out cursors.
pub trait FlatCursor {
    type Item: Copy;

    /// Placeholder cursors carry no position; flat iteration skips them when
    /// comparing or measuring cursors. Scalar operands produce placeholders.
    const IS_PLACEHOLDER: bool = false;

    /// Value at the current position.
    fn value(&self) -> Self::Item;

    fn step_next(&mut self);

    fn step_prev(&mut self);

    /// Move by `n` positions, negative for backwards.
    fn advance(&mut self, n: isize);

    /// Current flat position. Pinned to 0 for placeholders.
    fn position(&self) -> usize;
}

/// Batch loads from flat storage, for operands whose layout permits them.
pub trait SimdOperand: Operand
where
    Self::Item: SimdScalar,
{
    /// Load [`crate::simd::BATCH_LANES`] consecutive elements starting at
    /// flat position `index` into the item's native batch.
    fn load_batch(&self, index: usize) -> <Self::Item as SimdScalar>::Batch;
}

// ============================================================================
// Scalar operands
// ============================================================================

/// A plain value lifted to a rank-0 operand.
///
/// Broadcasts against any shape, contributes `Layout::Any`, and yields the
/// same value at every position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarOperand<T>(pub T);

/// Stepper of a scalar operand: every movement is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct ScalarStepper<T> {
    value: T,
}

/// Flat cursor of a scalar operand: a placeholder with no position.
#[derive(Debug, Clone, Copy)]
pub struct ScalarCursor<T> {
    value: T,
}

impl<T: Copy> Operand for ScalarOperand<T> {
    type Item = T;
    type Stepper<'a>
        = ScalarStepper<T>
    where
        Self: 'a;
    type Cursor<'a>
        = ScalarCursor<T>
    where
        Self: 'a;

    const STATIC_SHAPE: Option<&'static [usize]> = Some(&[]);
    const STATIC_LAYOUT: Layout = Layout::Any;
    const CONTIGUOUS: bool = true;
    const IS_SCALAR: bool = true;

    #[inline]
    fn dimension(&self) -> usize {
        0
    }

    #[inline]
    fn shape(&self) -> Result<&[usize]> {
        Ok(&[])
    }

    #[inline]
    fn layout(&self) -> Layout {
        Layout::Any
    }

    fn value_at(&self, coords: &[usize]) -> Result<T> {
        crate::shape::check_rank(0, coords.len())?;
        Ok(self.0)
    }

    #[inline]
    unsafe fn value_at_unchecked(&self, _coords: &[usize]) -> T {
        self.0
    }

    #[inline]
    fn element(&self, _coords: &[usize]) -> Result<T> {
        Ok(self.0)
    }

    #[inline]
    fn data_element(&self, _index: usize) -> T {
        self.0
    }

    #[inline]
    fn broadcast_shape(&self, target: &mut [usize]) -> Result<bool> {
        // A scalar never constrains the buffer and is trivially broadcast
        // against any shape: its cursor is a placeholder.
        broadcast_dims_into(target, &[])?;
        Ok(true)
    }

    #[inline]
    fn has_flat_traversal(&self, _layout: Layout) -> bool {
        true
    }

    #[inline]
    fn has_linear_assign(&self, _strides: &[isize]) -> bool {
        true
    }

    fn stepper_begin(&self, _shape: &[usize]) -> ScalarStepper<T> {
        ScalarStepper { value: self.0 }
    }

    fn stepper_end(&self, _shape: &[usize], _layout: Layout) -> ScalarStepper<T> {
        ScalarStepper { value: self.0 }
    }

    fn cursor_begin(&self) -> ScalarCursor<T> {
        ScalarCursor { value: self.0 }
    }

    fn cursor_end(&self) -> ScalarCursor<T> {
        ScalarCursor { value: self.0 }
    }
}

impl<T: Copy> Stepper for ScalarStepper<T> {
    type Item = T;

    #[inline]
    fn value(&self) -> T {
        self.value
    }

    #[inline]
    fn step(&mut self, _axis: usize, _n: usize) {}

    #[inline]
    fn step_back(&mut self, _axis: usize, _n: usize) {}

    #[inline]
    fn reset(&mut self, _axis: usize) {}

    #[inline]
    fn reset_back(&mut self, _axis: usize) {}

    #[inline]
    fn to_begin(&mut self) {}

    #[inline]
    fn to_end(&mut self, _layout: Layout) {}

    #[inline]
    fn step_leading(&mut self) -> T {
        self.value
    }
}

impl<T: Copy + SimdScalar> SimdStepper for ScalarStepper<T> {
    #[inline]
    fn step_batch(&mut self) -> T::Batch {
        crate::simd::BatchRepr::splat(self.value)
    }
}

impl<T: Copy> FlatCursor for ScalarCursor<T> {
    type Item = T;

    const IS_PLACEHOLDER: bool = true;

    #[inline]
    fn value(&self) -> T {
        self.value
    }

    #[inline]
    fn step_next(&mut self) {}

    #[inline]
    fn step_prev(&mut self) {}

    #[inline]
    fn advance(&mut self, _n: isize) {}

    #[inline]
    fn position(&self) -> usize {
        0
    }
}

impl<T: Copy + SimdScalar> SimdOperand for ScalarOperand<T> {
    #[inline]
    fn load_batch(&self, _index: usize) -> T::Batch {
        crate::simd::BatchRepr::splat(self.0)
    }
}

// ============================================================================
// Operands by reference
// ============================================================================

impl<O: Operand> Operand for &O {
    type Item = O::Item;
    type Stepper<'a>
        = O::Stepper<'a>
    where
        Self: 'a;
    type Cursor<'a>
        = O::Cursor<'a>
    where
        Self: 'a;

    const STATIC_SHAPE: Option<&'static [usize]> = O::STATIC_SHAPE;
    const STATIC_LAYOUT: Layout = O::STATIC_LAYOUT;
    const CONTIGUOUS: bool = O::CONTIGUOUS;
    const IS_SCALAR: bool = O::IS_SCALAR;

    #[inline]
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    #[inline]
    fn shape(&self) -> Result<&[usize]> {
        (**self).shape()
    }

    #[inline]
    fn layout(&self) -> Layout {
        (**self).layout()
    }

    #[inline]
    fn value_at(&self, coords: &[usize]) -> Result<Self::Item> {
        (**self).value_at(coords)
    }

    #[inline]
    unsafe fn value_at_unchecked(&self, coords: &[usize]) -> Self::Item {
        (**self).value_at_unchecked(coords)
    }

    #[inline]
    fn element(&self, coords: &[usize]) -> Result<Self::Item> {
        (**self).element(coords)
    }

    #[inline]
    fn data_element(&self, index: usize) -> Self::Item {
        (**self).data_element(index)
    }

    #[inline]
    fn broadcast_shape(&self, target: &mut [usize]) -> Result<bool> {
        (**self).broadcast_shape(target)
    }

    #[inline]
    fn has_flat_traversal(&self, layout: Layout) -> bool {
        (**self).has_flat_traversal(layout)
    }

    #[inline]
    fn has_linear_assign(&self, strides: &[isize]) -> bool {
        (**self).has_linear_assign(strides)
    }

    #[inline]
    fn stepper_begin(&self, shape: &[usize]) -> Self::Stepper<'_> {
        (**self).stepper_begin(shape)
    }

    #[inline]
    fn stepper_end(&self, shape: &[usize], layout: Layout) -> Self::Stepper<'_> {
        (**self).stepper_end(shape, layout)
    }

    #[inline]
    fn cursor_begin(&self) -> Self::Cursor<'_> {
        (**self).cursor_begin()
    }

    #[inline]
    fn cursor_end(&self) -> Self::Cursor<'_> {
        (**self).cursor_end()
    }
}

impl<O: SimdOperand> SimdOperand for &O
where
    O::Item: SimdScalar,
{
    #[inline]
    fn load_batch(&self, index: usize) -> <O::Item as SimdScalar>::Batch {
        (**self).load_batch(index)
    }
}
