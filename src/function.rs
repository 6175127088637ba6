//! Lazy elementwise function expressions.
//!
//! [`FnExpr`] couples a functor with a tuple of operands and behaves as an
//! operand itself: accessing an element applies the functor to the operands'
//! elements at that position, nothing is ever materialized, and nodes nest
//! into arbitrary expression trees.
//!
//! The operand tuple is abstracted by [`OperandSet`], implemented for tuples
//! of one to four operands. Everything a node needs from its children goes
//! through this trait: shape folding, element access, stepper and cursor
//! construction, batch loads. Heterogeneous operand types (dense arrays,
//! scalars, nested nodes, references to any of them) mix freely within one
//! tuple.
//!
//! The node's broadcast shape is resolved once and cached. Resolution folds
//! every operand's shape into a zeroed buffer, then folds a second time: the
//! first pass settles the extents, the second pass (idempotent once settled)
//! reports the exact per-operand triviality, whose conjunction is the node's
//! trivial-broadcast flag. The conjunction never short-circuits, since every
//! operand must merge its extents even when the flag is already false.

use crate::cache::{merge_static_shapes, ResolvedShape, ShapeCache};
use crate::functor::{
    Divides, Equal, Fma, Functor, Greater, GreaterEqual, Less, LessEqual, Minus, Multiplies,
    Negate, NotEqual, Plus, SimdFunctor,
};
use crate::iterator::{CursorSet, ExprIter, FlatValues};
use crate::layout::{Layout, DEFAULT_LAYOUT};
use crate::operand::{Operand, SimdOperand};
use crate::shape::{check_index, check_rank, compute_size, Shape};
use crate::simd::{BatchRepr, ConvertBatch, SelectedBatch, SimdScalar};
use crate::stepper::{ExprStepper, StepperSet};
use crate::{ExprError, Result};

/// The native batch of an operand's item type.
pub type NativeBatch<O> = <<O as Operand>::Item as SimdScalar>::Batch;

/// A heterogeneous tuple of operands, as seen by an expression node.
///
/// Implemented for tuples of one to four [`Operand`]s. All folds over the
/// tuple live here, so [`FnExpr`] itself is arity-agnostic.
pub trait OperandSet {
    /// Tuple of the operands' item types, the functor's argument tuple.
    type Items;

    /// Tuple of the operands' steppers.
    type Steppers<'s>: StepperSet<Items = Self::Items>
    where
        Self: 's;

    /// Tuple of the operands' flat cursors.
    type Cursors<'s>: CursorSet<Items = Self::Items>
    where
        Self: 's;

    /// Compile-time merge of the operands' static shapes; `Some` makes the
    /// node's cache fixed.
    const STATIC_SHAPE: Option<&'static [usize]>;

    /// Compile-time fold of the operands' layout preferences.
    const STATIC_LAYOUT: Layout;

    const ALL_SCALAR: bool;

    const CONTIGUOUS: bool;

    /// Largest operand rank, the rank of the broadcast shape.
    fn max_dimension(&self) -> usize;

    /// Runtime fold of the operands' layout preferences.
    fn layout(&self) -> Layout;

    /// Merge every operand's shape into `target` and return the conjunction
    /// of per-operand triviality. Every operand merges even when the
    /// conjunction is already false.
    fn broadcast_into(&self, target: &mut [usize]) -> Result<bool>;

    /// Relaxed (trailing-aligned) element access on every operand.
    fn element_values(&self, coords: &[usize]) -> Result<Self::Items>;

    /// Unchecked element access on every operand; each operand receives the
    /// trailing coordinates matching its rank.
    ///
    /// # Safety
    ///
    /// `coords` must have at least the rank of every operand, and the
    /// trailing coordinates must be in bounds for each operand's shape up to
    /// broadcast stretching.
    unsafe fn element_values_unchecked(&self, coords: &[usize]) -> Self::Items;

    /// Flat storage access on every operand.
    fn data_values(&self, index: usize) -> Self::Items;

    fn all_flat_traversal(&self, layout: Layout) -> bool;

    fn all_linear_assign(&self, strides: &[isize]) -> bool;

    fn steppers_begin(&self, shape: &[usize]) -> Self::Steppers<'_>;

    fn steppers_end(&self, shape: &[usize], layout: Layout) -> Self::Steppers<'_>;

    fn cursors_begin(&self) -> Self::Cursors<'_>;

    fn cursors_end(&self) -> Self::Cursors<'_>;
}

/// Batch-capable operand tuples, for a requested result batch `R`.
///
/// The per-operand batch type is decided by the coercion rule in
/// [`crate::simd`]: a mask-valued `R` coerces every operand to the common
/// representation (the first operand's native batch), otherwise mask and
/// complex operand batches are preserved and plain ones take `R`.
pub trait SimdOperandSet<R: BatchRepr>: OperandSet {
    /// Tuple of coerced operand batches, the batch functor's argument tuple.
    type Batches;

    /// Load a batch from every operand at flat position `index`.
    fn load_batches(&self, index: usize) -> Self::Batches;
}

macro_rules! impl_operand_set {
    (($first:ident, $fa:ident) $(, ($rest:ident, $ra:ident))*) => {
        impl<$first: Operand, $($rest: Operand,)*> OperandSet for ($first, $($rest,)*) {
            type Items = ($first::Item, $($rest::Item,)*);
            type Steppers<'s>
                = ($first::Stepper<'s>, $($rest::Stepper<'s>,)*)
            where
                Self: 's;
            type Cursors<'s>
                = ($first::Cursor<'s>, $($rest::Cursor<'s>,)*)
            where
                Self: 's;

            const STATIC_SHAPE: Option<&'static [usize]> = {
                let merged = $first::STATIC_SHAPE;
                $(let merged = merge_static_shapes(merged, $rest::STATIC_SHAPE);)*
                merged
            };

            const STATIC_LAYOUT: Layout = {
                let layout = $first::STATIC_LAYOUT;
                $(let layout = layout.combine($rest::STATIC_LAYOUT);)*
                layout
            };

            const ALL_SCALAR: bool = $first::IS_SCALAR $(&& $rest::IS_SCALAR)*;

            const CONTIGUOUS: bool = $first::CONTIGUOUS $(&& $rest::CONTIGUOUS)*;

            fn max_dimension(&self) -> usize {
                let ($fa, $($ra,)*) = self;
                let dim = $fa.dimension();
                $(let dim = dim.max($ra.dimension());)*
                dim
            }

            fn layout(&self) -> Layout {
                let ($fa, $($ra,)*) = self;
                let layout = $fa.layout();
                $(let layout = layout.combine($ra.layout());)*
                layout
            }

            fn broadcast_into(&self, target: &mut [usize]) -> Result<bool> {
                let ($fa, $($ra,)*) = self;
                let mut trivial = $fa.broadcast_shape(target)?;
                $(trivial &= $ra.broadcast_shape(target)?;)*
                Ok(trivial)
            }

            fn element_values(&self, coords: &[usize]) -> Result<Self::Items> {
                let ($fa, $($ra,)*) = self;
                Ok(($fa.element(coords)?, $($ra.element(coords)?,)*))
            }

            unsafe fn element_values_unchecked(&self, coords: &[usize]) -> Self::Items {
                let ($fa, $($ra,)*) = self;
                let n = coords.len();
                (
                    $fa.value_at_unchecked(&coords[n - $fa.dimension()..]),
                    $($ra.value_at_unchecked(&coords[n - $ra.dimension()..]),)*
                )
            }

            fn data_values(&self, index: usize) -> Self::Items {
                let ($fa, $($ra,)*) = self;
                ($fa.data_element(index), $($ra.data_element(index),)*)
            }

            fn all_flat_traversal(&self, layout: Layout) -> bool {
                let ($fa, $($ra,)*) = self;
                $fa.has_flat_traversal(layout) $(&& $ra.has_flat_traversal(layout))*
            }

            fn all_linear_assign(&self, strides: &[isize]) -> bool {
                let ($fa, $($ra,)*) = self;
                $fa.has_linear_assign(strides) $(&& $ra.has_linear_assign(strides))*
            }

            fn steppers_begin(&self, shape: &[usize]) -> Self::Steppers<'_> {
                let ($fa, $($ra,)*) = self;
                ($fa.stepper_begin(shape), $($ra.stepper_begin(shape),)*)
            }

            fn steppers_end(&self, shape: &[usize], layout: Layout) -> Self::Steppers<'_> {
                let ($fa, $($ra,)*) = self;
                ($fa.stepper_end(shape, layout), $($ra.stepper_end(shape, layout),)*)
            }

            fn cursors_begin(&self) -> Self::Cursors<'_> {
                let ($fa, $($ra,)*) = self;
                ($fa.cursor_begin(), $($ra.cursor_begin(),)*)
            }

            fn cursors_end(&self) -> Self::Cursors<'_> {
                let ($fa, $($ra,)*) = self;
                ($fa.cursor_end(), $($ra.cursor_end(),)*)
            }
        }

        impl<R, $first, $($rest,)*> SimdOperandSet<R> for ($first, $($rest,)*)
        where
            R: BatchRepr
                + crate::simd::SelectBatch<NativeBatch<$first>, NativeBatch<$first>>
                $(+ crate::simd::SelectBatch<NativeBatch<$rest>, NativeBatch<$first>>)*,
            $first: SimdOperand,
            $first::Item: SimdScalar,
            $($rest: SimdOperand,
            $rest::Item: SimdScalar,)*
            NativeBatch<$first>:
                ConvertBatch<SelectedBatch<R, NativeBatch<$first>, NativeBatch<$first>>>,
            $(NativeBatch<$rest>:
                ConvertBatch<SelectedBatch<R, NativeBatch<$rest>, NativeBatch<$first>>>,)*
        {
            type Batches = (
                SelectedBatch<R, NativeBatch<$first>, NativeBatch<$first>>,
                $(SelectedBatch<R, NativeBatch<$rest>, NativeBatch<$first>>,)*
            );

            #[inline]
            fn load_batches(&self, index: usize) -> Self::Batches {
                let ($fa, $($ra,)*) = self;
                (
                    $fa.load_batch(index).convert(),
                    $($ra.load_batch(index).convert(),)*
                )
            }
        }
    };
}

impl_operand_set!((A, a));
impl_operand_set!((A, a), (B, b));
impl_operand_set!((A, a), (B, b), (C, c));
impl_operand_set!((A, a), (B, b), (C, c), (D, d));

/// Lazy elementwise function expression over a tuple of operands.
///
/// Construction is cheap and performs no shape work; the broadcast shape is
/// resolved on the first query and cached. When every operand's shape is
/// statically known and equal, the cache is fixed at construction and no
/// resolution ever runs.
#[derive(Debug, Clone)]
pub struct FnExpr<F, Ops> {
    f: F,
    ops: Ops,
    cache: ShapeCache,
}

impl<F, Ops: OperandSet> FnExpr<F, Ops> {
    pub fn new(f: F, ops: Ops) -> Self {
        let cache = match Ops::STATIC_SHAPE {
            Some(dims) => ShapeCache::fixed(dims),
            None => ShapeCache::lazy(),
        };
        FnExpr { f, ops, cache }
    }

    #[inline]
    pub fn functor(&self) -> &F {
        &self.f
    }

    #[inline]
    pub fn operands(&self) -> &Ops {
        &self.ops
    }

    fn resolved(&self) -> Result<&ResolvedShape> {
        self.cache.get_or_resolve(|| {
            let rank = self.ops.max_dimension();
            let mut shape = Shape::from_elem(0, rank);
            self.ops.broadcast_into(&mut shape)?;
            // Second fold over the settled buffer: idempotent on extents,
            // and its conjunction is the exact trivial flag.
            let is_trivial = self.ops.broadcast_into(&mut shape)?;
            Ok(ResolvedShape { shape, is_trivial })
        })
    }

    /// True when no operand needs stretching against the resolved shape.
    pub fn is_trivial_broadcast(&self) -> Result<bool> {
        Ok(self.resolved()?.is_trivial)
    }

    /// Number of elements of the resolved shape.
    pub fn size(&self) -> Result<usize> {
        Ok(compute_size(&self.resolved()?.shape))
    }
}

impl<F, Ops> FnExpr<F, Ops>
where
    Ops: OperandSet,
    F: Functor<Ops::Items>,
{
    /// The node's value as a plain scalar, for rank-0 expressions.
    pub fn scalar(&self) -> Option<F::Output> {
        if self.ops.max_dimension() == 0 {
            Some(self.f.apply(self.ops.data_values(0)))
        } else {
            None
        }
    }

    /// Evaluate a batch at flat position `index`.
    ///
    /// Exists only when the result type, the functor, and every operand are
    /// batch-capable; scalar-only expressions fail to compile against it
    /// rather than fall back silently.
    #[inline]
    pub fn load_simd<R>(&self, index: usize) -> R
    where
        R: BatchRepr,
        Ops: SimdOperandSet<R>,
        F: SimdFunctor<<Ops as SimdOperandSet<R>>::Batches, OutputBatch = R>,
    {
        self.f.apply_batch(self.ops.load_batches(index))
    }

    /// Iterator over the expression's values in flat storage order.
    ///
    /// Requires a trivial broadcast and one concrete layout shared by every
    /// operand; otherwise flat positions would not line up across operands
    /// and the call fails with [`ExprError::NotFlatTraversable`].
    pub fn flat_values(&self) -> Result<FlatValues<'_, F, Ops::Cursors<'_>>> {
        let resolved = self.resolved()?;
        let layout = match self.ops.layout() {
            Layout::Any => DEFAULT_LAYOUT,
            l => l,
        };
        if !resolved.is_trivial || !layout.is_concrete() || !self.ops.all_flat_traversal(layout) {
            return Err(ExprError::NotFlatTraversable);
        }
        Ok(FlatValues::new(
            ExprIter::new(&self.f, self.ops.cursors_begin()),
            compute_size(&resolved.shape),
        ))
    }
}

impl<F, Ops> Operand for FnExpr<F, Ops>
where
    Ops: OperandSet,
    F: Functor<Ops::Items>,
{
    type Item = F::Output;
    type Stepper<'a>
        = ExprStepper<'a, F, Ops::Steppers<'a>>
    where
        Self: 'a;
    type Cursor<'a>
        = ExprIter<'a, F, Ops::Cursors<'a>>
    where
        Self: 'a;

    const STATIC_SHAPE: Option<&'static [usize]> = Ops::STATIC_SHAPE;
    const STATIC_LAYOUT: Layout = Ops::STATIC_LAYOUT;
    const CONTIGUOUS: bool = Ops::CONTIGUOUS;
    const IS_SCALAR: bool = Ops::ALL_SCALAR;

    fn dimension(&self) -> usize {
        match self.cache.get() {
            Some(resolved) => resolved.shape.len(),
            None => self.ops.max_dimension(),
        }
    }

    fn shape(&self) -> Result<&[usize]> {
        Ok(&self.resolved()?.shape)
    }

    #[inline]
    fn layout(&self) -> Layout {
        self.ops.layout()
    }

    fn value_at(&self, coords: &[usize]) -> Result<F::Output> {
        let resolved = self.resolved()?;
        check_rank(resolved.shape.len(), coords.len())?;
        check_index(&resolved.shape, coords)?;
        Ok(self.f.apply(self.ops.element_values(coords)?))
    }

    unsafe fn value_at_unchecked(&self, coords: &[usize]) -> F::Output {
        self.f.apply(self.ops.element_values_unchecked(coords))
    }

    fn element(&self, coords: &[usize]) -> Result<F::Output> {
        Ok(self.f.apply(self.ops.element_values(coords)?))
    }

    fn data_element(&self, index: usize) -> F::Output {
        self.f.apply(self.ops.data_values(index))
    }

    /// As a child of another node: an already resolved shape merges as one
    /// unit (carrying the cached trivial flag); an unresolved node folds its
    /// own operands directly into the parent's buffer.
    fn broadcast_shape(&self, target: &mut [usize]) -> Result<bool> {
        match self.cache.get() {
            Some(resolved) => {
                let matches = crate::shape::broadcast_dims_into(target, &resolved.shape)?;
                // Rank-0 nodes broadcast like scalars.
                Ok(resolved.shape.is_empty() || (matches && resolved.is_trivial))
            }
            None => self.ops.broadcast_into(target),
        }
    }

    fn has_flat_traversal(&self, layout: Layout) -> bool {
        // Resolves the cache if this node has not been queried yet; an
        // unresolvable shape cannot be traversed at all.
        self.resolved().map_or(false, |r| r.is_trivial) && self.ops.all_flat_traversal(layout)
    }

    fn has_linear_assign(&self, strides: &[isize]) -> bool {
        self.ops.all_linear_assign(strides)
    }

    fn stepper_begin(&self, shape: &[usize]) -> Self::Stepper<'_> {
        ExprStepper::new(&self.f, self.ops.steppers_begin(shape))
    }

    fn stepper_end(&self, shape: &[usize], layout: Layout) -> Self::Stepper<'_> {
        ExprStepper::new(&self.f, self.ops.steppers_end(shape, layout))
    }

    fn cursor_begin(&self) -> Self::Cursor<'_> {
        ExprIter::new(&self.f, self.ops.cursors_begin())
    }

    fn cursor_end(&self) -> Self::Cursor<'_> {
        ExprIter::new(&self.f, self.ops.cursors_end())
    }
}

impl<F, Ops, T> SimdOperand for FnExpr<F, Ops>
where
    Ops: OperandSet + SimdOperandSet<T::Batch>,
    F: Functor<Ops::Items, Output = T>
        + SimdFunctor<<Ops as SimdOperandSet<T::Batch>>::Batches, OutputBatch = T::Batch>,
    T: SimdScalar,
{
    #[inline]
    fn load_batch(&self, index: usize) -> T::Batch {
        self.load_simd(index)
    }
}

macro_rules! binary_expr_fn {
    ($(#[$meta:meta])* $name:ident, $functor:ident) => {
        $(#[$meta])*
        pub fn $name<A, B>(a: A, b: B) -> FnExpr<$functor, (A, B)>
        where
            A: Operand,
            B: Operand,
            $functor: Functor<(A::Item, B::Item)>,
        {
            FnExpr::new($functor, (a, b))
        }
    };
}

binary_expr_fn!(
    /// Lazy elementwise `a + b`.
    add, Plus
);
binary_expr_fn!(
    /// Lazy elementwise `a - b`.
    sub, Minus
);
binary_expr_fn!(
    /// Lazy elementwise `a * b`.
    mul, Multiplies
);
binary_expr_fn!(
    /// Lazy elementwise `a / b`.
    div, Divides
);
binary_expr_fn!(
    /// Lazy elementwise `a < b`.
    less, Less
);
binary_expr_fn!(
    /// Lazy elementwise `a <= b`.
    less_equal, LessEqual
);
binary_expr_fn!(
    /// Lazy elementwise `a > b`.
    greater, Greater
);
binary_expr_fn!(
    /// Lazy elementwise `a >= b`.
    greater_equal, GreaterEqual
);
binary_expr_fn!(
    /// Lazy elementwise `a == b`.
    equal, Equal
);
binary_expr_fn!(
    /// Lazy elementwise `a != b`.
    not_equal, NotEqual
);

/// Lazy elementwise `-a`.
pub fn neg<A>(a: A) -> FnExpr<Negate, (A,)>
where
    A: Operand,
    Negate: Functor<(A::Item,)>,
{
    FnExpr::new(Negate, (a,))
}

/// Lazy elementwise `a * b + c`.
pub fn fma<A, B, C>(a: A, b: B, c: C) -> FnExpr<Fma, (A, B, C)>
where
    A: Operand,
    B: Operand,
    C: Operand,
    Fma: Functor<(A::Item, B::Item, C::Item)>,
{
    FnExpr::new(Fma, (a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseArray;
    use crate::operand::ScalarOperand;
    use crate::simd::{BatchRepr, Bools, F64s};

    fn matrix() -> DenseArray<f64> {
        DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap()
    }

    fn row() -> DenseArray<f64> {
        DenseArray::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap()
    }

    #[test]
    fn test_broadcast_sum_access() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        assert_eq!(e.shape().unwrap(), &[2, 3]);
        assert_eq!(e.value_at(&[0, 0]).unwrap(), 11.0);
        assert_eq!(e.value_at(&[1, 2]).unwrap(), 36.0);
        assert!(!e.is_trivial_broadcast().unwrap());
    }

    #[test]
    fn test_same_shape_is_trivial() {
        let a = matrix();
        let b = matrix();
        let e = mul(&a, &b);
        assert!(e.is_trivial_broadcast().unwrap());
        assert_eq!(e.size().unwrap(), 6);
    }

    #[test]
    fn test_access_validation() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        assert!(matches!(
            e.value_at(&[0]),
            Err(ExprError::RankMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            e.value_at(&[0, 3]),
            Err(ExprError::OutOfBounds { axis: 1, index: 3, extent: 3 })
        ));
    }

    #[test]
    fn test_relaxed_element_access() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        // Extra leading coordinates address outer broadcast axes.
        assert_eq!(e.element(&[9, 1, 2]).unwrap(), 36.0);
    }

    #[test]
    fn test_nested_expression() {
        let m = matrix();
        let r = row();
        let s = ScalarOperand(2.0f64);
        let e = mul(add(&m, &r), s);
        assert_eq!(e.shape().unwrap(), &[2, 3]);
        assert_eq!(e.value_at(&[0, 1]).unwrap(), 44.0);
        assert_eq!(e.value_at(&[1, 0]).unwrap(), 28.0);
    }

    #[test]
    fn test_scalar_expression_converts() {
        let e = add(ScalarOperand(2.0f64), ScalarOperand(3.0f64));
        assert_eq!(e.dimension(), 0);
        assert_eq!(e.shape().unwrap(), &[] as &[usize]);
        assert_eq!(e.scalar(), Some(5.0));
        // Static all-scalar shape: the cache is fixed, never resolved.
        assert!(e.cache.is_initialized());

        let m = matrix();
        let e = add(&m, ScalarOperand(1.0f64));
        assert_eq!(e.scalar(), None);
    }

    #[test]
    fn test_shape_resolution_is_cached() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        assert!(!e.cache.is_initialized());
        let first = e.shape().unwrap().to_vec();
        assert!(e.cache.is_initialized());
        assert_eq!(e.shape().unwrap(), first.as_slice());
    }

    #[test]
    fn test_broadcast_mismatch_reported() {
        let m = matrix();
        let a = DenseArray::from_vec(vec![0.0; 4], &[4]).unwrap();
        let e = add(&m, &a);
        assert!(matches!(
            e.shape(),
            Err(ExprError::BroadcastMismatch { .. })
        ));
    }

    #[test]
    fn test_trivial_flag_settles_regardless_of_order() {
        // A (1, 3) operand merged before the (2, 3) one must not leave a
        // stale trivial flag.
        let narrow = DenseArray::from_vec(vec![1.0, 2.0, 3.0], &[1, 3]).unwrap();
        let wide = matrix();
        let e = add(&narrow, &wide);
        assert_eq!(e.shape().unwrap(), &[2, 3]);
        assert!(!e.is_trivial_broadcast().unwrap());
    }

    #[test]
    fn test_data_element_applies_functor() {
        let a = matrix();
        let b = matrix();
        let e = mul(&a, &b);
        assert_eq!(e.data_element(3), 16.0);
    }

    #[test]
    fn test_load_simd() {
        let a = matrix();
        let b = matrix();
        let e = add(&a, &b);
        let batch: F64s = e.load_simd(0);
        assert_eq!(batch.to_array(), [2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_load_simd_comparison_coerces_operands() {
        let a = matrix();
        let b = DenseArray::from_elem(3.5f64, &[2, 3]);
        let e = less(&a, &b);
        let mask: Bools = e.load_simd(0);
        assert_eq!(mask.to_array(), [true, true, true, false]);
    }

    #[test]
    fn test_nested_simd_load() {
        let a = matrix();
        let b = matrix();
        let e = mul(add(&a, &b), ScalarOperand(0.5f64));
        let batch: F64s = e.load_simd(0);
        assert_eq!(batch.to_array(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_unchecked_access() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        e.shape().unwrap();
        let v = unsafe { e.value_at_unchecked(&[1, 1]) };
        assert_eq!(v, 25.0);
    }
}
