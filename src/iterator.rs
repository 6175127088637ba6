//! Flat traversal of expression nodes.
//!
//! When every operand shares one concrete layout and the broadcast is
//! trivial, flat positions line up across operands and an expression can be
//! walked without any coordinate bookkeeping. [`ExprIter`] is the flat
//! cursor of a node: a tuple of sub-cursors advanced together, functor on
//! read.
//!
//! Scalar operands contribute placeholder cursors with no position of their
//! own. Progress is therefore measured on a representative, the first
//! non-placeholder sub-cursor; distances take the maximum over all
//! positioned sub-cursors. An all-placeholder tuple (every operand a
//! scalar) is itself a placeholder and reports position 0.

use crate::functor::Functor;
use crate::operand::FlatCursor;

/// A tuple of flat cursors advanced in lockstep.
pub trait CursorSet {
    /// Tuple of the cursors' item types.
    type Items;

    /// True when every cursor is a placeholder.
    const ALL_PLACEHOLDER: bool;

    fn values(&self) -> Self::Items;

    fn step_next(&mut self);

    fn step_prev(&mut self);

    fn advance(&mut self, n: isize);

    /// Position of the first non-placeholder cursor, 0 if there is none.
    fn representative_position(&self) -> usize;

    /// Largest position difference over the non-placeholder cursors.
    fn max_distance(&self, other: &Self) -> usize;
}

macro_rules! impl_cursor_set {
    ($(($ty:ident, $idx:tt)),+) => {
        impl<$($ty: FlatCursor,)+> CursorSet for ($($ty,)+) {
            type Items = ($($ty::Item,)+);

            const ALL_PLACEHOLDER: bool = true $(&& $ty::IS_PLACEHOLDER)+;

            #[inline]
            fn values(&self) -> Self::Items {
                ($(self.$idx.value(),)+)
            }

            #[inline]
            fn step_next(&mut self) {
                $(self.$idx.step_next();)+
            }

            #[inline]
            fn step_prev(&mut self) {
                $(self.$idx.step_prev();)+
            }

            #[inline]
            fn advance(&mut self, n: isize) {
                $(self.$idx.advance(n);)+
            }

            #[inline]
            fn representative_position(&self) -> usize {
                $(
                    if !$ty::IS_PLACEHOLDER {
                        return self.$idx.position();
                    }
                )+
                0
            }

            #[inline]
            fn max_distance(&self, other: &Self) -> usize {
                let mut distance = 0;
                $(
                    if !$ty::IS_PLACEHOLDER {
                        distance =
                            distance.max(self.$idx.position().abs_diff(other.$idx.position()));
                    }
                )+
                distance
            }
        }
    };
}

impl_cursor_set!((A, 0));
impl_cursor_set!((A, 0), (B, 1));
impl_cursor_set!((A, 0), (B, 1), (C, 2));
impl_cursor_set!((A, 0), (B, 1), (C, 2), (D, 3));

/// Flat cursor over an expression node.
#[derive(Debug, Clone)]
pub struct ExprIter<'a, F, C> {
    f: &'a F,
    cursors: C,
}

impl<'a, F, C> ExprIter<'a, F, C> {
    pub(crate) fn new(f: &'a F, cursors: C) -> Self {
        ExprIter { f, cursors }
    }
}

impl<F, C: CursorSet> ExprIter<'_, F, C> {
    /// Number of positions between two cursors of the same expression.
    pub fn distance_to(&self, other: &Self) -> usize {
        self.cursors.max_distance(&other.cursors)
    }
}

impl<F, C: CursorSet> PartialEq for ExprIter<'_, F, C> {
    fn eq(&self, other: &Self) -> bool {
        self.cursors.representative_position() == other.cursors.representative_position()
    }
}

impl<F, C: CursorSet> PartialOrd for ExprIter<'_, F, C> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.cursors
            .representative_position()
            .partial_cmp(&other.cursors.representative_position())
    }
}

impl<F, C> FlatCursor for ExprIter<'_, F, C>
where
    C: CursorSet,
    F: Functor<C::Items>,
{
    type Item = F::Output;

    const IS_PLACEHOLDER: bool = C::ALL_PLACEHOLDER;

    #[inline]
    fn value(&self) -> F::Output {
        self.f.apply(self.cursors.values())
    }

    #[inline]
    fn step_next(&mut self) {
        self.cursors.step_next();
    }

    #[inline]
    fn step_prev(&mut self) {
        self.cursors.step_prev();
    }

    #[inline]
    fn advance(&mut self, n: isize) {
        self.cursors.advance(n);
    }

    #[inline]
    fn position(&self) -> usize {
        self.cursors.representative_position()
    }
}

/// Iterator over an expression's values in flat storage order.
///
/// Obtained from [`crate::function::FnExpr::flat_values`], which checks that
/// flat traversal is valid before handing one out.
#[derive(Debug, Clone)]
pub struct FlatValues<'a, F, C> {
    iter: ExprIter<'a, F, C>,
    remaining: usize,
}

impl<'a, F, C> FlatValues<'a, F, C> {
    pub(crate) fn new(iter: ExprIter<'a, F, C>, len: usize) -> Self {
        FlatValues { iter, remaining: len }
    }
}

impl<F, C> Iterator for FlatValues<'_, F, C>
where
    C: CursorSet,
    F: Functor<C::Items>,
{
    type Item = F::Output;

    fn next(&mut self) -> Option<F::Output> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.iter.value();
        self.iter.step_next();
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<F, C> ExactSizeIterator for FlatValues<'_, F, C>
where
    C: CursorSet,
    F: Functor<C::Items>,
{
}
