//! Elementwise functors applied by expression nodes.
//!
//! A [`Functor`] maps a tuple of operand values to one result value. The
//! argument tuple is heterogeneous, matching the operand tuple of the node,
//! so one functor type serves every value-type combination it has an impl
//! for. [`SimdFunctor`] is the batch form; a functor without it simply keeps
//! its nodes on the per-element path.

use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::MulAdd;

use crate::simd::{BatchCmp, BatchRepr, Bools};

/// Elementwise operation over a tuple of operand values.
pub trait Functor<Args> {
    type Output: Copy;

    fn apply(&self, args: Args) -> Self::Output;
}

/// Batch form of a [`Functor`], over a tuple of operand batches.
pub trait SimdFunctor<Batches> {
    type OutputBatch: BatchRepr;

    fn apply_batch(&self, batches: Batches) -> Self::OutputBatch;
}

macro_rules! arithmetic_functor {
    ($(#[$meta:meta])* $name:ident, $trait:ident, $method:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl<T> Functor<(T, T)> for $name
        where
            T: $trait<Output = T> + Copy,
        {
            type Output = T;

            #[inline(always)]
            fn apply(&self, (a, b): (T, T)) -> T {
                a.$method(b)
            }
        }

        impl<B> SimdFunctor<(B, B)> for $name
        where
            B: $trait<Output = B> + BatchRepr,
        {
            type OutputBatch = B;

            #[inline(always)]
            fn apply_batch(&self, (a, b): (B, B)) -> B {
                a.$method(b)
            }
        }
    };
}

arithmetic_functor!(
    /// Elementwise addition.
    Plus, Add, add
);
arithmetic_functor!(
    /// Elementwise subtraction.
    Minus, Sub, sub
);
arithmetic_functor!(
    /// Elementwise multiplication.
    Multiplies, Mul, mul
);
arithmetic_functor!(
    /// Elementwise division.
    Divides, Div, div
);

/// Elementwise negation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Negate;

impl<T> Functor<(T,)> for Negate
where
    T: Neg<Output = T> + Copy,
{
    type Output = T;

    #[inline(always)]
    fn apply(&self, (a,): (T,)) -> T {
        -a
    }
}

impl<B> SimdFunctor<(B,)> for Negate
where
    B: Neg<Output = B> + BatchRepr,
{
    type OutputBatch = B;

    #[inline(always)]
    fn apply_batch(&self, (a,): (B,)) -> B {
        -a
    }
}

/// Fused multiply-add over three operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fma;

impl<T> Functor<(T, T, T)> for Fma
where
    T: MulAdd<Output = T> + Copy,
{
    type Output = T;

    #[inline(always)]
    fn apply(&self, (a, b, c): (T, T, T)) -> T {
        a.mul_add(b, c)
    }
}

impl<B> SimdFunctor<(B, B, B)> for Fma
where
    B: Mul<Output = B> + Add<Output = B> + BatchRepr,
{
    type OutputBatch = B;

    #[inline(always)]
    fn apply_batch(&self, (a, b, c): (B, B, B)) -> B {
        a * b + c
    }
}

macro_rules! comparison_functor {
    ($(#[$meta:meta])* $name:ident, $op:tt, $lanes:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl<T> Functor<(T, T)> for $name
        where
            T: PartialOrd + Copy,
        {
            type Output = bool;

            #[inline(always)]
            fn apply(&self, (a, b): (T, T)) -> bool {
                a $op b
            }
        }

        impl<B> SimdFunctor<(B, B)> for $name
        where
            B: BatchCmp,
        {
            type OutputBatch = Bools;

            #[inline(always)]
            fn apply_batch(&self, (a, b): (B, B)) -> Bools {
                a.$lanes(b)
            }
        }
    };
}

comparison_functor!(
    /// Elementwise `<`.
    Less, <, lanes_lt
);
comparison_functor!(
    /// Elementwise `<=`.
    LessEqual, <=, lanes_le
);
comparison_functor!(
    /// Elementwise `>`.
    Greater, >, lanes_gt
);
comparison_functor!(
    /// Elementwise `>=`.
    GreaterEqual, >=, lanes_ge
);
// Equality only needs PartialEq, so these also cover types without an
// ordering such as complex numbers.
macro_rules! equality_functor {
    ($(#[$meta:meta])* $name:ident, $op:tt, $lanes:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl<T> Functor<(T, T)> for $name
        where
            T: PartialEq + Copy,
        {
            type Output = bool;

            #[inline(always)]
            fn apply(&self, (a, b): (T, T)) -> bool {
                a $op b
            }
        }

        impl<B> SimdFunctor<(B, B)> for $name
        where
            B: BatchCmp,
        {
            type OutputBatch = Bools;

            #[inline(always)]
            fn apply_batch(&self, (a, b): (B, B)) -> Bools {
                a.$lanes(b)
            }
        }
    };
}

equality_functor!(
    /// Elementwise `==`.
    Equal, ==, lanes_eq
);
equality_functor!(
    /// Elementwise `!=`.
    NotEqual, !=, lanes_ne
);
