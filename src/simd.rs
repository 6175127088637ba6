//! Batch representations and the static batch-capability machinery.
//!
//! Vectorized evaluation is a purely type-level decision: batch paths exist
//! on an instantiation only when
//! - the scalar result type admits a batch representation ([`SimdScalar`]),
//! - every operand value type admits one,
//! - the functor exposes a compatible batch form (`SimdFunctor`),
//! - every operand exposes batch-capable access (`SimdOperand`).
//!
//! All four conditions surface as trait bounds on `load_simd`/`step_simd`;
//! nothing is ever checked at runtime.
//!
//! Batches are fixed at [`BATCH_LANES`] lanes over `wide` vectors. Boolean
//! batches are lane masks, complex batches are split real/imaginary pairs.
//! The operand-coercion rule is asymmetric and intentional: a boolean-valued
//! result forces every operand onto one common representation, while a
//! boolean- or complex-valued operand batch is preserved as-is, so that
//! mask and complex bit patterns are never reinterpreted as plain numeric
//! lanes.

use num_complex::{Complex32, Complex64};
use wide::{f32x4, f64x4, i32x4, i64x4};

/// Lane count shared by every batch representation.
pub const BATCH_LANES: usize = 4;

/// A hardware-vector representation of [`BATCH_LANES`] scalars.
pub trait BatchRepr: Copy {
    type Scalar: Copy;

    fn splat(value: Self::Scalar) -> Self;

    /// Load lanes from the first [`BATCH_LANES`] elements of a slice.
    ///
    /// Panics if the slice is shorter than [`BATCH_LANES`].
    fn from_slice(values: &[Self::Scalar]) -> Self;

    fn to_array(self) -> [Self::Scalar; BATCH_LANES];
}

/// Scalar types that admit a batch representation.
///
/// Absence of this impl is the type-level gate excluding a scalar type from
/// every vectorized path.
pub trait SimdScalar: Copy {
    type Batch: BatchRepr<Scalar = Self>;
}

/// Batch of four `f64` lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F64s(pub f64x4);

/// Batch of four `f32` lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F32s(pub f32x4);

/// Batch of four `i32` lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct I32s(pub i32x4);

/// Batch of four `i64` lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct I64s(pub i64x4);

/// Boolean lane mask, the batch form of `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bools(pub [bool; BATCH_LANES]);

/// Batch of four `Complex64` lanes, stored as split real/imaginary vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct C64s {
    pub re: f64x4,
    pub im: f64x4,
}

/// Batch of four `Complex32` lanes, stored as split real/imaginary vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct C32s {
    pub re: f32x4,
    pub im: f32x4,
}

macro_rules! impl_plain_batch {
    ($batch:ident, $vec:ident, $scalar:ty) => {
        impl BatchRepr for $batch {
            type Scalar = $scalar;

            #[inline(always)]
            fn splat(value: $scalar) -> Self {
                $batch($vec::splat(value))
            }

            #[inline(always)]
            fn from_slice(values: &[$scalar]) -> Self {
                $batch($vec::new([values[0], values[1], values[2], values[3]]))
            }

            #[inline(always)]
            fn to_array(self) -> [$scalar; BATCH_LANES] {
                self.0.to_array()
            }
        }

        impl SimdScalar for $scalar {
            type Batch = $batch;
        }
    };
}

impl_plain_batch!(F64s, f64x4, f64);
impl_plain_batch!(F32s, f32x4, f32);
impl_plain_batch!(I32s, i32x4, i32);
impl_plain_batch!(I64s, i64x4, i64);

impl BatchRepr for Bools {
    type Scalar = bool;

    #[inline(always)]
    fn splat(value: bool) -> Self {
        Bools([value; BATCH_LANES])
    }

    #[inline(always)]
    fn from_slice(values: &[bool]) -> Self {
        Bools([values[0], values[1], values[2], values[3]])
    }

    #[inline(always)]
    fn to_array(self) -> [bool; BATCH_LANES] {
        self.0
    }
}

impl SimdScalar for bool {
    type Batch = Bools;
}

macro_rules! impl_complex_batch {
    ($batch:ident, $vec:ident, $scalar:ty, $complex:ty) => {
        impl BatchRepr for $batch {
            type Scalar = $complex;

            #[inline(always)]
            fn splat(value: $complex) -> Self {
                $batch {
                    re: $vec::splat(value.re),
                    im: $vec::splat(value.im),
                }
            }

            #[inline(always)]
            fn from_slice(values: &[$complex]) -> Self {
                $batch {
                    re: $vec::new([values[0].re, values[1].re, values[2].re, values[3].re]),
                    im: $vec::new([values[0].im, values[1].im, values[2].im, values[3].im]),
                }
            }

            #[inline(always)]
            fn to_array(self) -> [$complex; BATCH_LANES] {
                let re = self.re.to_array();
                let im = self.im.to_array();
                [
                    <$complex>::new(re[0], im[0]),
                    <$complex>::new(re[1], im[1]),
                    <$complex>::new(re[2], im[2]),
                    <$complex>::new(re[3], im[3]),
                ]
            }
        }

        impl SimdScalar for $complex {
            type Batch = $batch;
        }
    };
}

impl_complex_batch!(C64s, f64x4, f64, Complex64);
impl_complex_batch!(C32s, f32x4, f32, Complex32);

// ============================================================================
// Batch arithmetic
// ============================================================================

macro_rules! impl_batch_arith {
    ($batch:ident) => {
        impl std::ops::Add for $batch {
            type Output = Self;
            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                $batch(self.0 + rhs.0)
            }
        }

        impl std::ops::Sub for $batch {
            type Output = Self;
            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                $batch(self.0 - rhs.0)
            }
        }
    };
}

impl_batch_arith!(F64s);
impl_batch_arith!(F32s);
impl_batch_arith!(I32s);
impl_batch_arith!(I64s);

impl std::ops::Mul for F64s {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        F64s(self.0 * rhs.0)
    }
}

impl std::ops::Mul for F32s {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        F32s(self.0 * rhs.0)
    }
}

impl std::ops::Mul for I32s {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        I32s(self.0 * rhs.0)
    }
}

impl std::ops::Mul for I64s {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        let a = self.0.to_array();
        let b = rhs.0.to_array();
        I64s(i64x4::new([a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]))
    }
}

impl std::ops::Div for F64s {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        F64s(self.0 / rhs.0)
    }
}

impl std::ops::Div for F32s {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        F32s(self.0 / rhs.0)
    }
}

impl std::ops::Neg for F64s {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        F64s(-self.0)
    }
}

impl std::ops::Neg for F32s {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        F32s(-self.0)
    }
}

impl std::ops::Neg for I32s {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        I32s(-self.0)
    }
}

impl std::ops::Neg for I64s {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        I64s(-self.0)
    }
}

macro_rules! impl_complex_arith {
    ($batch:ident) => {
        impl std::ops::Add for $batch {
            type Output = Self;
            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                $batch {
                    re: self.re + rhs.re,
                    im: self.im + rhs.im,
                }
            }
        }

        impl std::ops::Sub for $batch {
            type Output = Self;
            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                $batch {
                    re: self.re - rhs.re,
                    im: self.im - rhs.im,
                }
            }
        }

        impl std::ops::Mul for $batch {
            type Output = Self;
            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                $batch {
                    re: self.re * rhs.re - self.im * rhs.im,
                    im: self.re * rhs.im + self.im * rhs.re,
                }
            }
        }

        impl std::ops::Div for $batch {
            type Output = Self;
            #[inline(always)]
            fn div(self, rhs: Self) -> Self {
                let denom = rhs.re * rhs.re + rhs.im * rhs.im;
                $batch {
                    re: (self.re * rhs.re + self.im * rhs.im) / denom,
                    im: (self.im * rhs.re - self.re * rhs.im) / denom,
                }
            }
        }

        impl std::ops::Neg for $batch {
            type Output = Self;
            #[inline(always)]
            fn neg(self) -> Self {
                $batch {
                    re: -self.re,
                    im: -self.im,
                }
            }
        }
    };
}

impl_complex_arith!(C64s);
impl_complex_arith!(C32s);

// ============================================================================
// Batch comparison (mask-valued)
// ============================================================================

/// Lane-wise comparisons producing a [`Bools`] mask.
pub trait BatchCmp: BatchRepr {
    fn lanes_lt(self, rhs: Self) -> Bools;
    fn lanes_le(self, rhs: Self) -> Bools;
    fn lanes_gt(self, rhs: Self) -> Bools;
    fn lanes_ge(self, rhs: Self) -> Bools;
    fn lanes_eq(self, rhs: Self) -> Bools;
    fn lanes_ne(self, rhs: Self) -> Bools;
}

macro_rules! impl_batch_cmp {
    ($batch:ident) => {
        impl BatchCmp for $batch {
            #[inline(always)]
            fn lanes_lt(self, rhs: Self) -> Bools {
                let (a, b) = (self.to_array(), rhs.to_array());
                Bools([a[0] < b[0], a[1] < b[1], a[2] < b[2], a[3] < b[3]])
            }

            #[inline(always)]
            fn lanes_le(self, rhs: Self) -> Bools {
                let (a, b) = (self.to_array(), rhs.to_array());
                Bools([a[0] <= b[0], a[1] <= b[1], a[2] <= b[2], a[3] <= b[3]])
            }

            #[inline(always)]
            fn lanes_gt(self, rhs: Self) -> Bools {
                let (a, b) = (self.to_array(), rhs.to_array());
                Bools([a[0] > b[0], a[1] > b[1], a[2] > b[2], a[3] > b[3]])
            }

            #[inline(always)]
            fn lanes_ge(self, rhs: Self) -> Bools {
                let (a, b) = (self.to_array(), rhs.to_array());
                Bools([a[0] >= b[0], a[1] >= b[1], a[2] >= b[2], a[3] >= b[3]])
            }

            #[inline(always)]
            fn lanes_eq(self, rhs: Self) -> Bools {
                let (a, b) = (self.to_array(), rhs.to_array());
                Bools([a[0] == b[0], a[1] == b[1], a[2] == b[2], a[3] == b[3]])
            }

            #[inline(always)]
            fn lanes_ne(self, rhs: Self) -> Bools {
                let (a, b) = (self.to_array(), rhs.to_array());
                Bools([a[0] != b[0], a[1] != b[1], a[2] != b[2], a[3] != b[3]])
            }
        }
    };
}

impl_batch_cmp!(F64s);
impl_batch_cmp!(F32s);
impl_batch_cmp!(I32s);
impl_batch_cmp!(I64s);

// ============================================================================
// Batch conversion
// ============================================================================

/// Lane-wise conversion between batch representations.
pub trait ConvertBatch<Target: BatchRepr>: BatchRepr {
    fn convert(self) -> Target;
}

impl<B: BatchRepr> ConvertBatch<B> for B {
    #[inline(always)]
    fn convert(self) -> B {
        self
    }
}

macro_rules! impl_convert_plain {
    ($from:ident => $to:ident, $scalar:ty) => {
        impl ConvertBatch<$to> for $from {
            #[inline(always)]
            fn convert(self) -> $to {
                let a = self.to_array();
                $to::from_slice(&[
                    a[0] as $scalar,
                    a[1] as $scalar,
                    a[2] as $scalar,
                    a[3] as $scalar,
                ])
            }
        }
    };
}

impl_convert_plain!(F32s => F64s, f64);
impl_convert_plain!(F64s => F32s, f32);
impl_convert_plain!(I32s => I64s, i64);
impl_convert_plain!(I64s => I32s, i32);
impl_convert_plain!(I32s => F32s, f32);
impl_convert_plain!(I32s => F64s, f64);
impl_convert_plain!(I64s => F64s, f64);

impl ConvertBatch<C64s> for F64s {
    #[inline(always)]
    fn convert(self) -> C64s {
        C64s {
            re: self.0,
            im: f64x4::splat(0.0),
        }
    }
}

impl ConvertBatch<C32s> for F32s {
    #[inline(always)]
    fn convert(self) -> C32s {
        C32s {
            re: self.0,
            im: f32x4::splat(0.0),
        }
    }
}

// ============================================================================
// Operand batch coercion rule
// ============================================================================

/// Second level of the coercion rule, keyed on the operand's native batch:
/// mask and complex batches keep their native representation, plain batches
/// take the requested one.
pub trait PreserveOrRequest<R: BatchRepr>: BatchRepr {
    type Out: BatchRepr;
}

impl<R: BatchRepr> PreserveOrRequest<R> for Bools {
    type Out = Bools;
}

impl<R: BatchRepr> PreserveOrRequest<R> for C64s {
    type Out = C64s;
}

impl<R: BatchRepr> PreserveOrRequest<R> for C32s {
    type Out = C32s;
}

impl<R: BatchRepr> PreserveOrRequest<R> for F64s {
    type Out = R;
}

impl<R: BatchRepr> PreserveOrRequest<R> for F32s {
    type Out = R;
}

impl<R: BatchRepr> PreserveOrRequest<R> for I32s {
    type Out = R;
}

impl<R: BatchRepr> PreserveOrRequest<R> for I64s {
    type Out = R;
}

/// First level of the coercion rule, keyed on the requested/result batch
/// `Self`: a mask-valued result forces every operand onto the common
/// representation `C`; any other result defers to the operand's own
/// [`PreserveOrRequest`] row. `N` is the operand's native batch.
pub trait SelectBatch<N: BatchRepr, C: BatchRepr>: BatchRepr {
    type Out: BatchRepr;
}

impl<N: BatchRepr, C: BatchRepr> SelectBatch<N, C> for Bools {
    type Out = C;
}

macro_rules! impl_select_nonbool {
    ($result:ident) => {
        impl<N: PreserveOrRequest<$result>, C: BatchRepr> SelectBatch<N, C> for $result {
            type Out = <N as PreserveOrRequest<$result>>::Out;
        }
    };
}

impl_select_nonbool!(F64s);
impl_select_nonbool!(F32s);
impl_select_nonbool!(I32s);
impl_select_nonbool!(I64s);
impl_select_nonbool!(C64s);
impl_select_nonbool!(C32s);

/// The batch an operand with native batch `N` contributes when the requested
/// result batch is `R` and the common representation is `C`.
pub type SelectedBatch<R, N, C> = <R as SelectBatch<N, C>>::Out;
