//! Axis-wise traversal of expression nodes.
//!
//! An expression's stepper is a tuple of its operands' steppers moved in
//! lockstep; the functor is applied on read. [`StepperSet`] folds each
//! movement over the tuple, so [`ExprStepper`] stays arity-agnostic and
//! nests when expressions do.

use crate::functor::{Functor, SimdFunctor};
use crate::layout::Layout;
use crate::operand::{SimdStepper, Stepper};
use crate::simd::{BatchRepr, ConvertBatch, SelectedBatch, SimdScalar};

/// The native batch of a stepper's item type.
pub type StepperBatch<S> = <<S as Stepper>::Item as SimdScalar>::Batch;

/// A tuple of steppers moved in lockstep.
pub trait StepperSet {
    /// Tuple of the steppers' item types.
    type Items;

    fn values(&self) -> Self::Items;

    fn step(&mut self, axis: usize, n: usize);

    fn step_back(&mut self, axis: usize, n: usize);

    fn reset(&mut self, axis: usize);

    fn reset_back(&mut self, axis: usize);

    fn to_begin(&mut self);

    fn to_end(&mut self, layout: Layout);

    /// Advance every stepper along the trailing axis and return the new
    /// values.
    fn step_leading_values(&mut self) -> Self::Items;
}

/// Batch-capable stepper tuples, under the same coercion rule as
/// [`crate::function::SimdOperandSet`].
pub trait SimdStepperSet<R: BatchRepr>: StepperSet {
    /// Tuple of coerced batches.
    type Batches;

    /// Load a batch from every stepper and advance past the lanes.
    fn step_batch_values(&mut self) -> Self::Batches;
}

macro_rules! impl_stepper_set {
    (($first:ident, $fa:ident) $(, ($rest:ident, $ra:ident))*) => {
        impl<$first: Stepper, $($rest: Stepper,)*> StepperSet for ($first, $($rest,)*) {
            type Items = ($first::Item, $($rest::Item,)*);

            #[inline]
            fn values(&self) -> Self::Items {
                let ($fa, $($ra,)*) = self;
                ($fa.value(), $($ra.value(),)*)
            }

            #[inline]
            fn step(&mut self, axis: usize, n: usize) {
                let ($fa, $($ra,)*) = self;
                $fa.step(axis, n);
                $($ra.step(axis, n);)*
            }

            #[inline]
            fn step_back(&mut self, axis: usize, n: usize) {
                let ($fa, $($ra,)*) = self;
                $fa.step_back(axis, n);
                $($ra.step_back(axis, n);)*
            }

            #[inline]
            fn reset(&mut self, axis: usize) {
                let ($fa, $($ra,)*) = self;
                $fa.reset(axis);
                $($ra.reset(axis);)*
            }

            #[inline]
            fn reset_back(&mut self, axis: usize) {
                let ($fa, $($ra,)*) = self;
                $fa.reset_back(axis);
                $($ra.reset_back(axis);)*
            }

            #[inline]
            fn to_begin(&mut self) {
                let ($fa, $($ra,)*) = self;
                $fa.to_begin();
                $($ra.to_begin();)*
            }

            #[inline]
            fn to_end(&mut self, layout: Layout) {
                let ($fa, $($ra,)*) = self;
                $fa.to_end(layout);
                $($ra.to_end(layout);)*
            }

            #[inline]
            fn step_leading_values(&mut self) -> Self::Items {
                let ($fa, $($ra,)*) = self;
                ($fa.step_leading(), $($ra.step_leading(),)*)
            }
        }

        impl<R, $first, $($rest,)*> SimdStepperSet<R> for ($first, $($rest,)*)
        where
            R: BatchRepr
                + crate::simd::SelectBatch<StepperBatch<$first>, StepperBatch<$first>>
                $(+ crate::simd::SelectBatch<StepperBatch<$rest>, StepperBatch<$first>>)*,
            $first: SimdStepper,
            $first::Item: SimdScalar,
            $($rest: SimdStepper,
            $rest::Item: SimdScalar,)*
            StepperBatch<$first>:
                ConvertBatch<SelectedBatch<R, StepperBatch<$first>, StepperBatch<$first>>>,
            $(StepperBatch<$rest>:
                ConvertBatch<SelectedBatch<R, StepperBatch<$rest>, StepperBatch<$first>>>,)*
        {
            type Batches = (
                SelectedBatch<R, StepperBatch<$first>, StepperBatch<$first>>,
                $(SelectedBatch<R, StepperBatch<$rest>, StepperBatch<$first>>,)*
            );

            #[inline]
            fn step_batch_values(&mut self) -> Self::Batches {
                let ($fa, $($ra,)*) = self;
                (
                    $fa.step_batch().convert(),
                    $($ra.step_batch().convert(),)*
                )
            }
        }
    };
}

impl_stepper_set!((A, a));
impl_stepper_set!((A, a), (B, b));
impl_stepper_set!((A, a), (B, b), (C, c));
impl_stepper_set!((A, a), (B, b), (C, c), (D, d));

/// Stepper over an expression node: sub-steppers in lockstep, functor on
/// read.
#[derive(Debug, Clone)]
pub struct ExprStepper<'a, F, S> {
    f: &'a F,
    steppers: S,
}

impl<'a, F, S> ExprStepper<'a, F, S> {
    pub(crate) fn new(f: &'a F, steppers: S) -> Self {
        ExprStepper { f, steppers }
    }
}

impl<F, S> Stepper for ExprStepper<'_, F, S>
where
    S: StepperSet,
    F: Functor<S::Items>,
{
    type Item = F::Output;

    #[inline]
    fn value(&self) -> F::Output {
        self.f.apply(self.steppers.values())
    }

    #[inline]
    fn step(&mut self, axis: usize, n: usize) {
        self.steppers.step(axis, n);
    }

    #[inline]
    fn step_back(&mut self, axis: usize, n: usize) {
        self.steppers.step_back(axis, n);
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        self.steppers.reset(axis);
    }

    #[inline]
    fn reset_back(&mut self, axis: usize) {
        self.steppers.reset_back(axis);
    }

    #[inline]
    fn to_begin(&mut self) {
        self.steppers.to_begin();
    }

    #[inline]
    fn to_end(&mut self, layout: Layout) {
        self.steppers.to_end(layout);
    }

    #[inline]
    fn step_leading(&mut self) -> F::Output {
        self.f.apply(self.steppers.step_leading_values())
    }
}

impl<F, S, T> SimdStepper for ExprStepper<'_, F, S>
where
    S: StepperSet + SimdStepperSet<T::Batch>,
    F: Functor<S::Items, Output = T>
        + SimdFunctor<<S as SimdStepperSet<T::Batch>>::Batches, OutputBatch = T::Batch>,
    T: SimdScalar,
{
    #[inline]
    fn step_batch(&mut self) -> T::Batch {
        self.f.apply_batch(self.steppers.step_batch_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseArray;
    use crate::function::{add, mul};
    use crate::operand::{Operand, ScalarOperand};
    use crate::simd::BatchRepr;

    fn matrix() -> DenseArray<f64> {
        DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap()
    }

    fn row() -> DenseArray<f64> {
        DenseArray::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap()
    }

    /// Row-major odometer walk driven by step/reset, collecting every value.
    fn odometer_values<S: Stepper>(mut st: S, shape: &[usize]) -> Vec<S::Item> {
        let size: usize = shape.iter().product();
        let mut coords = vec![0usize; shape.len()];
        let mut out = Vec::with_capacity(size);
        out.push(st.value());
        for _ in 1..size {
            for axis in (0..shape.len()).rev() {
                if coords[axis] + 1 < shape[axis] {
                    coords[axis] += 1;
                    st.step(axis, 1);
                    break;
                }
                coords[axis] = 0;
                st.reset(axis);
            }
            out.push(st.value());
        }
        out
    }

    #[test]
    fn test_stepper_walks_broadcast_sum() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        let shape = e.shape().unwrap().to_vec();
        let st = e.stepper_begin(&shape);
        assert_eq!(
            odometer_values(st, &shape),
            vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]
        );
    }

    #[test]
    fn test_nested_stepper() {
        let m = matrix();
        let r = row();
        let e = mul(add(&m, &r), ScalarOperand(10.0f64));
        let shape = e.shape().unwrap().to_vec();
        let st = e.stepper_begin(&shape);
        assert_eq!(
            odometer_values(st, &shape),
            vec![110.0, 220.0, 330.0, 140.0, 250.0, 360.0]
        );
    }

    #[test]
    fn test_step_leading() {
        let a = matrix();
        let b = matrix();
        let e = mul(&a, &b);
        let shape = e.shape().unwrap().to_vec();
        let mut st = e.stepper_begin(&shape);
        assert_eq!(st.value(), 1.0);
        assert_eq!(st.step_leading(), 4.0);
        assert_eq!(st.step_leading(), 9.0);
    }

    #[test]
    fn test_step_back_and_reset_back() {
        let m = matrix();
        let r = row();
        let e = add(&m, &r);
        let shape = e.shape().unwrap().to_vec();
        let mut st = e.stepper_begin(&shape);
        st.step(0, 1);
        st.step(1, 2);
        assert_eq!(st.value(), 36.0);
        st.step_back(1, 1);
        assert_eq!(st.value(), 25.0);
        // Rollover contract: reset from the last position of the axis,
        // reset_back from the first.
        st.step(1, 1);
        st.reset(1);
        assert_eq!(st.value(), 14.0);
        st.reset_back(1);
        assert_eq!(st.value(), 36.0);
    }

    #[test]
    fn test_step_batch_matches_scalar_path() {
        let a = matrix();
        let b = matrix();
        let e = add(&a, &b);
        let shape = e.shape().unwrap().to_vec();
        let mut st = e.stepper_begin(&shape);
        let batch = st.step_batch();
        assert_eq!(batch.to_array(), [2.0, 4.0, 6.0, 8.0]);
    }
}
