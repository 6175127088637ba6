//! Lazy elementwise function expressions over multidimensional operands.
//!
//! An expression node ([`FnExpr`]) couples an elementwise functor with a
//! tuple of operands: dense arrays, broadcast scalars, or other expression
//! nodes. Nothing is evaluated at construction; accessing an element applies
//! the functor to the operands' elements at that position. Shapes of
//! different ranks reconcile through trailing-aligned broadcasting, and the
//! resolved shape is cached on the node after its first computation.
//!
//! Three traversal styles are available, fastest applicable wins:
//! - coordinate access through [`Operand::value_at`] and friends,
//! - axis-wise traversal through [`Stepper`]s, which pay nothing for
//!   broadcast axes,
//! - flat traversal through [`FnExpr::flat_values`], valid when every
//!   operand shares one concrete layout and no operand needs stretching.
//!
//! Batch evaluation over [`wide`] vectors is a purely static capability:
//! [`FnExpr::load_simd`] exists on an instantiation exactly when the result
//! type, the functor, and every operand are batch-capable.
//!
//! ```
//! use fnexpr_rs::{add, DenseArray, Operand};
//!
//! let m = DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?;
//! let v = DenseArray::from_vec(vec![10.0, 20.0, 30.0], &[3])?;
//! let e = add(&m, &v);
//! assert_eq!(e.shape()?, &[2, 3]);
//! assert_eq!(e.value_at(&[1, 2])?, 36.0);
//! # Ok::<(), fnexpr_rs::ExprError>(())
//! ```

use thiserror::Error;

pub mod cache;
pub mod dense;
pub mod function;
pub mod functor;
pub mod iterator;
pub mod layout;
pub mod operand;
pub mod shape;
pub mod simd;
pub mod stepper;

pub use cache::{ResolvedShape, ShapeCache};
pub use dense::DenseArray;
pub use function::{
    add, div, equal, fma, greater, greater_equal, less, less_equal, mul, neg, not_equal, sub,
    FnExpr, OperandSet, SimdOperandSet,
};
pub use functor::{
    Divides, Equal, Fma, Functor, Greater, GreaterEqual, Less, LessEqual, Minus, Multiplies,
    Negate, NotEqual, Plus, SimdFunctor,
};
pub use iterator::{CursorSet, ExprIter, FlatValues};
pub use layout::{Layout, DEFAULT_LAYOUT};
pub use operand::{FlatCursor, Operand, ScalarOperand, SimdOperand, SimdStepper, Stepper};
pub use shape::{Shape, Strides};
pub use simd::{BatchRepr, Bools, SimdScalar, BATCH_LANES, C32s, C64s, F32s, F64s, I32s, I64s};
pub use stepper::{ExprStepper, SimdStepperSet, StepperSet};

/// Errors reported by shape resolution and element access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("rank mismatch: expected {expected} dimensions, got {got}")]
    RankMismatch { expected: usize, got: usize },

    #[error("index {index} out of bounds for axis {axis} with extent {extent}")]
    OutOfBounds {
        axis: usize,
        index: usize,
        extent: usize,
    },

    #[error("cannot broadcast extent {operand} into extent {resolved} on axis {axis}")]
    BroadcastMismatch {
        axis: usize,
        operand: usize,
        resolved: usize,
    },

    #[error("storage of length {len} does not match shape of size {size}")]
    StorageMismatch { len: usize, size: usize },

    #[error("expression does not support flat traversal")]
    NotFlatTraversable,
}

pub type Result<T> = std::result::Result<T, ExprError>;
