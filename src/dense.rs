//! Owned dense arrays, the leaf operands of expression trees.
//!
//! A [`DenseArray`] owns contiguous storage in row- or column-major order.
//! Its stepper maps broadcast axes onto storage strides at construction, so
//! stepping a stretched axis moves by stride 0 and costs nothing per element.

use smallvec::SmallVec;

use crate::layout::Layout;
use crate::operand::{FlatCursor, Operand, SimdOperand, SimdStepper, Stepper};
use crate::shape::{
    broadcast_dims_into, check_index, check_rank, column_major_strides, compute_size,
    row_major_strides, Shape, Strides,
};
use crate::simd::{BatchRepr, SimdScalar, BATCH_LANES};
use crate::{ExprError, Result};

/// Contiguous multidimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray<T> {
    data: Vec<T>,
    dims: Shape,
    strides: Strides,
    layout: Layout,
}

impl<T: Copy> DenseArray<T> {
    /// Array over `data` in row-major order.
    pub fn from_vec(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        Self::with_layout(data, dims, Layout::RowMajor)
    }

    /// Array over `data` in column-major order.
    pub fn from_vec_column_major(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        Self::with_layout(data, dims, Layout::ColumnMajor)
    }

    fn with_layout(data: Vec<T>, dims: &[usize], layout: Layout) -> Result<Self> {
        let size = compute_size(dims);
        if data.len() != size {
            return Err(ExprError::StorageMismatch {
                len: data.len(),
                size,
            });
        }
        let mut strides = match layout {
            Layout::ColumnMajor => column_major_strides(dims),
            _ => row_major_strides(dims),
        };
        // Extent-1 axes get stride 0 so broadcast coordinates land on the
        // single element regardless of their value.
        for (s, &d) in strides.iter_mut().zip(dims) {
            if d == 1 {
                *s = 0;
            }
        }
        Ok(DenseArray {
            data,
            dims: Shape::from_slice(dims),
            strides,
            layout,
        })
    }

    /// Array filled with one value.
    pub fn from_elem(value: T, dims: &[usize]) -> Self {
        let size = compute_size(dims);
        let mut strides = row_major_strides(dims);
        for (s, &d) in strides.iter_mut().zip(dims) {
            if d == 1 {
                *s = 0;
            }
        }
        DenseArray {
            data: vec![value; size],
            dims: Shape::from_slice(dims),
            strides,
            layout: Layout::RowMajor,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn linear_index(&self, coords: &[usize]) -> usize {
        self.strides
            .iter()
            .zip(coords)
            .map(|(&s, &c)| s as usize * c)
            .sum()
    }
}

impl<T: Copy> Operand for DenseArray<T> {
    type Item = T;
    type Stepper<'a>
        = DenseStepper<'a, T>
    where
        Self: 'a;
    type Cursor<'a>
        = DenseCursor<'a, T>
    where
        Self: 'a;

    const STATIC_LAYOUT: Layout = Layout::Dynamic;
    const CONTIGUOUS: bool = true;

    #[inline]
    fn dimension(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    fn shape(&self) -> Result<&[usize]> {
        Ok(&self.dims)
    }

    #[inline]
    fn layout(&self) -> Layout {
        self.layout
    }

    fn value_at(&self, coords: &[usize]) -> Result<T> {
        check_rank(self.dims.len(), coords.len())?;
        check_index(&self.dims, coords)?;
        Ok(self.data[self.linear_index(coords)])
    }

    #[inline]
    unsafe fn value_at_unchecked(&self, coords: &[usize]) -> T {
        let mut offset = 0usize;
        for (&s, &c) in self.strides.iter().zip(coords) {
            offset += s as usize * c;
        }
        *self.data.get_unchecked(offset)
    }

    fn element(&self, coords: &[usize]) -> Result<T> {
        if coords.len() < self.dims.len() {
            return Err(ExprError::RankMismatch {
                expected: self.dims.len(),
                got: coords.len(),
            });
        }
        let trailing = &coords[coords.len() - self.dims.len()..];
        // Unit axes accept any coordinate: they are stretchable under
        // broadcasting and their stride is 0.
        for (axis, (&extent, &c)) in self.dims.iter().zip(trailing).enumerate() {
            if extent > 1 && c >= extent {
                return Err(ExprError::OutOfBounds {
                    axis,
                    index: c,
                    extent,
                });
            }
        }
        Ok(self.data[self.linear_index(trailing)])
    }

    #[inline]
    fn data_element(&self, index: usize) -> T {
        self.data[index]
    }

    #[inline]
    fn broadcast_shape(&self, target: &mut [usize]) -> Result<bool> {
        broadcast_dims_into(target, &self.dims)
    }

    #[inline]
    fn has_flat_traversal(&self, layout: Layout) -> bool {
        self.layout.combine(layout) == self.layout
    }

    #[inline]
    fn has_linear_assign(&self, strides: &[isize]) -> bool {
        strides == self.strides.as_slice()
    }

    fn stepper_begin(&self, shape: &[usize]) -> DenseStepper<'_, T> {
        DenseStepper::new(self, shape)
    }

    fn stepper_end(&self, shape: &[usize], layout: Layout) -> DenseStepper<'_, T> {
        let mut stepper = DenseStepper::new(self, shape);
        stepper.to_end(layout);
        stepper
    }

    fn cursor_begin(&self) -> DenseCursor<'_, T> {
        DenseCursor {
            data: &self.data,
            pos: 0,
        }
    }

    fn cursor_end(&self) -> DenseCursor<'_, T> {
        DenseCursor {
            data: &self.data,
            pos: self.data.len(),
        }
    }
}

impl<T: Copy + SimdScalar> SimdOperand for DenseArray<T> {
    #[inline]
    fn load_batch(&self, index: usize) -> T::Batch {
        T::Batch::from_slice(&self.data[index..index + BATCH_LANES])
    }
}

/// Axis-wise cursor over a [`DenseArray`] broadcast to a target shape.
///
/// Broadcast axes are resolved once at construction: each target axis maps to
/// a storage stride, 0 for axes the array does not occupy or occupies with
/// extent 1.
#[derive(Debug, Clone)]
pub struct DenseStepper<'a, T> {
    data: &'a [T],
    pos: isize,
    strides: Strides,
    extents: Shape,
}

impl<'a, T: Copy> DenseStepper<'a, T> {
    fn new(array: &'a DenseArray<T>, shape: &[usize]) -> Self {
        let rank = shape.len();
        let offset = rank - array.dims.len();
        // Missing leading axes get stride 0; unit axes already carry 0.
        let mut strides: Strides = SmallVec::from_elem(0, rank);
        strides[offset..].copy_from_slice(&array.strides);
        DenseStepper {
            data: &array.data,
            pos: 0,
            strides,
            extents: Shape::from_slice(shape),
        }
    }
}

impl<T: Copy> Stepper for DenseStepper<'_, T> {
    type Item = T;

    #[inline]
    fn value(&self) -> T {
        self.data[self.pos as usize]
    }

    #[inline]
    fn step(&mut self, axis: usize, n: usize) {
        self.pos += self.strides[axis] * n as isize;
    }

    #[inline]
    fn step_back(&mut self, axis: usize, n: usize) {
        self.pos -= self.strides[axis] * n as isize;
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        self.pos -= self.strides[axis] * (self.extents[axis] as isize - 1);
    }

    #[inline]
    fn reset_back(&mut self, axis: usize) {
        self.pos += self.strides[axis] * (self.extents[axis] as isize - 1);
    }

    fn to_begin(&mut self) {
        self.pos = 0;
    }

    fn to_end(&mut self, layout: Layout) {
        self.to_begin();
        if self.extents.is_empty() {
            self.pos = self.data.len() as isize;
            return;
        }
        // One past the last element is one full extent along the
        // slowest-varying axis of the traversal order.
        let outer = match layout {
            Layout::ColumnMajor => self.extents.len() - 1,
            _ => 0,
        };
        self.pos += self.strides[outer] * self.extents[outer] as isize;
    }

    #[inline]
    fn step_leading(&mut self) -> T {
        if let Some(&s) = self.strides.last() {
            self.pos += s;
        }
        self.value()
    }
}

impl<T: Copy + SimdScalar> SimdStepper for DenseStepper<'_, T> {
    #[inline]
    fn step_batch(&mut self) -> T::Batch {
        let start = self.pos as usize;
        let batch = T::Batch::from_slice(&self.data[start..start + BATCH_LANES]);
        if let Some(&s) = self.strides.last() {
            self.pos += s * BATCH_LANES as isize;
        }
        batch
    }
}

/// Flat cursor over a [`DenseArray`] in storage order.
#[derive(Debug, Clone, Copy)]
pub struct DenseCursor<'a, T> {
    data: &'a [T],
    pos: usize,
}

impl<T: Copy> FlatCursor for DenseCursor<'_, T> {
    type Item = T;

    #[inline]
    fn value(&self) -> T {
        self.data[self.pos]
    }

    #[inline]
    fn step_next(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn step_prev(&mut self) {
        self.pos -= 1;
    }

    #[inline]
    fn advance(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add_signed(n);
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }
}
