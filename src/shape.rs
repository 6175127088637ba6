//! Shape buffers, broadcast merging, and index validation.
//!
//! Broadcasting reconciles operands of different shapes into one common
//! iteration shape: axes are aligned from the trailing end, and extent-1 axes
//! stretch to the resolved extent. Each operand merges its own dims into a
//! shared buffer via [`broadcast_dims_into`]; the expression node folds these
//! calls over all operands.

use smallvec::SmallVec;

use crate::{ExprError, Result};

/// Dynamic-rank shape storage; typical ranks stay on the stack.
pub type Shape = SmallVec<[usize; 4]>;

/// Stride storage matching [`Shape`].
pub type Strides = SmallVec<[isize; 4]>;

/// Number of elements addressed by a shape.
#[inline]
pub fn compute_size(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Merge one operand's dims into a shared broadcast buffer.
///
/// Axes align from the trailing end. Per-axis rule:
/// - equal extents are kept
/// - a buffer extent of 0 or 1 takes the operand extent
/// - an operand extent of 1 stretches to the buffer extent
/// - anything else is a broadcast mismatch
///
/// Returns the operand's triviality: ranks equal and every extent equal to
/// the buffer content after the merge. A stale `true` is possible while the
/// buffer has not reached its final extents; callers that need the exact flag
/// re-merge once the buffer is settled (the merge is then idempotent).
pub fn broadcast_dims_into(target: &mut [usize], dims: &[usize]) -> Result<bool> {
    if dims.len() > target.len() {
        return Err(ExprError::RankMismatch {
            expected: target.len(),
            got: dims.len(),
        });
    }
    let offset = target.len() - dims.len();
    let mut trivial = dims.len() == target.len();
    for (k, &d) in dims.iter().enumerate() {
        let axis = offset + k;
        let t = &mut target[axis];
        if *t == d {
            // kept
        } else if *t <= 1 {
            *t = d;
        } else if d != 1 {
            return Err(ExprError::BroadcastMismatch {
                axis,
                operand: d,
                resolved: *t,
            });
        }
        trivial = trivial && *t == d;
    }
    Ok(trivial)
}

/// Validate that a coordinate list has exactly the expected rank.
#[inline]
pub fn check_rank(expected: usize, got: usize) -> Result<()> {
    if got != expected {
        return Err(ExprError::RankMismatch { expected, got });
    }
    Ok(())
}

/// Validate coordinates against a shape, trailing-aligned.
///
/// `coords` may be longer than the shape; only the trailing `shape.len()`
/// entries are checked (the leading ones belong to outer broadcast axes).
pub fn check_index(shape: &[usize], coords: &[usize]) -> Result<()> {
    if coords.len() < shape.len() {
        return Err(ExprError::RankMismatch {
            expected: shape.len(),
            got: coords.len(),
        });
    }
    let offset = coords.len() - shape.len();
    for (axis, (&extent, &c)) in shape.iter().zip(&coords[offset..]).enumerate() {
        if c >= extent {
            return Err(ExprError::OutOfBounds {
                axis,
                index: c,
                extent,
            });
        }
    }
    Ok(())
}

/// Row-major strides for a shape (in elements).
pub fn row_major_strides(dims: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, dims.len());
    let mut acc = 1isize;
    for i in (0..dims.len()).rev() {
        strides[i] = acc;
        acc *= dims[i] as isize;
    }
    strides
}

/// Column-major strides for a shape (in elements).
pub fn column_major_strides(dims: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, dims.len());
    let mut acc = 1isize;
    for i in 0..dims.len() {
        strides[i] = acc;
        acc *= dims[i] as isize;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_equal_shapes() {
        let mut buf = [0usize; 2];
        assert!(broadcast_dims_into(&mut buf, &[2, 3]).unwrap());
        assert!(broadcast_dims_into(&mut buf, &[2, 3]).unwrap());
        assert_eq!(buf, [2, 3]);
    }

    #[test]
    fn test_merge_stretches_unit_axis() {
        let mut buf = [0usize; 2];
        assert!(broadcast_dims_into(&mut buf, &[2, 3]).unwrap());
        assert!(!broadcast_dims_into(&mut buf, &[1, 3]).unwrap());
        assert_eq!(buf, [2, 3]);
    }

    #[test]
    fn test_merge_trailing_alignment() {
        let mut buf = [0usize; 2];
        assert!(!broadcast_dims_into(&mut buf, &[3]).unwrap());
        assert!(broadcast_dims_into(&mut buf, &[2, 3]).unwrap());
        assert_eq!(buf, [2, 3]);
    }

    #[test]
    fn test_merge_mismatch() {
        let mut buf = [0usize; 2];
        broadcast_dims_into(&mut buf, &[2, 3]).unwrap();
        let err = broadcast_dims_into(&mut buf, &[4, 3]).unwrap_err();
        match err {
            ExprError::BroadcastMismatch { axis, operand, resolved } => {
                assert_eq!((axis, operand, resolved), (0, 4, 2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stale_trivial_settles_on_remerge() {
        // (1, 3) merged first reports trivial against the unsettled buffer;
        // once (2, 3) has enlarged axis 0, a re-merge reports the exact flag.
        let mut buf = [0usize; 2];
        assert!(broadcast_dims_into(&mut buf, &[1, 3]).unwrap());
        assert!(broadcast_dims_into(&mut buf, &[2, 3]).unwrap());
        assert!(!broadcast_dims_into(&mut buf, &[1, 3]).unwrap());
        assert!(broadcast_dims_into(&mut buf, &[2, 3]).unwrap());
        assert_eq!(buf, [2, 3]);
    }

    #[test]
    fn test_rank_zero_operand() {
        let mut buf = [0usize; 2];
        assert!(!broadcast_dims_into(&mut buf, &[]).unwrap());
        let mut empty: [usize; 0] = [];
        assert!(broadcast_dims_into(&mut empty, &[]).unwrap());
    }

    #[test]
    fn test_check_index() {
        assert!(check_index(&[2, 3], &[1, 2]).is_ok());
        assert!(check_index(&[2, 3], &[7, 1, 2]).is_ok());
        assert!(check_index(&[2, 3], &[2, 0]).is_err());
        assert!(check_index(&[2, 3], &[0]).is_err());
    }

    #[test]
    fn test_strides() {
        assert_eq!(row_major_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert_eq!(column_major_strides(&[2, 3, 4]).as_slice(), &[1, 2, 6]);
        assert_eq!(compute_size(&[2, 3, 4]), 24);
        assert_eq!(compute_size(&[]), 1);
    }
}
