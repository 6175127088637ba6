//! Traversal layouts and layout promotion.
//!
//! Every operand advertises a preferred mapping between multidimensional
//! coordinates and flat positions. Combining the preferences of all operands
//! of an expression yields either one agreed layout or [`Layout::Dynamic`],
//! which gates whether the flat-iterator fast path applies.

/// Logical mapping between multidimensional coordinates and flat positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Trailing axis varies fastest (C order).
    RowMajor,
    /// Leading axis varies fastest (Fortran order).
    ColumnMajor,
    /// Compatible with any layout (rank-0 operands, single-element arrays).
    Any,
    /// No single agreed layout.
    Dynamic,
}

/// Layout assumed when a traversal order must be picked and none is imposed.
pub const DEFAULT_LAYOUT: Layout = Layout::RowMajor;

impl Layout {
    /// Combine two layout preferences into one agreed layout.
    ///
    /// `Any` adapts to the other side; equal layouts are kept; disagreement
    /// yields `Dynamic`.
    pub const fn combine(self, other: Layout) -> Layout {
        match (self, other) {
            (Layout::Any, l) | (l, Layout::Any) => l,
            (Layout::RowMajor, Layout::RowMajor) => Layout::RowMajor,
            (Layout::ColumnMajor, Layout::ColumnMajor) => Layout::ColumnMajor,
            _ => Layout::Dynamic,
        }
    }

    /// True when the layout names a single concrete traversal order.
    pub const fn is_concrete(self) -> bool {
        matches!(self, Layout::RowMajor | Layout::ColumnMajor)
    }
}

/// Fold a sequence of layout preferences into one agreed layout.
pub fn combine_layouts<I: IntoIterator<Item = Layout>>(layouts: I) -> Layout {
    layouts
        .into_iter()
        .fold(Layout::Any, |acc, l| acc.combine(l))
}
