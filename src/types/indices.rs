//! Strongly-typed index newtypes.
//!
//! These types keep horizontal column indices and vertical layer indices
//! apart, since both are plain `usize` underneath.

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// First index (0).
            pub const ZERO: Self = Self(0);

            /// Iterate over [0, n).
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Horizontal grid point (water column) index.
    ///
    /// Columns are numbered row by row: `i + nx * j`.
    ///
    /// # Example
    ///
    /// ```
    /// use layered_rs::types::ColumnIndex;
    ///
    /// let col = ColumnIndex::new(42);
    /// assert_eq!(col.get(), 42);
    /// ```
    ColumnIndex,
    "C"
);

define_index!(
    /// Vertical layer index, 0 at the bottom.
    ///
    /// # Example
    ///
    /// ```
    /// use layered_rs::types::LayerIndex;
    ///
    /// let top = LayerIndex::new(4);
    /// assert_eq!(top.get(), 4);
    /// ```
    LayerIndex,
    "L"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        let idx = ColumnIndex::new(42);
        assert_eq!(idx.get(), 42);
        assert_eq!(usize::from(idx), 42);
    }

    #[test]
    fn test_vec_indexing() {
        let mut data = vec![10, 20, 30];
        assert_eq!(data[ColumnIndex::new(1)], 20);
        data[ColumnIndex::new(2)] = 5;
        assert_eq!(data[2], 5);
    }

    #[test]
    fn test_iter() {
        let layers: Vec<_> = LayerIndex::iter(3).collect();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[2].get(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ColumnIndex::new(7)), "C7");
        assert_eq!(format!("{}", LayerIndex::new(2)), "L2");
    }
}
