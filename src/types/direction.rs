//! Horizontal directions and per-direction pairs.
//!
//! Velocity components, boundary fluxes and face fields come in x/y pairs
//! that are processed one direction at a time with the stencil rotated.

use std::fmt;

/// A horizontal grid direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Along increasing `i`.
    X,
    /// Along increasing `j`.
    Y,
}

impl Direction {
    /// Both directions, x first.
    pub const ALL: [Direction; 2] = [Direction::X, Direction::Y];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::X => write!(f, "x"),
            Direction::Y => write!(f, "y"),
        }
    }
}

/// A value per horizontal direction.
///
/// # Example
///
/// ```
/// use layered_rs::types::{Direction, Horizontal};
///
/// let mut flux = Horizontal::new(1.0, 2.0);
/// *flux.get_mut(Direction::Y) += 1.0;
/// assert_eq!(*flux.get(Direction::Y), 3.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Horizontal<T> {
    /// x component
    pub x: T,
    /// y component
    pub y: T,
}

impl<T> Horizontal<T> {
    /// Create a pair from its components.
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Component along `dir`.
    #[inline]
    pub fn get(&self, dir: Direction) -> &T {
        match dir {
            Direction::X => &self.x,
            Direction::Y => &self.y,
        }
    }

    /// Mutable component along `dir`.
    #[inline]
    pub fn get_mut(&mut self, dir: Direction) -> &mut T {
        match dir {
            Direction::X => &mut self.x,
            Direction::Y => &mut self.y,
        }
    }

    /// Apply `f` to both components.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Horizontal<U> {
        Horizontal {
            x: f(self.x),
            y: f(self.y),
        }
    }

    /// Build a pair by evaluating `f` for each direction.
    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        Self {
            x: f(Direction::X),
            y: f(Direction::Y),
        }
    }
}

impl<T: Clone> Horizontal<T> {
    /// The same value in both directions.
    pub fn splat(value: T) -> Self {
        Self {
            x: value.clone(),
            y: value,
        }
    }
}
