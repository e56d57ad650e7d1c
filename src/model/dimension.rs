//! Width/height pairs for pages and images.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable width/height pair.
///
/// Page dimensions are in default user space units (1/72 inch), image
/// dimensions in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    /// Width (non-negative)
    pub width: i64,
    /// Height (non-negative)
    pub height: i64,
}

impl Dimension {
    /// Sentinel meaning "no image found". Compare by value.
    pub const EMPTY: Dimension = Dimension {
        width: 0,
        height: 0,
    };

    /// Create a new dimension. Negative values are clamped to zero.
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    /// Whether this is the [`Dimension::EMPTY`] sentinel.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Whether `other` fits inside this dimension on both axes.
    pub fn contains(&self, other: &Dimension) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Whether both axis-relative deltas are within `percent` of this
    /// dimension. Always false when this dimension has a zero axis.
    pub fn approximate(&self, other: &Dimension, percent: f64) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let delta_x = 100.0 * (self.width - other.width).abs() as f64 / self.width as f64;
        let delta_y = 100.0 * (self.height - other.height).abs() as f64 / self.height as f64;
        delta_x <= percent && delta_y <= percent
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate() {
        let dim = Dimension::new(100, 100);
        let other = Dimension::new(95, 95);
        assert!(dim.approximate(&other, 10.0));
        assert!(dim.approximate(&other, 5.0));
        assert!(!dim.approximate(&other, 2.0));
    }

    #[test]
    fn test_approximate_zero_axis() {
        assert!(!Dimension::EMPTY.approximate(&Dimension::EMPTY, 100.0));
        assert!(!Dimension::new(0, 10).approximate(&Dimension::new(0, 10), 100.0));
    }

    #[test]
    fn test_contains() {
        let dim = Dimension::new(100, 100);
        assert!(dim.contains(&Dimension::new(95, 95)));
        assert!(!dim.contains(&Dimension::new(105, 105)));
        assert!(!dim.contains(&Dimension::new(105, 85)));
    }

    #[test]
    fn test_contains_reflexive_and_antisymmetric() {
        let samples = [
            Dimension::new(0, 0),
            Dimension::new(612, 792),
            Dimension::new(2550, 3300),
            Dimension::new(3300, 2550),
            Dimension::new(612, 3300),
        ];
        for a in &samples {
            assert!(a.contains(a));
            for b in &samples {
                if a.contains(b) && b.contains(a) {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_empty_is_value_equal() {
        let looked_up = Dimension::new(0, 0);
        assert!(looked_up.is_empty());
        assert_eq!(looked_up, Dimension::EMPTY);
        assert!(!Dimension::new(1, 0).is_empty());
    }

    #[test]
    fn test_negative_clamped() {
        assert_eq!(Dimension::new(-5, 10), Dimension::new(0, 10));
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimension::new(100, 100).to_string(), "[100x100]");
    }
}
