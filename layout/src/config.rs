//! Settings for encode/decode operations and bounds for repeated elements.

use crate::SchemaError;
use core::ops::{Bound, RangeBounds};

/// Settings accepted by the `*_cfg` operations of [crate::Codec].
///
/// # Examples
///
/// ```
/// use commonware_layout::Config;
///
/// let cfg = Config::default();
/// assert!(!cfg.validate_on_encode);
/// assert!(cfg.strict_enums);
///
/// let cfg = Config::default().with_validate_on_encode(true);
/// assert!(cfg.validate_on_encode);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Config {
    /// Revalidate the whole value before writing it.
    ///
    /// When unset, encoding trusts the caller and only fails on structural impossibilities
    /// (such as a sequence longer than its maximum count).
    pub validate_on_encode: bool,

    /// Reject decoded enum values that are not one of the declared literals.
    pub strict_enums: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validate_on_encode: false,
            strict_enums: true,
        }
    }
}

impl Config {
    /// Returns a copy of this config with `validate_on_encode` set.
    pub fn with_validate_on_encode(mut self, enabled: bool) -> Self {
        self.validate_on_encode = enabled;
        self
    }

    /// Returns a copy of this config with `strict_enums` set.
    pub fn with_strict_enums(mut self, enabled: bool) -> Self {
        self.strict_enums = enabled;
        self
    }
}

/// Inclusive `[min, max]` range of element counts.
///
/// Any [RangeBounds] over `usize` with a finite upper bound can be converted, so both `3..=3`
/// and `2..6` describe valid bounds.
///
/// # Examples
///
/// ```
/// use commonware_layout::Bounds;
///
/// let bounds = Bounds::new(2..6).unwrap();
/// assert_eq!((bounds.min(), bounds.max()), (2, 5));
/// assert!(bounds.contains(5));
/// assert!(!bounds.contains(6));
///
/// // Unbounded ranges cannot describe a layout
/// assert!(Bounds::new(1..).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Bounds {
    min: usize,
    max: usize,
}

impl Bounds {
    /// Creates bounds from any type implementing `RangeBounds<usize>`.
    pub fn new(r: impl RangeBounds<usize>) -> Result<Self, SchemaError> {
        let min = match r.start_bound() {
            Bound::Included(s) => *s,
            Bound::Excluded(s) => s
                .checked_add(1)
                .ok_or_else(|| SchemaError::InvalidBounds("start overflows".into()))?,
            Bound::Unbounded => 0,
        };
        let max = match r.end_bound() {
            Bound::Included(e) => *e,
            Bound::Excluded(e) => e
                .checked_sub(1)
                .ok_or_else(|| SchemaError::InvalidBounds("empty range".into()))?,
            Bound::Unbounded => {
                return Err(SchemaError::InvalidBounds(
                    "maximum count must be bounded".into(),
                ))
            }
        };
        if min > max {
            return Err(SchemaError::InvalidBounds(format!(
                "minimum {min} is greater than maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Creates bounds that only accept exactly `count`.
    pub fn exact(count: usize) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    /// The minimum count.
    pub fn min(&self) -> usize {
        self.min
    }

    /// The maximum count.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns true if the bounds accept only one count.
    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    /// Returns true if `count` is within these bounds.
    pub fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ops::Bound::{Excluded, Included};

    #[test]
    fn test_bounds_from_ranges() {
        assert_eq!(Bounds::new(3..=3).unwrap(), Bounds::exact(3));
        assert_eq!(Bounds::new(3..4).unwrap(), Bounds::exact(3));

        let b = Bounds::new(..=16).unwrap();
        assert_eq!((b.min(), b.max()), (0, 16));
        assert!(!b.is_exact());

        let b = Bounds::new((Excluded(1), Included(4))).unwrap();
        assert_eq!((b.min(), b.max()), (2, 4));
    }

    #[test]
    fn test_bounds_rejected() {
        assert!(matches!(
            Bounds::new(0..),
            Err(SchemaError::InvalidBounds(_))
        ));
        assert!(matches!(
            Bounds::new(5..5),
            Err(SchemaError::InvalidBounds(_))
        ));
        assert!(matches!(
            Bounds::new(0..0),
            Err(SchemaError::InvalidBounds(_))
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = Bounds::new(6..=5);
        assert!(matches!(reversed, Err(SchemaError::InvalidBounds(_))));
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(2..=5).unwrap();
        assert!(!b.contains(1));
        assert!(b.contains(2));
        assert!(b.contains(5));
        assert!(!b.contains(6));
    }

    #[test]
    fn test_config_builders() {
        let cfg = Config::default()
            .with_validate_on_encode(true)
            .with_strict_enums(false);
        assert!(cfg.validate_on_encode);
        assert!(!cfg.strict_enums);
    }
}
