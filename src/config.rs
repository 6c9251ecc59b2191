//! Sizing configuration shared by every map in the crate.

use crate::error::Error;
use crate::error::Result;

/// Number of entries a map created with `new()` can take before growing.
pub const DEFAULT_CAPACITY: usize = 51;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.8;

/// Largest table, in slots, that any map will allocate.
pub const MAX_TABLE_SIZE: usize = 1 << 30;

/// Ratio of entries to slots at which a table doubles.
///
/// Always strictly between 0 and 1, so a table is never completely full and
/// every probe sequence ends at an empty slot.
///
/// # Examples
///
/// ```rust
/// use shift_hash::config::LoadFactor;
///
/// let lf = LoadFactor::new(0.8).unwrap();
/// assert_eq!(lf.table_size(6).unwrap(), 8);
/// assert_eq!(lf.threshold(8), 6);
///
/// assert!(LoadFactor::new(1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadFactor(f32);

impl LoadFactor {
    /// Validates `value` as a load factor.
    ///
    /// Fails with [`Error::InvalidLoadFactor`] unless `0 < value < 1`. NaN is
    /// rejected.
    pub fn new(value: f32) -> Result<Self> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidLoadFactor(value))
        }
    }

    /// Returns the raw ratio.
    pub fn get(self) -> f32 {
        self.0
    }

    /// Number of entries at which a table of `table_size` slots grows.
    #[inline]
    pub fn threshold(self, table_size: usize) -> usize {
        (table_size as f64 * self.0 as f64) as usize
    }

    /// Smallest power-of-two table, at least 2 slots, that holds `capacity`
    /// entries at this load factor.
    ///
    /// Fails with [`Error::CapacityTooLarge`] when that table would exceed
    /// [`MAX_TABLE_SIZE`].
    pub fn table_size(self, capacity: usize) -> Result<usize> {
        let required = (capacity as f64 / self.0 as f64).ceil();
        if required > MAX_TABLE_SIZE as f64 {
            return Err(Error::CapacityTooLarge(capacity));
        }
        Ok((required as usize).max(2).next_power_of_two())
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self(DEFAULT_LOAD_FACTOR)
    }
}

impl TryFrom<f32> for LoadFactor {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}
