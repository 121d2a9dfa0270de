//! Video card gamma table generation.
//!
//! The table maps 256 evenly spaced input levels to per-channel output levels.
//! Each sample goes through three stages in a fixed order:
//!
//! 1. gamma and white point: `blackbody[c] * (i / 255)^(1 / gamma[c])`
//! 2. contrast around mid-gray, clamped to [0, 1]
//! 3. linear remap of [0, 1] onto [min[c], max[c]]

use crate::{blackbody_rgb, Calibration, CalibrationError, CalibrationResult};

/// Number of entries in a gamma table.
pub const VCGT_SIZE: usize = 256;

/// Maps `x` from the range [smin, smax] onto [dmin, dmax].
#[inline]
pub fn linear_map(x: f64, smin: f64, smax: f64, dmin: f64, dmax: f64) -> f64 {
    (x - smin) / (smax - smin) * (dmax - dmin) + dmin
}

/// A per-channel gamma ramp with [`VCGT_SIZE`] RGB entries in [0, 1].
///
/// # Example
///
/// ```rust
/// use ggt_color::{Calibration, GammaTable, VCGT_SIZE};
///
/// let table = GammaTable::generate(&Calibration::default());
/// assert_eq!(table.len(), VCGT_SIZE);
/// assert_eq!(table.entries()[255], [1.0, 1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GammaTable {
    entries: Vec<[f64; 3]>,
}

impl GammaTable {
    /// Computes the gamma table for a calibration.
    pub fn generate(calibration: &Calibration) -> Self {
        let white = blackbody_rgb(calibration.temperature());
        let gamma = calibration.gamma();
        let contrast = calibration.contrast();
        let bmin = calibration.min_brightness();
        let bmax = calibration.max_brightness();
        let last = (VCGT_SIZE - 1) as f64;

        let entries = (0..VCGT_SIZE)
            .map(|i| {
                let x = i as f64 / last;
                std::array::from_fn(|c| {
                    let v = white[c] * x.powf(1.0 / gamma[c]);
                    let v = (contrast[c] * (v - 0.5) + 0.5).clamp(0.0, 1.0);
                    linear_map(v, 0.0, 1.0, bmin[c], bmax[c])
                })
            })
            .collect();

        Self { entries }
    }

    /// Creates a table from existing entries, e.g. read back from a profile.
    ///
    /// # Errors
    ///
    /// Fails unless exactly [`VCGT_SIZE`] entries are given.
    pub fn from_entries(entries: Vec<[f64; 3]>) -> CalibrationResult<Self> {
        if entries.len() != VCGT_SIZE {
            return Err(CalibrationError::TableSize {
                expected: VCGT_SIZE,
                actual: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    /// All entries in input order.
    pub fn entries(&self) -> &[[f64; 3]] {
        &self.entries
    }

    /// Number of entries (always [`VCGT_SIZE`]).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the values of one channel (0 = red, 1 = green, 2 = blue).
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(move |e| e[channel])
    }

    /// Quantizes each channel to 16-bit values, as stored in ICC curves.
    pub fn to_u16_channels(&self) -> [Vec<u16>; 3] {
        std::array::from_fn(|c| {
            self.channel(c)
                .map(|v| (v.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16)
                .collect()
        })
    }

    /// Largest absolute per-channel difference to another table.
    pub fn max_difference(&self, other: &GammaTable) -> f64 {
        self.entries
            .iter()
            .zip(&other.entries)
            .flat_map(|(a, b)| (0..3).map(move |c| (a[c] - b[c]).abs()))
            .fold(0.0, f64::max)
    }
}
