//! Per-channel parameter values.
//!
//! Every calibration parameter is an RGB 3-vector. Front-ends decide whether
//! to expose one control or three; the string form accepted here is either a
//! single scalar (`0.8`) or three colon-separated values (`0.8:0.9:1`).

use std::fmt;
use std::str::FromStr;

use crate::{CalibrationError, CalibrationResult};

/// Red, green and blue values of one calibration parameter.
///
/// # Example
///
/// ```rust
/// use ggt_color::Channels;
///
/// let gamma: Channels = "0.8".parse().unwrap();
/// assert_eq!(gamma, "0.8:0.8:0.8".parse().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channels(pub [f64; 3]);

impl Channels {
    /// Same value on all three channels.
    pub const fn uniform(value: f64) -> Self {
        Self([value; 3])
    }

    /// Creates a vector from explicit red, green and blue values.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Returns the values as an array.
    pub const fn values(&self) -> [f64; 3] {
        self.0
    }

    /// Returns true if all channels carry the same value.
    pub fn is_uniform(&self) -> bool {
        self.0[1] == self.0[0] && self.0[2] == self.0[0]
    }

    /// Largest channel value.
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Scales all channels down so that none exceeds 1.0.
    ///
    /// Ratios between channels are preserved: `1.5:1:1` becomes
    /// `1:0.667:0.667`. Vectors already within range are returned unchanged.
    pub fn fit_unit(self) -> Self {
        let max = self.max();
        if max > 1.0 {
            Self(self.0.map(|v| v / max))
        } else {
            self
        }
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl std::ops::Index<usize> for Channels {
    type Output = f64;

    fn index(&self, channel: usize) -> &f64 {
        &self.0[channel]
    }
}

impl From<[f64; 3]> for Channels {
    fn from(values: [f64; 3]) -> Self {
        Self(values)
    }
}

impl From<f64> for Channels {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}

impl FromStr for Channels {
    type Err = CalibrationError;

    fn from_str(s: &str) -> CalibrationResult<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();

        let parse = |part: &str| -> CalibrationResult<f64> {
            part.parse::<f64>().map_err(|e| CalibrationError::Parse {
                input: s.to_string(),
                reason: format!("'{part}' is not a number ({e})"),
            })
        };

        match parts.as_slice() {
            [v] => Ok(Self::uniform(parse(v)?)),
            [r, g, b] => Ok(Self([parse(r)?, parse(g)?, parse(b)?])),
            _ => Err(CalibrationError::Parse {
                input: s.to_string(),
                reason: format!("expected a value or R:G:B, got {} parts", parts.len()),
            }),
        }
    }
}

impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            return f.write_str(&format_value(self.0[0]));
        }
        let parts: Vec<String> = self.0.iter().map(|v| format_value(*v)).collect();
        f.write_str(&parts.join(":"))
    }
}

/// Formats with up to three decimals, dropping trailing zeros.
pub(crate) fn format_value(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" => "0".to_string(),
        s => s.to_string(),
    }
}
