//! Calibration parameter set.

use crate::blackbody::NEUTRAL_TEMPERATURE;
use crate::{CalibrationError, CalibrationResult, Channels};

/// Prefix of the description stamped into generated profiles.
pub const TITLE_PREFIX: &str = "gamma-tool";

/// Signature used when every parameter is neutral.
pub const NEUTRAL_SIGNATURE: &str = "neutral";

/// A validated set of display calibration parameters.
///
/// Brightness bounds are fitted into [0, 1] on construction (see
/// [`Channels::fit_unit`]), so a `Calibration` always describes a gamma
/// table whose values stay in range.
///
/// # Example
///
/// ```rust
/// use ggt_color::{Calibration, Channels};
///
/// let cal = Calibration::new(
///     Channels::uniform(2.2),
///     5000,
///     Channels::uniform(1.0),
///     Channels::uniform(0.0),
///     Channels::uniform(1.0),
/// ).unwrap();
/// assert_eq!(cal.signature(), "g=2.2 t=5000");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    gamma: Channels,
    temperature: u32,
    contrast: Channels,
    min_brightness: Channels,
    max_brightness: Channels,
}

impl Calibration {
    /// Builds a calibration from raw parameters.
    ///
    /// `min_brightness` and `max_brightness` are fitted so that no channel
    /// exceeds 1.0 while keeping channel ratios.
    ///
    /// # Errors
    ///
    /// Fails if a gamma channel is not a positive finite number, a contrast
    /// channel is not finite, or a fitted brightness channel is negative.
    pub fn new(
        gamma: Channels,
        temperature: u32,
        contrast: Channels,
        min_brightness: Channels,
        max_brightness: Channels,
    ) -> CalibrationResult<Self> {
        let cal = Self {
            gamma,
            temperature,
            contrast,
            min_brightness: min_brightness.fit_unit(),
            max_brightness: max_brightness.fit_unit(),
        };
        cal.validate()?;
        Ok(cal)
    }

    fn validate(&self) -> CalibrationResult<()> {
        for v in self.gamma.values() {
            if !(v.is_finite() && v > 0.0) {
                return Err(CalibrationError::OutOfRange {
                    parameter: "gamma",
                    value: v,
                    expected: "a positive number",
                });
            }
        }
        for v in self.contrast.values() {
            if !v.is_finite() {
                return Err(CalibrationError::OutOfRange {
                    parameter: "contrast",
                    value: v,
                    expected: "a finite number",
                });
            }
        }
        for (parameter, channels) in [
            ("min-brightness", &self.min_brightness),
            ("brightness", &self.max_brightness),
        ] {
            for v in channels.values() {
                if !(0.0..=1.0).contains(&v) {
                    return Err(CalibrationError::OutOfRange {
                        parameter,
                        value: v,
                        expected: "0 to 1 after fitting",
                    });
                }
            }
        }
        Ok(())
    }

    /// Per-channel gamma exponent.
    pub fn gamma(&self) -> Channels {
        self.gamma
    }

    /// White point temperature in kelvin.
    pub fn temperature(&self) -> u32 {
        self.temperature
    }

    /// Per-channel contrast factor.
    pub fn contrast(&self) -> Channels {
        self.contrast
    }

    /// Per-channel minimum output level (fitted).
    pub fn min_brightness(&self) -> Channels {
        self.min_brightness
    }

    /// Per-channel maximum output level (fitted).
    pub fn max_brightness(&self) -> Channels {
        self.max_brightness
    }

    /// Returns true if no parameter changes the output.
    pub fn is_neutral(&self) -> bool {
        self.signature_parts().is_empty()
    }

    fn signature_parts(&self) -> Vec<String> {
        let mut parts = Vec::new();

        if self.gamma != Channels::uniform(1.0) {
            parts.push(format!("g={}", self.gamma));
        }
        if self.temperature != NEUTRAL_TEMPERATURE {
            parts.push(format!("t={}", self.temperature));
        }
        if self.contrast != Channels::uniform(1.0) {
            parts.push(format!("c={}", self.contrast));
        }
        if self.min_brightness != Channels::uniform(0.0)
            || self.max_brightness != Channels::uniform(1.0)
        {
            parts.push(format!("r=[{},{}]", self.min_brightness, self.max_brightness));
        }

        parts
    }

    /// Short description of the non-neutral parameters.
    ///
    /// Neutral parameters are left out; if all are neutral the result is
    /// [`NEUTRAL_SIGNATURE`].
    pub fn signature(&self) -> String {
        let parts = self.signature_parts();
        if parts.is_empty() {
            NEUTRAL_SIGNATURE.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Profile description and model text, e.g. `gamma-tool: g=2.2`.
    pub fn title(&self) -> String {
        format!("{TITLE_PREFIX}: {}", self.signature())
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            gamma: Channels::uniform(1.0),
            temperature: NEUTRAL_TEMPERATURE,
            contrast: Channels::uniform(1.0),
            min_brightness: Channels::uniform(0.0),
            max_brightness: Channels::uniform(1.0),
        }
    }
}
