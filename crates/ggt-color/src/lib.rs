//! # ggt-color
//!
//! Display calibration math for gnome-gamma-tool.
//!
//! This crate turns a set of calibration parameters into a video card gamma
//! table (VCGT), the per-channel ramp that a color management daemon loads
//! into the display pipeline:
//!
//! - **Parameters** - gamma, white point temperature, contrast and output
//!   range, each an RGB 3-vector ([`Channels`])
//! - **White point** - black-body RGB along the Planckian locus
//! - **Gamma table** - 256 RGB samples in [0, 1] ([`GammaTable`])
//!
//! # Architecture
//!
//! ```text
//!   "2.2" / "1:0.9:0.8"
//!           |
//!       Channels --fit/validate--> Calibration
//!                                      |
//!                  blackbody_rgb ---> GammaTable (256 x RGB)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ggt_color::{Calibration, GammaTable};
//!
//! let cal = Calibration::new(
//!     "2.2".parse().unwrap(),
//!     5000,
//!     "1".parse().unwrap(),
//!     "0".parse().unwrap(),
//!     "1".parse().unwrap(),
//! ).unwrap();
//!
//! let table = GammaTable::generate(&cal);
//! assert_eq!(table.len(), 256);
//! println!("{}", cal.title()); // gamma-tool: g=2.2 t=5000
//! ```
//!
//! # Used By
//!
//! - `ggt-icc` - embeds the table into ICC profiles
//! - `ggt-colord` - applies calibrations to display devices

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod blackbody;
mod channels;
mod error;
mod params;
mod vcgt;

pub use blackbody::{blackbody_rgb, MAX_TEMPERATURE, MIN_TEMPERATURE, NEUTRAL_TEMPERATURE};
pub use channels::Channels;
pub use error::{CalibrationError, CalibrationResult};
pub use params::{Calibration, NEUTRAL_SIGNATURE, TITLE_PREFIX};
pub use vcgt::{linear_map, GammaTable, VCGT_SIZE};
