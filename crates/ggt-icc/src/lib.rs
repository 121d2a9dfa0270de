//! # ggt-icc
//!
//! ICC profile support for display calibration.
//!
//! This crate wraps Little CMS 2 (through the `lcms2` crate) with the few
//! profile operations a calibration tool needs:
//!
//! - Load profiles from files or raw ICC data
//! - Fall back to a built-in sRGB profile
//! - Stamp description, model and a unique identifier
//! - Read and write the video card gamma table (`vcgt` tag)
//! - Derive a calibrated profile from a base profile
//!
//! # Example
//!
//! ```rust,no_run
//! use ggt_color::Calibration;
//! use ggt_icc::{derive_profile, Profile};
//! use std::path::Path;
//!
//! let base = Profile::from_file(Path::new("monitor.icc")).unwrap();
//! let derived = derive_profile(base, &Calibration::default()).unwrap();
//! derived.profile.save(Path::new("calibrated.icc")).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod derive;
mod error;
mod profile;

pub use derive::{derive_profile, DerivedProfile};
pub use error::{IccError, IccResult};
pub use profile::Profile;
