//! # ggt-colord
//!
//! Display device and profile orchestration for gnome-gamma-tool.
//!
//! The crate talks to a color management daemon through the
//! [`ColorService`] trait. [`ColordClient`] implements it for colord over the
//! system D-Bus; [`ProfileManager`] builds the tool's operations on top:
//!
//! - **Apply** - derive a calibrated profile from the display's current one,
//!   register it and make it the default, with optional confirmation
//! - **Remove** - detach and delete the profile this tool generated
//! - **Register** - write, rename and wait until the daemon picks the file up
//!
//! # Registration
//!
//! colord watches the user profile directory and announces new files with a
//! `ProfileAdded` signal. Profiles are written as `<name>.icc-ggtmp`, renamed
//! to `<name>.icc`, and the signal stream is polled every 10 ms for up to 4 s.
//!
//! ```text
//!   save(tmp) --rename--> <icc_dir>/gnome-gamma-tool-<uuid>.icc
//!                                   |
//!            ProfileAdded(o) <------+   poll: 10ms, deadline: 4s
//!                  |
//!            AddProfile("hard", o) --> MakeProfileDefault(o)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ggt_color::Calibration;
//! use ggt_colord::{ApplyOutcome, ColordClient, ManagerConfig, ProfileManager};
//!
//! let manager = ProfileManager::new(
//!     ColordClient::connect().unwrap(),
//!     ManagerConfig::user_default().unwrap(),
//! ).unwrap();
//!
//! let display = manager.device(0).unwrap();
//! match manager.apply(display, &Calibration::default(), |_| true).unwrap() {
//!     ApplyOutcome::Applied { profile, .. } => println!("now using {}", profile.label()),
//!     ApplyOutcome::Reverted { .. } => println!("reverted"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod dbus;
mod error;
mod manager;
mod service;

pub use config::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, ManagerConfig, PROFILE_PREFIX, TEMP_SUFFIX,
};
pub use dbus::ColordClient;
pub use error::{ColordError, ColordResult};
pub use manager::{ApplyOutcome, ProfileManager, RemoveOutcome, SRGB_FILENAME};
pub use service::{
    ColorService, DeviceId, DeviceInfo, KIND_DISPLAY, ProfileId, ProfileInfo, ProfileWatch,
};
