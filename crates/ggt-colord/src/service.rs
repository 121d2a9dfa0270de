//! The color management service seam.
//!
//! [`ColorService`] is everything the orchestration needs from a color
//! management daemon. [`ColordClient`](crate::ColordClient) implements it over
//! D-Bus; tests implement it in memory.

use crate::ColordResult;
use std::fmt;
use std::path::{Path, PathBuf};

/// Device kind string colord uses for monitors.
pub const KIND_DISPLAY: &str = "display";

/// Service-side identifier of a device (a D-Bus object path for colord).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

/// Service-side identifier of a profile (a D-Bus object path for colord).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileId(String);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Wraps a service identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

impl_id!(DeviceId);
impl_id!(ProfileId);

/// A device known to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Service identifier.
    pub id: DeviceId,
    /// Device kind (`display`, `printer`, ...).
    pub kind: String,
    /// Vendor name, if known.
    pub vendor: Option<String>,
    /// Model name, if known.
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Returns true for monitors.
    pub fn is_display(&self) -> bool {
        self.kind == KIND_DISPLAY
    }

    /// Human readable name: model, then vendor, then `Display {index}`.
    pub fn display_name(&self, index: usize) -> String {
        let non_empty = |s: &Option<String>| {
            s.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
        };
        non_empty(&self.model)
            .or_else(|| non_empty(&self.vendor))
            .unwrap_or_else(|| format!("Display {index}"))
    }
}

/// A profile registered with the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    /// Service identifier.
    pub id: ProfileId,
    /// Backing ICC file, if the profile has one.
    pub filename: Option<PathBuf>,
    /// Profile title, if known.
    pub title: Option<String>,
}

impl ProfileInfo {
    /// Backing filename, or the service identifier when there is none.
    pub fn label(&self) -> String {
        match &self.filename {
            Some(path) => path.display().to_string(),
            None => self.id.to_string(),
        }
    }

    /// Returns true if this profile was generated by us, i.e. its file name
    /// (or identifier, for file-less profiles) carries the reserved prefix.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        match self.filename.as_deref().and_then(Path::file_name) {
            Some(name) => name.to_string_lossy().starts_with(prefix),
            None => self.id.as_str().contains(prefix),
        }
    }
}

/// Non-blocking view of the service's profile-added notifications.
pub trait ProfileWatch {
    /// Returns the next profile announced since the last call, if any.
    ///
    /// Never blocks; `Ok(None)` means nothing is pending right now.
    fn poll_added(&mut self) -> ColordResult<Option<ProfileId>>;
}

/// Operations on a color management daemon.
///
/// All calls block until the service answers, except profile-added
/// notifications which are delivered asynchronously through
/// [`ColorService::watch_profiles`].
pub trait ColorService {
    /// Lists all devices with their kind.
    fn devices(&self) -> ColordResult<Vec<DeviceInfo>>;

    /// Returns whether color management is enabled for the device.
    fn device_enabled(&self, device: &DeviceId) -> ColordResult<bool>;

    /// Enables or disables color management for the device.
    fn set_device_enabled(&self, device: &DeviceId, enabled: bool) -> ColordResult<()>;

    /// Profiles attached to the device, default first.
    fn device_profiles(&self, device: &DeviceId) -> ColordResult<Vec<ProfileId>>;

    /// Looks up a profile's filename and title.
    fn profile_info(&self, profile: &ProfileId) -> ColordResult<ProfileInfo>;

    /// Finds a registered profile by file name, e.g. `sRGB.icc`.
    fn find_profile_by_filename(&self, filename: &str) -> ColordResult<Option<ProfileId>>;

    /// Attaches a profile to the device with a hard relation.
    fn add_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()>;

    /// Detaches a profile from the device.
    fn remove_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()>;

    /// Makes the profile the device default.
    fn make_profile_default(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()>;

    /// Subscribes to profile-added notifications.
    ///
    /// Only profiles added after this call are reported.
    fn watch_profiles(&self) -> ColordResult<Box<dyn ProfileWatch + '_>>;
}
