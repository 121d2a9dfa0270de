//! Device and profile orchestration.
//!
//! [`ProfileManager`] drives a [`ColorService`] through the steps of applying
//! a calibration: enable the device, pick a base profile, derive the
//! calibrated profile, hand it to the service and make it the default.

use crate::config::TEMP_SUFFIX;
use crate::service::{ColorService, DeviceInfo, ProfileInfo};
use crate::{ColordError, ColordResult, ManagerConfig};
use ggt_color::Calibration;
use ggt_icc::{derive_profile, Profile};
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// File name of the standard sRGB profile shipped with colord.
pub const SRGB_FILENAME: &str = "sRGB.icc";

/// Result of [`ProfileManager::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The new profile is the device default.
    Applied {
        /// The registered profile.
        profile: ProfileInfo,
        /// Our previous profile, removed in favor of the new one.
        replaced: Option<ProfileInfo>,
    },
    /// The change was declined and rolled back.
    Reverted {
        /// Profile restored as default, if there was one.
        restored: Option<ProfileInfo>,
        /// False if any revert step failed.
        clean: bool,
    },
}

/// Result of [`ProfileManager::remove_own`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Our profile was detached and its file deleted.
    Removed(ProfileInfo),
    /// The service refused to detach the profile; its file was kept.
    Refused(ProfileInfo),
    /// The current profile was not generated by this tool.
    NotOwn(ProfileInfo),
    /// The device has no profile.
    NoProfile,
}

/// Applies and removes calibration profiles on display devices.
///
/// # Example
///
/// ```rust,no_run
/// use ggt_color::Calibration;
/// use ggt_colord::{ColordClient, ManagerConfig, ProfileManager};
///
/// let client = ColordClient::connect().unwrap();
/// let manager = ProfileManager::new(client, ManagerConfig::user_default().unwrap()).unwrap();
/// let display = manager.device(0).unwrap();
/// manager.apply(display, &Calibration::default(), |_| true).unwrap();
/// ```
pub struct ProfileManager<S> {
    service: S,
    config: ManagerConfig,
    devices: Vec<DeviceInfo>,
}

impl<S: ColorService> ProfileManager<S> {
    /// Enumerates the service's display devices.
    pub fn new(service: S, config: ManagerConfig) -> ColordResult<Self> {
        let devices: Vec<DeviceInfo> = service
            .devices()?
            .into_iter()
            .filter(|d| d.is_display())
            .collect();
        debug!(displays = devices.len(), "enumerated devices");

        Ok(Self {
            service,
            config,
            devices,
        })
    }

    /// Display devices in service order.
    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    /// Display device by index.
    ///
    /// # Errors
    ///
    /// [`ColordError::NoSuchDisplay`] if the index is out of range.
    pub fn device(&self, index: usize) -> ColordResult<&DeviceInfo> {
        self.devices.get(index).ok_or(ColordError::NoSuchDisplay {
            index,
            count: self.devices.len(),
        })
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Enables color management on the device if it is off.
    ///
    /// Returns true if the device had to be enabled.
    pub fn ensure_enabled(&self, device: &DeviceInfo) -> ColordResult<bool> {
        if self.service.device_enabled(&device.id)? {
            return Ok(false);
        }
        info!(device = %device.id, "Enabling color management for device");
        self.service.set_device_enabled(&device.id, true)?;
        Ok(true)
    }

    /// The device's default profile, if it has any.
    pub fn current_profile(&self, device: &DeviceInfo) -> ColordResult<Option<ProfileInfo>> {
        match self.service.device_profiles(&device.id)?.first() {
            Some(id) => Ok(Some(self.service.profile_info(id)?)),
            None => Ok(None),
        }
    }

    /// Attaches the service's sRGB profile to the device.
    ///
    /// Returns `None` if the service does not know an sRGB profile.
    pub fn attach_srgb(&self, device: &DeviceInfo) -> ColordResult<Option<ProfileInfo>> {
        let Some(id) = self.service.find_profile_by_filename(SRGB_FILENAME)? else {
            return Ok(None);
        };
        self.service.add_profile(&device.id, &id)?;
        Ok(Some(self.service.profile_info(&id)?))
    }

    /// Returns true if the profile was generated by this tool.
    pub fn is_own(&self, profile: &ProfileInfo) -> bool {
        profile.has_prefix(&self.config.prefix)
    }

    /// Loads the ICC data behind a registered profile.
    pub fn load_profile_data(&self, profile: &ProfileInfo) -> ColordResult<Profile> {
        let path = profile
            .filename
            .as_deref()
            .ok_or_else(|| ColordError::NoBackingFile(profile.id.to_string()))?;
        Ok(Profile::from_file(path)?)
    }

    /// Hands a profile to the service and attaches it to the device.
    ///
    /// The profile is written under a temporary name and renamed into the
    /// profile directory so the service never sees a partial file. The call
    /// then waits for the service to announce a profile backed by the final
    /// path.
    ///
    /// # Errors
    ///
    /// [`ColordError::NotAddedInTime`] if no announcement arrives before
    /// the configured timeout. The written file is removed in that case.
    pub fn register_profile(
        &self,
        device: &DeviceInfo,
        profile: &Profile,
        file_name: &str,
    ) -> ColordResult<ProfileInfo> {
        // Subscribe first so the announcement cannot be missed.
        let mut watch = self.service.watch_profiles()?;

        fs::create_dir_all(&self.config.icc_dir)?;
        let final_path = self.config.icc_dir.join(file_name);
        let temp_path = self.config.icc_dir.join(format!("{file_name}{TEMP_SUFFIX}"));

        profile.save(&temp_path)?;
        if let Err(e) = fs::rename(&temp_path, &final_path) {
            remove_quietly(&temp_path);
            return Err(e.into());
        }
        debug!(path = %final_path.display(), "profile written, waiting for the service");

        let deadline = Instant::now() + self.config.timeout;
        loop {
            while let Some(id) = watch.poll_added()? {
                let info = self.service.profile_info(&id)?;
                trace!(profile = %id, filename = ?info.filename, "profile added");
                if info.filename.as_deref() == Some(final_path.as_path()) {
                    self.service.add_profile(&device.id, &info.id)?;
                    return Ok(info);
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(self.config.poll_interval);
        }

        remove_quietly(&final_path);
        Err(ColordError::NotAddedInTime {
            path: final_path,
            timeout: self.config.timeout,
        })
    }

    /// Makes the profile the device default.
    pub fn make_default(&self, device: &DeviceInfo, profile: &ProfileInfo) -> ColordResult<()> {
        self.service.make_profile_default(&device.id, &profile.id)
    }

    /// Detaches a profile from the device and deletes its file.
    ///
    /// Returns false if the service refused; the file is kept then. A file
    /// that is already gone is not an error.
    pub fn remove_profile(
        &self,
        device: &DeviceInfo,
        profile: &ProfileInfo,
    ) -> ColordResult<bool> {
        if let Err(e) = self.service.remove_profile(&device.id, &profile.id) {
            warn!(
                profile = %profile.label(),
                error = %e,
                "Could not remove profile, keeping its file"
            );
            return Ok(false);
        }

        if let Some(path) = &profile.filename {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "deleted profile file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "profile file already gone");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    /// Applies a calibration to the device.
    ///
    /// The new profile is derived from the current default (or sRGB), made
    /// the default, and then `confirm` decides whether it stays. A declined
    /// change is reverted on a best-effort basis. An accepted change replaces
    /// our previous profile so at most one generated profile stays attached.
    pub fn apply<F>(
        &self,
        device: &DeviceInfo,
        calibration: &Calibration,
        confirm: F,
    ) -> ColordResult<ApplyOutcome>
    where
        F: FnOnce(&ProfileInfo) -> bool,
    {
        self.ensure_enabled(device)?;

        let (previous, base) = self.base_profile(device)?;
        if let Some(previous) = &previous {
            info!("Current profile is {}", previous.label());
        }

        let derived = derive_profile(base, calibration)?;
        let file_name = derived.file_name(&self.config.prefix);
        let new = self.register_profile(device, &derived.profile, &file_name)?;
        info!("New profile is {}", new.label());
        self.make_default(device, &new)?;

        if !confirm(&new) {
            let clean = self.revert(device, previous.as_ref(), &new);
            return Ok(ApplyOutcome::Reverted {
                restored: previous,
                clean,
            });
        }

        let replaced = match previous {
            Some(old) if old.id != new.id && self.is_own(&old) => {
                info!("Removing old profile {}", old.label());
                self.remove_profile(device, &old)?.then_some(old)
            }
            _ => None,
        };

        Ok(ApplyOutcome::Applied {
            profile: new,
            replaced,
        })
    }

    /// Applies a calibration to every display in turn.
    ///
    /// `confirm` is asked once per display.
    pub fn apply_all<F>(
        &self,
        calibration: &Calibration,
        mut confirm: F,
    ) -> ColordResult<Vec<ApplyOutcome>>
    where
        F: FnMut(&DeviceInfo, &ProfileInfo) -> bool,
    {
        self.devices
            .iter()
            .map(|device| self.apply(device, calibration, |profile| confirm(device, profile)))
            .collect()
    }

    /// Removes the device's current profile if this tool generated it.
    pub fn remove_own(&self, device: &DeviceInfo) -> ColordResult<RemoveOutcome> {
        let Some(current) = self.current_profile(device)? else {
            info!(device = %device.id, "No profile is set, nothing to remove");
            return Ok(RemoveOutcome::NoProfile);
        };

        if !self.is_own(&current) {
            info!(
                "Current profile {} was not created by gnome-gamma-tool, nothing to remove",
                current.label()
            );
            return Ok(RemoveOutcome::NotOwn(current));
        }

        info!("Removing profile {}", current.label());
        if self.remove_profile(device, &current)? {
            Ok(RemoveOutcome::Removed(current))
        } else {
            Ok(RemoveOutcome::Refused(current))
        }
    }

    /// Picks the profile to derive from and the default to restore on revert.
    fn base_profile(
        &self,
        device: &DeviceInfo,
    ) -> ColordResult<(Option<ProfileInfo>, Profile)> {
        let current = match self.current_profile(device)? {
            Some(current) => Some(current),
            None => {
                info!(device = %device.id, "No profile set, falling back to sRGB");
                self.attach_srgb(device)?
            }
        };

        let data = match &current {
            Some(info) if info.filename.is_some() => self.load_profile_data(info)?,
            Some(info) => {
                warn!(
                    profile = %info.id,
                    "Current profile has no file, deriving from built-in sRGB"
                );
                Profile::srgb()
            }
            None => {
                info!("sRGB profile not registered, using built-in sRGB");
                Profile::srgb()
            }
        };

        Ok((current, data))
    }

    fn revert(
        &self,
        device: &DeviceInfo,
        previous: Option<&ProfileInfo>,
        new: &ProfileInfo,
    ) -> bool {
        info!("Reverting settings");
        let mut clean = true;

        let restore = |clean: &mut bool| {
            if let Some(previous) = previous {
                if let Err(e) = self.make_default(device, previous) {
                    warn!(
                        profile = %previous.label(),
                        error = %e,
                        "Could not restore previous profile"
                    );
                    *clean = false;
                }
            }
        };

        restore(&mut clean);
        match self.remove_profile(device, new) {
            Ok(true) => {}
            Ok(false) => clean = false,
            Err(e) => {
                warn!(profile = %new.label(), error = %e, "Could not delete reverted profile");
                clean = false;
            }
        }
        // Removing the default may let the service pick another one.
        restore(&mut clean);

        clean
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "could not remove file");
    }
}
