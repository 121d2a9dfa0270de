//! Removal of generated profiles.

use anyhow::{Context, Result};
use ggt_colord::{ColorService, DeviceInfo, ProfileManager, RemoveOutcome};
use tracing::{info, warn};

/// Removes this tool's profile from each display where it is active.
///
/// Displays running a foreign profile, or none, are left alone.
pub fn run<S: ColorService>(
    manager: &ProfileManager<S>,
    displays: &[(usize, &DeviceInfo)],
) -> Result<()> {
    for &(index, device) in displays {
        let name = device.display_name(index);
        let outcome = manager
            .remove_own(device)
            .with_context(|| format!("Failed to remove profile from {name}"))?;

        match outcome {
            RemoveOutcome::Removed(profile) => info!("Removed {} from {name}", profile.label()),
            RemoveOutcome::Refused(profile) => {
                warn!("colord kept {} on {name}, file left in place", profile.label())
            }
            RemoveOutcome::NotOwn(_) | RemoveOutcome::NoProfile => {}
        }
    }
    Ok(())
}
