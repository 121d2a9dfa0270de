//! Applying a calibration to displays.

use anyhow::{Context, Result};
use ggt_color::Calibration;
use ggt_colord::{ApplyOutcome, ColorService, DeviceInfo, ProfileManager};
use tracing::{info, warn};

/// Returns true if each change has to be confirmed by the user.
///
/// The countdown only runs on a terminal, and `--yes` skips it.
pub fn needs_confirmation(yes: bool, is_terminal: bool) -> bool {
    !yes && is_terminal
}

/// Applies `calibration` to each display in turn.
///
/// `confirm` is asked once per display after its new profile became the
/// default. A false answer reverts that display.
pub fn run<S, F>(
    manager: &ProfileManager<S>,
    displays: &[(usize, &DeviceInfo)],
    calibration: &Calibration,
    mut confirm: F,
) -> Result<()>
where
    S: ColorService,
    F: FnMut() -> bool,
{
    info!("Applying {}", calibration.title());

    for &(index, device) in displays {
        let name = device.display_name(index);
        let outcome = manager
            .apply(device, calibration, |_| confirm())
            .with_context(|| format!("Failed to apply calibration to {name}"))?;

        match outcome {
            ApplyOutcome::Applied { .. } => info!("Calibration applied to {name}"),
            ApplyOutcome::Reverted { clean: true, .. } => info!("Settings of {name} reverted"),
            ApplyOutcome::Reverted { clean: false, .. } => {
                warn!("Settings of {name} were only partially reverted")
            }
        }
    }
    Ok(())
}
