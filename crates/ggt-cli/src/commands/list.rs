//! Display listing.

use anyhow::Result;
use ggt_colord::{ColorService, ProfileManager};
use std::io::Write;

/// Writes `index: name` for every display, with its current profile.
pub fn run<S: ColorService>(manager: &ProfileManager<S>, out: &mut impl Write) -> Result<()> {
    if manager.devices().is_empty() {
        writeln!(out, "No displays found")?;
        return Ok(());
    }

    for (index, device) in manager.devices().iter().enumerate() {
        writeln!(out, "{index}: {}", device.display_name(index))?;
        if let Some(profile) = manager.current_profile(device)? {
            let title = profile.title.clone().unwrap_or_else(|| profile.label());
            let own = if manager.is_own(&profile) {
                " (gnome-gamma-tool)"
            } else {
                ""
            };
            writeln!(out, "   profile: {title}{own}")?;
        }
    }
    Ok(())
}
