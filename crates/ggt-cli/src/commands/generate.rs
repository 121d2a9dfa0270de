//! Profile generation without applying.

use anyhow::{Context, Result};
use ggt_color::Calibration;
use ggt_icc::{derive_profile, Profile};
use std::path::Path;
use tracing::info;

/// Derives a calibrated profile from `input` (or built-in sRGB) and writes it
/// to `output`. colord is not contacted.
pub fn run(input: Option<&Path>, output: &Path, calibration: &Calibration) -> Result<()> {
    let base = match input {
        Some(path) => Profile::from_file(path)
            .with_context(|| format!("Failed to load: {}", path.display()))?,
        None => Profile::srgb(),
    };

    let derived = derive_profile(base, calibration).context("Failed to derive profile")?;
    derived
        .profile
        .save(output)
        .with_context(|| format!("Failed to save: {}", output.display()))?;

    info!("Wrote {} ({})", output.display(), derived.title);
    Ok(())
}
