//! Derivation of calibrated profiles from a base profile.

use crate::{IccResult, Profile};
use ggt_color::{Calibration, GammaTable};
use uuid::Uuid;

/// A profile derived from a base profile and a calibration.
#[derive(Debug)]
pub struct DerivedProfile {
    /// The new profile with description, model, identifier and `vcgt` set.
    pub profile: Profile,
    /// Random identifier stamped into the profile.
    pub unique_id: String,
    /// Description and model text.
    pub title: String,
}

impl DerivedProfile {
    /// File name for this profile under a reserved prefix: `<prefix><uuid>.icc`.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}{}.icc", self.unique_id)
    }
}

/// Derives a calibrated profile from `base`.
///
/// The base keeps its colorimetric data; description and model are replaced
/// by the calibration title, a fresh v4 UUID is stamped so the result is
/// always distinct from previously generated profiles, and the gamma table
/// computed from `calibration` is embedded.
///
/// # Example
///
/// ```rust
/// use ggt_color::Calibration;
/// use ggt_icc::{derive_profile, Profile};
///
/// let derived = derive_profile(Profile::srgb(), &Calibration::default()).unwrap();
/// assert_eq!(derived.profile.description(), "gamma-tool: neutral");
/// assert!(derived.profile.vcgt().is_some());
/// ```
pub fn derive_profile(base: Profile, calibration: &Calibration) -> IccResult<DerivedProfile> {
    let mut profile = base;
    let title = calibration.title();
    profile.set_description(&title)?;
    profile.set_model(&title)?;

    let unique_id = Uuid::new_v4().to_string();
    profile.set_unique_id(&unique_id)?;

    profile.set_vcgt(&GammaTable::generate(calibration))?;

    Ok(DerivedProfile {
        profile,
        unique_id,
        title,
    })
}
