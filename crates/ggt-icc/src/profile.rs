//! ICC profile wrapper.

use crate::{IccError, IccResult};
use ggt_color::{GammaTable, VCGT_SIZE};
use lcms2::{
    ColorSpaceSignature, Locale, Profile as LcmsProfile, Tag, TagSignature, ToneCurve,
    ToneCurveRef, MLU,
};
use std::path::Path;

/// Key written in front of the unique identifier text.
const UNIQUE_ID_KEY: &str = "uuid=";

/// An ICC color profile.
///
/// Holds a display profile together with the calibration metadata this tool
/// stamps into it: description, model, a unique identifier and the video
/// card gamma table (`vcgt` tag).
///
/// # Example
///
/// ```rust,no_run
/// use ggt_icc::Profile;
/// use std::path::Path;
///
/// // Load from file
/// let profile = Profile::from_file(Path::new("monitor.icc")).unwrap();
///
/// // Get profile info
/// println!("Description: {}", profile.description());
/// println!("Has VCGT: {}", profile.vcgt().is_some());
/// ```
pub struct Profile {
    /// Internal lcms2 profile handle.
    pub(crate) inner: LcmsProfile,
}

impl Profile {
    /// Loads a profile from an ICC file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid data.
    pub fn from_file(path: &Path) -> IccResult<Self> {
        let inner = LcmsProfile::new_file(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self { inner })
    }

    /// Creates a profile from raw ICC data.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data)
            .map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Creates the built-in sRGB profile.
    ///
    /// Used as base data when a display has no profile at all.
    ///
    /// ```rust
    /// use ggt_icc::Profile;
    ///
    /// let srgb = Profile::srgb();
    /// assert!(srgb.is_rgb());
    /// ```
    pub fn srgb() -> Self {
        Self {
            inner: LcmsProfile::new_srgb(),
        }
    }

    /// Returns the profile description.
    pub fn description(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Description, Locale::none())
            .unwrap_or_default()
    }

    /// Returns the profile model.
    pub fn model(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Model, Locale::none())
            .unwrap_or_default()
    }

    /// Returns true if this is an RGB profile.
    pub fn is_rgb(&self) -> bool {
        matches!(self.inner.color_space(), ColorSpaceSignature::RgbData)
    }

    /// Replaces the profile description.
    pub fn set_description(&mut self, text: &str) -> IccResult<()> {
        self.write_text(TagSignature::ProfileDescriptionTag, text, "description")
    }

    /// Replaces the device model description.
    pub fn set_model(&mut self, text: &str) -> IccResult<()> {
        self.write_text(TagSignature::DeviceModelDescTag, text, "model")
    }

    /// Stamps a unique identifier into the profile.
    ///
    /// A fresh identifier changes the profile checksum even when the gamma
    /// table is identical to an already registered profile.
    pub fn set_unique_id(&mut self, id: &str) -> IccResult<()> {
        let text = format!("{UNIQUE_ID_KEY}{id}");
        self.write_text(TagSignature::CharTargetTag, &text, "unique id")
    }

    /// Returns the identifier stamped by [`Profile::set_unique_id`], if any.
    pub fn unique_id(&self) -> Option<String> {
        match self.inner.read_tag(TagSignature::CharTargetTag) {
            Tag::MLU(mlu) => mlu
                .text(Locale::none())
                .ok()
                .and_then(|t| t.strip_prefix(UNIQUE_ID_KEY).map(str::to_string)),
            _ => None,
        }
    }

    fn write_text(&mut self, sig: TagSignature, text: &str, what: &'static str) -> IccResult<()> {
        let mut mlu = MLU::new(1);
        if !mlu.set_text(text, Locale::none()) {
            return Err(IccError::TagWriteFailed(what));
        }
        if !self.inner.write_tag(sig, Tag::MLU(&mlu)) {
            return Err(IccError::TagWriteFailed(what));
        }
        Ok(())
    }

    /// Embeds a gamma table as the `vcgt` tag, replacing any existing one.
    pub fn set_vcgt(&mut self, table: &GammaTable) -> IccResult<()> {
        let [r, g, b] = table.to_u16_channels();
        let red = ToneCurve::new_tabulated(&r);
        let green = ToneCurve::new_tabulated(&g);
        let blue = ToneCurve::new_tabulated(&b);
        let curves: [&ToneCurveRef; 3] = [&red, &green, &blue];

        if !self.inner.write_tag(TagSignature::VcgtTag, Tag::VcgtCurves(curves)) {
            return Err(IccError::TagWriteFailed("vcgt"));
        }
        Ok(())
    }

    /// Reads the `vcgt` tag back as a gamma table.
    ///
    /// Returns `None` if the profile carries no gamma table.
    pub fn vcgt(&self) -> Option<GammaTable> {
        let Tag::VcgtCurves(curves) = self.inner.read_tag(TagSignature::VcgtTag) else {
            return None;
        };

        let last = (VCGT_SIZE - 1) as f32;
        let entries = (0..VCGT_SIZE)
            .map(|i| {
                let x = i as f32 / last;
                std::array::from_fn(|c| f64::from(curves[c].eval(x)))
            })
            .collect();

        GammaTable::from_entries(entries).ok()
    }

    /// Exports the profile as ICC data.
    pub fn to_icc(&self) -> IccResult<Vec<u8>> {
        self.inner
            .icc()
            .map_err(|e| IccError::CreateFailed(e.to_string()))
    }

    /// Writes the profile to an ICC file.
    pub fn save(&self, path: &Path) -> IccResult<()> {
        let data = self.to_icc()?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("description", &self.description())
            .field("unique_id", &self.unique_id())
            .finish()
    }
}
