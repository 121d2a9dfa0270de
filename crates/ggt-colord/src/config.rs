//! Manager configuration.

use crate::{ColordError, ColordResult};
use std::path::PathBuf;
use std::time::Duration;

/// File name prefix reserved for profiles generated by this tool.
pub const PROFILE_PREFIX: &str = "gnome-gamma-tool-";

/// Suffix of the temporary file a profile is written to before the rename.
pub const TEMP_SUFFIX: &str = "-ggtmp";

/// How long to wait for the daemon to pick up a new profile.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Interval between polls of the profile-added notifications.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where profiles go and how long registration may take.
///
/// # Example
///
/// ```rust
/// use ggt_colord::ManagerConfig;
/// use std::time::Duration;
///
/// let config = ManagerConfig::new("/tmp/icc").with_timeout(Duration::from_secs(1));
/// assert_eq!(config.prefix, "gnome-gamma-tool-");
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory watched by the daemon for user profiles.
    pub icc_dir: PathBuf,
    /// Reserved file name prefix identifying our profiles.
    pub prefix: String,
    /// Registration deadline.
    pub timeout: Duration,
    /// Registration poll interval.
    pub poll_interval: Duration,
}

impl ManagerConfig {
    /// Configuration storing profiles in `icc_dir` with default timings.
    pub fn new(icc_dir: impl Into<PathBuf>) -> Self {
        Self {
            icc_dir: icc_dir.into(),
            prefix: PROFILE_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Configuration for the current user: profiles go to `<data dir>/icc`,
    /// the directory colord watches (`~/.local/share/icc` on Linux).
    pub fn user_default() -> ColordResult<Self> {
        let data_dir = dirs::data_dir().ok_or(ColordError::NoDataDir)?;
        Ok(Self::new(data_dir.join("icc")))
    }

    /// Overrides the registration deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the registration poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
