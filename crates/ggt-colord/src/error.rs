//! Error types for device and profile orchestration.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Orchestration error.
#[derive(Debug, Error)]
pub enum ColordError {
    /// D-Bus transport or method call failure.
    #[error("colord request failed: {0}")]
    Dbus(#[from] zbus::Error),

    /// An object path or value could not be converted.
    #[error("invalid colord value: {0}")]
    Variant(#[from] zbus::zvariant::Error),

    /// The service rejected a request.
    #[error("colord refused: {0}")]
    Service(String),

    /// Requested display index does not exist.
    #[error("No such display, found {count} displays.")]
    NoSuchDisplay {
        /// Requested index.
        index: usize,
        /// Number of display devices found.
        count: usize,
    },

    /// The service did not report the new profile before the deadline.
    #[error("profile {} was not added in time ({timeout:?})", path.display())]
    NotAddedInTime {
        /// Profile file that was written.
        path: PathBuf,
        /// How long we waited.
        timeout: Duration,
    },

    /// A registered profile has no backing file to load.
    #[error("profile {0} has no backing file")]
    NoBackingFile(String),

    /// No user data directory to store profiles in.
    #[error("cannot determine the user data directory")]
    NoDataDir,

    /// Profile load, derivation or serialization failed.
    #[error(transparent)]
    Icc(#[from] ggt_icc::IccError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for orchestration operations.
pub type ColordResult<T> = Result<T, ColordError>;
