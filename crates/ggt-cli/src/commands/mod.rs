//! CLI command implementations

pub mod apply;
pub mod generate;
pub mod list;
pub mod remove;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::{Context, Result};
use ggt_colord::{
    ColorService, ColordClient, ColordError, DeviceInfo, ManagerConfig, ProfileManager,
};

/// Connects to colord and enumerates display devices.
pub fn connect(config: ManagerConfig) -> Result<ProfileManager<ColordClient>> {
    let client = ColordClient::connect()
        .context("Cannot connect to colord, make sure the colord service is running")?;
    ProfileManager::new(client, config).context("Failed to enumerate color managed devices")
}

/// Resolves the displays a command acts on, paired with their index.
pub fn select_displays<S: ColorService>(
    manager: &ProfileManager<S>,
    display: usize,
    all: bool,
) -> Result<Vec<(usize, &DeviceInfo)>> {
    if !all {
        return Ok(vec![(display, manager.device(display)?)]);
    }
    if manager.devices().is_empty() {
        return Err(ColordError::NoSuchDisplay { index: 0, count: 0 }.into());
    }
    Ok(manager.devices().iter().enumerate().collect())
}
