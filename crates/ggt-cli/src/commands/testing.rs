//! In-memory color service for command tests.
//!
//! Profiles written into the profile directory are picked up the way colord
//! picks them up: a watch announces every `.icc` file that appeared after it
//! was created.

use ggt_colord::{
    ColorService, ColordError, ColordResult, DeviceId, DeviceInfo, ManagerConfig, ProfileId,
    ProfileInfo, ProfileManager, ProfileWatch,
};
use ggt_icc::Profile;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

struct Device {
    info: DeviceInfo,
    enabled: bool,
    profiles: Vec<ProfileId>,
}

#[derive(Default)]
struct State {
    devices: Vec<Device>,
    profiles: Vec<ProfileInfo>,
}

pub struct MemoryColord {
    icc_dir: PathBuf,
    state: RefCell<State>,
}

impl MemoryColord {
    pub fn add_device(&self, kind: &str, model: &str) -> DeviceId {
        let mut state = self.state.borrow_mut();
        let id = DeviceId::new(format!("/devices/dev{}", state.devices.len()));
        state.devices.push(Device {
            info: DeviceInfo {
                id: id.clone(),
                kind: kind.to_string(),
                vendor: None,
                model: Some(model.to_string()),
            },
            enabled: true,
            profiles: Vec::new(),
        });
        id
    }

    /// Writes a profile file titled `title` and makes it the device default.
    pub fn install(&self, device: &DeviceId, path: &Path, title: &str) -> ProfileId {
        let mut profile = Profile::srgb();
        profile.set_description(title).unwrap();
        profile.save(path).unwrap();

        let id = self.register(path);
        let mut state = self.state.borrow_mut();
        let device = state.devices.iter_mut().find(|d| &d.info.id == device).unwrap();
        device.profiles.insert(0, id.clone());
        id
    }

    pub fn default_profile(&self, device: &DeviceId) -> Option<ProfileInfo> {
        let id = self.device_profiles(device).unwrap().first().cloned()?;
        self.profile_info(&id).ok()
    }

    fn register(&self, path: &Path) -> ProfileId {
        let mut state = self.state.borrow_mut();
        let id = ProfileId::new(format!("/profiles/icc_{}", state.profiles.len()));
        state.profiles.push(ProfileInfo {
            id: id.clone(),
            filename: Some(path.to_path_buf()),
            title: Profile::from_file(path).ok().map(|p| p.description()),
        });
        id
    }

    fn with_device<T>(&self, id: &DeviceId, f: impl FnOnce(&mut Device) -> T) -> ColordResult<T> {
        let mut state = self.state.borrow_mut();
        let device = state
            .devices
            .iter_mut()
            .find(|d| &d.info.id == id)
            .ok_or_else(|| ColordError::Service(format!("no such device {id}")))?;
        Ok(f(device))
    }
}

impl ColorService for MemoryColord {
    fn devices(&self) -> ColordResult<Vec<DeviceInfo>> {
        Ok(self.state.borrow().devices.iter().map(|d| d.info.clone()).collect())
    }

    fn device_enabled(&self, device: &DeviceId) -> ColordResult<bool> {
        self.with_device(device, |d| d.enabled)
    }

    fn set_device_enabled(&self, device: &DeviceId, enabled: bool) -> ColordResult<()> {
        self.with_device(device, |d| d.enabled = enabled)
    }

    fn device_profiles(&self, device: &DeviceId) -> ColordResult<Vec<ProfileId>> {
        self.with_device(device, |d| d.profiles.clone())
    }

    fn profile_info(&self, profile: &ProfileId) -> ColordResult<ProfileInfo> {
        self.state
            .borrow()
            .profiles
            .iter()
            .find(|p| &p.id == profile)
            .cloned()
            .ok_or_else(|| ColordError::Service(format!("no such profile {profile}")))
    }

    fn find_profile_by_filename(&self, _filename: &str) -> ColordResult<Option<ProfileId>> {
        Ok(None)
    }

    fn add_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        self.with_device(device, |d| {
            if !d.profiles.contains(profile) {
                d.profiles.push(profile.clone());
            }
        })
    }

    fn remove_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        self.with_device(device, |d| d.profiles.retain(|p| p != profile))
    }

    fn make_profile_default(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        self.with_device(device, |d| {
            d.profiles.retain(|p| p != profile);
            d.profiles.insert(0, profile.clone());
        })
    }

    fn watch_profiles(&self) -> ColordResult<Box<dyn ProfileWatch + '_>> {
        Ok(Box::new(DirectoryWatch {
            service: self,
            seen: icc_files(&self.icc_dir),
        }))
    }
}

struct DirectoryWatch<'a> {
    service: &'a MemoryColord,
    seen: HashSet<PathBuf>,
}

impl ProfileWatch for DirectoryWatch<'_> {
    fn poll_added(&mut self) -> ColordResult<Option<ProfileId>> {
        let new = icc_files(&self.service.icc_dir)
            .into_iter()
            .find(|path| !self.seen.contains(path));
        Ok(new.map(|path| {
            self.seen.insert(path.clone());
            self.service.register(&path)
        }))
    }
}

/// `.icc` files currently in `dir`.
pub fn icc_files(dir: &Path) -> HashSet<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return HashSet::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "icc"))
        .collect()
}

/// A manager over [`MemoryColord`] with its profile directory.
pub struct Fixture {
    _root: TempDir,
    pub icc_dir: PathBuf,
    pub manager: ProfileManager<MemoryColord>,
}

impl Fixture {
    pub fn service(&self) -> &MemoryColord {
        self.manager.service()
    }
}

/// Builds a manager; `setup` adds devices and profiles before enumeration.
pub fn fixture(setup: impl FnOnce(&MemoryColord, &Path)) -> Fixture {
    let root = TempDir::new().unwrap();
    let icc_dir = root.path().join("icc");
    fs::create_dir_all(&icc_dir).unwrap();

    let service = MemoryColord {
        icc_dir: icc_dir.clone(),
        state: RefCell::new(State::default()),
    };
    setup(&service, root.path());

    let config = ManagerConfig::new(&icc_dir)
        .with_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(1));
    Fixture {
        manager: ProfileManager::new(service, config).unwrap(),
        _root: root,
        icc_dir,
    }
}
