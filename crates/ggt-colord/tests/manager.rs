//! Orchestration tests against an in-memory color service.
//!
//! The fake emulates colord's directory watch: a watch remembers the `.icc`
//! files present when it was created and announces every new one as a
//! freshly registered profile.

use ggt_color::{Calibration, Channels, GammaTable};
use ggt_colord::{
    ApplyOutcome, ColorService, ColordError, ColordResult, DeviceId, DeviceInfo, ManagerConfig,
    ProfileId, ProfileInfo, ProfileManager, ProfileWatch, RemoveOutcome, KIND_DISPLAY,
};
use ggt_icc::Profile;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

struct FakeDevice {
    info: DeviceInfo,
    enabled: bool,
    profiles: Vec<ProfileId>,
}

#[derive(Default)]
struct State {
    devices: Vec<FakeDevice>,
    profiles: Vec<ProfileInfo>,
    next_id: usize,
    silent: bool,
    refuse_remove: bool,
}

/// In-memory stand-in for colord.
struct FakeColord {
    icc_dir: PathBuf,
    state: RefCell<State>,
}

impl FakeColord {
    fn new(icc_dir: &Path) -> Self {
        Self {
            icc_dir: icc_dir.to_path_buf(),
            state: RefCell::new(State::default()),
        }
    }

    fn add_device(&self, kind: &str, model: &str, enabled: bool) -> DeviceId {
        let mut state = self.state.borrow_mut();
        let id = DeviceId::new(format!(
            "/org/freedesktop/ColorManager/devices/dev{}",
            state.devices.len()
        ));
        state.devices.push(FakeDevice {
            info: DeviceInfo {
                id: id.clone(),
                kind: kind.to_string(),
                vendor: Some("ACME".to_string()),
                model: Some(model.to_string()),
            },
            enabled,
            profiles: Vec::new(),
        });
        id
    }

    /// Registers an existing file as a profile.
    fn register(&self, path: &Path) -> ProfileId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = ProfileId::new(format!(
            "/org/freedesktop/ColorManager/profiles/icc_{}",
            state.next_id
        ));
        let title = Profile::from_file(path).ok().map(|p| p.description());
        state.profiles.push(ProfileInfo {
            id: id.clone(),
            filename: Some(path.to_path_buf()),
            title,
        });
        id
    }

    /// Registers a file and makes it the device default.
    fn install(&self, device: &DeviceId, path: &Path) -> ProfileId {
        let id = self.register(path);
        self.with_device(device, |d| d.profiles.insert(0, id.clone()))
            .unwrap();
        id
    }

    fn default_profile(&self, device: &DeviceId) -> Option<ProfileId> {
        self.device_profiles(device).unwrap().first().cloned()
    }

    fn with_device<T>(
        &self,
        id: &DeviceId,
        f: impl FnOnce(&mut FakeDevice) -> T,
    ) -> ColordResult<T> {
        let mut state = self.state.borrow_mut();
        let device = state
            .devices
            .iter_mut()
            .find(|d| &d.info.id == id)
            .ok_or_else(|| ColordError::Service(format!("no such device {id}")))?;
        Ok(f(device))
    }
}

impl ColorService for FakeColord {
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

    fn find_profile_by_filename(&self, filename: &str) -> ColordResult<Option<ProfileId>> {
        Ok(self
            .state
            .borrow()
            .profiles
            .iter()
            .find(|p| {
                p.filename
                    .as_deref()
                    .and_then(Path::file_name)
                    .is_some_and(|name| name == filename)
            })
            .map(|p| p.id.clone()))
    }

    fn add_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        self.with_device(device, |d| {
            if !d.profiles.contains(profile) {
                d.profiles.push(profile.clone());
            }
        })
    }

    fn remove_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        if self.state.borrow().refuse_remove {
            return Err(ColordError::Service("profile is in use".to_string()));
        }
        self.with_device(device, |d| {
            let before = d.profiles.len();
            d.profiles.retain(|p| p != profile);
            d.profiles.len() < before
        })?
        .then_some(())
        .ok_or_else(|| ColordError::Service(format!("{profile} not attached")))
    }

    fn make_profile_default(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        self.with_device(device, |d| {
            d.profiles.retain(|p| p != profile);
            d.profiles.insert(0, profile.clone());
        })
    }

    fn watch_profiles(&self) -> ColordResult<Box<dyn ProfileWatch + '_>> {
        Ok(Box::new(FakeWatch {
            service: self,
            seen: icc_files(&self.icc_dir),
        }))
    }
}

struct FakeWatch<'a> {
    service: &'a FakeColord,
    seen: HashSet<PathBuf>,
}

impl ProfileWatch for FakeWatch<'_> {
    fn poll_added(&mut self) -> ColordResult<Option<ProfileId>> {
        if self.service.state.borrow().silent {
            return Ok(None);
        }
        let new = icc_files(&self.service.icc_dir)
            .into_iter()
            .find(|path| !self.seen.contains(path));
        Ok(new.map(|path| {
            self.seen.insert(path.clone());
            self.service.register(&path)
        }))
    }
}

fn icc_files(dir: &Path) -> HashSet<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return HashSet::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "icc"))
        .collect()
}

struct Fixture {
    _root: TempDir,
    icc_dir: PathBuf,
    system_dir: PathBuf,
    manager: ProfileManager<FakeColord>,
}

impl Fixture {
    fn service(&self) -> &FakeColord {
        self.manager.service()
    }
}

/// Builds a manager over the fake; `setup` populates the service first.
fn fixture(setup: impl FnOnce(&FakeColord, &Path, &Path)) -> Fixture {
    let root = TempDir::new().unwrap();
    let icc_dir = root.path().join("icc");
    let system_dir = root.path().join("system");
    fs::create_dir_all(&icc_dir).unwrap();
    fs::create_dir_all(&system_dir).unwrap();

    let service = FakeColord::new(&icc_dir);
    setup(&service, &icc_dir, &system_dir);

    let config = ManagerConfig::new(&icc_dir)
        .with_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(1));
    let manager = ProfileManager::new(service, config).unwrap();

    Fixture {
        _root: root,
        icc_dir,
        system_dir,
        manager,
    }
}

fn write_profile(path: &Path, description: &str) {
    let mut profile = Profile::srgb();
    profile.set_description(description).unwrap();
    profile.save(path).unwrap();
}

fn calibration(gamma: f64, temperature: u32) -> Calibration {
    Calibration::new(
        Channels::uniform(gamma),
        temperature,
        Channels::uniform(1.0),
        Channels::uniform(0.0),
        Channels::uniform(1.0),
    )
    .unwrap()
}

fn temp_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with("-ggtmp"))
        .count()
}

#[test]
fn test_only_displays_are_kept() {
    let fx = fixture(|s, _, _| {
        s.add_device("printer", "LaserJet", true);
        s.add_device(KIND_DISPLAY, "U2720Q", true);
        s.add_device("camera", "Webcam", true);
    });
    assert_eq!(fx.manager.devices().len(), 1);
    assert_eq!(fx.manager.device(0).unwrap().display_name(0), "U2720Q");
}

#[test]
fn test_no_such_display() {
    let fx = fixture(|s, _, _| {
        s.add_device("printer", "LaserJet", true);
    });
    let err = fx.manager.device(0).unwrap_err();
    assert!(matches!(err, ColordError::NoSuchDisplay { index: 0, count: 0 }));
    assert_eq!(err.to_string(), "No such display, found 0 displays.");

    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", true);
        s.add_device(KIND_DISPLAY, "B", true);
    });
    assert!(fx.manager.device(1).is_ok());
    assert_eq!(
        fx.manager.device(2).unwrap_err().to_string(),
        "No such display, found 2 displays."
    );
}

#[test]
fn test_apply_replaces_own_profile() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "U2720Q", true);
        let old = icc.join("gnome-gamma-tool-old.icc");
        write_profile(&old, "gamma-tool: g=1.8");
        s.install(&dev, &old);
    });
    let device = fx.manager.device(0).unwrap().clone();
    let old_path = fx.icc_dir.join("gnome-gamma-tool-old.icc");
    let cal = calibration(2.2, 5000);

    let outcome = fx.manager.apply(&device, &cal, |_| true).unwrap();
    let ApplyOutcome::Applied { profile, replaced } = outcome else {
        panic!("expected the profile to be applied");
    };

    // New profile is the default and the only profile left on the device.
    assert_eq!(fx.service().default_profile(&device.id), Some(profile.id.clone()));
    assert_eq!(fx.service().device_profiles(&device.id).unwrap(), vec![profile.id.clone()]);

    // Old tool profile is gone, file included.
    let replaced = replaced.unwrap();
    assert_eq!(replaced.filename.as_deref(), Some(old_path.as_path()));
    assert!(!old_path.exists());

    // New file carries the calibration.
    let path = profile.filename.clone().unwrap();
    assert!(path.starts_with(&fx.icc_dir));
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("gnome-gamma-tool-"));
    assert_eq!(profile.title.as_deref(), Some("gamma-tool: g=2.2 t=5000"));

    let written = Profile::from_file(&path).unwrap();
    assert_eq!(written.model(), "gamma-tool: g=2.2 t=5000");
    assert!(written.unique_id().is_some());
    let vcgt = written.vcgt().unwrap();
    assert!(vcgt.max_difference(&GammaTable::generate(&cal)) < 1e-4);

    assert_eq!(temp_files(&fx.icc_dir), 0);
}

#[test]
fn test_apply_keeps_foreign_profile() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "U2720Q", true);
        let edid = icc.join("edid-0123456789.icc");
        write_profile(&edid, "U2720Q EDID");
        s.install(&dev, &edid);
    });
    let device = fx.manager.device(0).unwrap().clone();
    let edid = fx.icc_dir.join("edid-0123456789.icc");

    let outcome = fx.manager.apply(&device, &calibration(2.2, 6500), |_| true).unwrap();
    let ApplyOutcome::Applied { profile, replaced } = outcome else {
        panic!("expected the profile to be applied");
    };
    assert!(replaced.is_none());
    assert!(edid.exists());

    let profiles = fx.service().device_profiles(&device.id).unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0], profile.id);
}

#[test]
fn test_declined_confirmation_reverts() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "U2720Q", true);
        let edid = icc.join("edid-0123456789.icc");
        write_profile(&edid, "U2720Q EDID");
        s.install(&dev, &edid);
    });
    let device = fx.manager.device(0).unwrap().clone();
    let previous = fx.service().default_profile(&device.id).unwrap();

    let mut offered = None;
    let outcome = fx
        .manager
        .apply(&device, &calibration(0.8, 3400), |new| {
            // The candidate is already the default while the user decides.
            offered = Some(new.clone());
            false
        })
        .unwrap();

    let ApplyOutcome::Reverted { restored, clean } = outcome else {
        panic!("expected a revert");
    };
    assert!(clean);
    assert_eq!(restored.map(|p| p.id), Some(previous.clone()));
    assert_eq!(fx.service().device_profiles(&device.id).unwrap(), vec![previous]);

    let offered = offered.unwrap();
    assert!(!offered.filename.unwrap().exists());
}

#[test]
fn test_remove_without_own_profile() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "A", true);
        s.add_device(KIND_DISPLAY, "B", true);
        let edid = icc.join("edid-0123456789.icc");
        write_profile(&edid, "EDID");
        s.install(&dev, &edid);
    });

    let first = fx.manager.device(0).unwrap();
    let outcome = fx.manager.remove_own(first).unwrap();
    assert!(matches!(outcome, RemoveOutcome::NotOwn(_)));
    assert!(fx.icc_dir.join("edid-0123456789.icc").exists());
    assert_eq!(fx.service().device_profiles(&first.id).unwrap().len(), 1);

    let second = fx.manager.device(1).unwrap();
    assert_eq!(fx.manager.remove_own(second).unwrap(), RemoveOutcome::NoProfile);
}

#[test]
fn test_remove_own_profile() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "A", true);
        let edid = icc.join("edid-0123456789.icc");
        write_profile(&edid, "EDID");
        s.install(&dev, &edid);
    });
    let device = fx.manager.device(0).unwrap().clone();
    let ApplyOutcome::Applied { profile, .. } = fx
        .manager
        .apply(&device, &calibration(2.2, 6500), |_| true)
        .unwrap()
    else {
        panic!("expected the profile to be applied");
    };
    let path = profile.filename.clone().unwrap();
    assert!(path.exists());

    let outcome = fx.manager.remove_own(&device).unwrap();
    assert_eq!(outcome, RemoveOutcome::Removed(profile));
    assert!(!path.exists());
    assert_eq!(fx.service().device_profiles(&device.id).unwrap().len(), 1);
}

#[test]
fn test_refused_removal_keeps_file() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "A", true);
        let own = icc.join("gnome-gamma-tool-abc.icc");
        write_profile(&own, "gamma-tool: neutral");
        s.install(&dev, &own);
    });
    fx.service().state.borrow_mut().refuse_remove = true;
    let device = fx.manager.device(0).unwrap();

    let outcome = fx.manager.remove_own(device).unwrap();
    assert!(matches!(outcome, RemoveOutcome::Refused(_)));
    assert!(fx.icc_dir.join("gnome-gamma-tool-abc.icc").exists());
}

#[test]
fn test_missing_file_is_tolerated() {
    let fx = fixture(|s, icc, _| {
        let dev = s.add_device(KIND_DISPLAY, "A", true);
        let own = icc.join("gnome-gamma-tool-abc.icc");
        write_profile(&own, "gamma-tool: neutral");
        s.install(&dev, &own);
    });
    fs::remove_file(fx.icc_dir.join("gnome-gamma-tool-abc.icc")).unwrap();
    let device = fx.manager.device(0).unwrap();

    let outcome = fx.manager.remove_own(device).unwrap();
    assert!(matches!(outcome, RemoveOutcome::Removed(_)));
    assert!(fx.service().device_profiles(&device.id).unwrap().is_empty());
}

#[test]
fn test_registration_timeout() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", true);
    });
    fx.service().state.borrow_mut().silent = true;
    let device = fx.manager.device(0).unwrap();

    let err = fx
        .manager
        .register_profile(device, &Profile::srgb(), "gnome-gamma-tool-late.icc")
        .unwrap_err();
    match err {
        ColordError::NotAddedInTime { path, timeout } => {
            assert_eq!(path, fx.icc_dir.join("gnome-gamma-tool-late.icc"));
            assert_eq!(timeout, Duration::from_millis(500));
            assert!(!path.exists());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(temp_files(&fx.icc_dir), 0);
    assert!(fx.service().device_profiles(&device.id).unwrap().is_empty());
}

#[test]
fn test_register_attaches_profile() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", true);
    });
    let device = fx.manager.device(0).unwrap();

    let info = fx
        .manager
        .register_profile(device, &Profile::srgb(), "gnome-gamma-tool-now.icc")
        .unwrap();
    assert_eq!(info.filename, Some(fx.icc_dir.join("gnome-gamma-tool-now.icc")));
    assert_eq!(fx.service().device_profiles(&device.id).unwrap(), vec![info.id]);
}

#[test]
fn test_disabled_device_is_enabled() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", false);
    });
    let device = fx.manager.device(0).unwrap();
    assert!(fx.manager.ensure_enabled(device).unwrap());
    assert!(fx.service().device_enabled(&device.id).unwrap());
    assert!(!fx.manager.ensure_enabled(device).unwrap());
}

#[test]
fn test_apply_enables_device() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", false);
    });
    let device = fx.manager.device(0).unwrap();
    fx.manager.apply(device, &Calibration::default(), |_| true).unwrap();
    assert!(fx.service().device_enabled(&device.id).unwrap());
}

#[test]
fn test_srgb_fallback() {
    let fx = fixture(|s, _, system| {
        s.add_device(KIND_DISPLAY, "A", true);
        let srgb = system.join("sRGB.icc");
        write_profile(&srgb, "sRGB IEC61966-2.1");
        s.register(&srgb);
    });
    let device = fx.manager.device(0).unwrap();
    let srgb = fx.service().find_profile_by_filename("sRGB.icc").unwrap().unwrap();

    let outcome = fx.manager.apply(device, &calibration(2.2, 6500), |_| false).unwrap();
    let ApplyOutcome::Reverted { restored, clean } = outcome else {
        panic!("expected a revert");
    };
    assert!(clean);
    assert_eq!(restored.map(|p| p.id), Some(srgb.clone()));
    assert_eq!(fx.service().device_profiles(&device.id).unwrap(), vec![srgb]);
    assert!(fx.system_dir.join("sRGB.icc").exists());
}

#[test]
fn test_builtin_srgb_fallback() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", true);
    });
    let device = fx.manager.device(0).unwrap();

    let outcome = fx.manager.apply(device, &calibration(1.8, 6500), |_| true).unwrap();
    let ApplyOutcome::Applied { profile, replaced } = outcome else {
        panic!("expected the profile to be applied");
    };
    assert!(replaced.is_none());
    let written = Profile::from_file(profile.filename.as_deref().unwrap()).unwrap();
    assert!(written.is_rgb());

    // Declining with nothing to restore leaves the device without a profile.
    let outcome = fx.manager.apply(device, &calibration(1.8, 6500), |_| false).unwrap();
    assert!(matches!(outcome, ApplyOutcome::Reverted { restored: Some(_), clean: true }));
    assert_eq!(fx.service().default_profile(&device.id), Some(profile.id));
}

#[test]
fn test_apply_all_displays() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", true);
        s.add_device("printer", "P", true);
        s.add_device(KIND_DISPLAY, "B", true);
    });

    let mut asked = Vec::new();
    let outcomes = fx
        .manager
        .apply_all(&calibration(2.2, 5000), |device, _| {
            asked.push(device.id.clone());
            true
        })
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(asked.len(), 2);
    for (device, outcome) in fx.manager.devices().iter().zip(&outcomes) {
        let ApplyOutcome::Applied { profile, .. } = outcome else {
            panic!("expected the profile to be applied");
        };
        assert_eq!(fx.service().default_profile(&device.id).as_ref(), Some(&profile.id));
    }
}

#[test]
fn test_reapply_keeps_single_own_profile() {
    let fx = fixture(|s, _, _| {
        s.add_device(KIND_DISPLAY, "A", true);
    });
    let device = fx.manager.device(0).unwrap();

    for gamma in [1.2, 1.6, 2.2] {
        fx.manager.apply(device, &calibration(gamma, 6500), |_| true).unwrap();
    }

    let own: Vec<_> = fs::read_dir(&fx.icc_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("gnome-gamma-tool-"))
        .collect();
    assert_eq!(own.len(), 1);
    assert_eq!(fx.service().device_profiles(&device.id).unwrap().len(), 1);
}
