//! colord client over the system D-Bus.

use crate::service::{ColorService, DeviceId, DeviceInfo, ProfileId, ProfileInfo, ProfileWatch};
use crate::ColordResult;
use futures::{FutureExt, Stream, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use tracing::debug;
use zbus::blocking::Connection;
use zbus::proxy;
use zbus::proxy::CacheProperties;
use zbus::zvariant::{ObjectPath, OwnedObjectPath};

/// Relation used when attaching profiles: survives daemon restarts.
const RELATION_HARD: &str = "hard";

#[proxy(
    interface = "org.freedesktop.ColorManager",
    default_service = "org.freedesktop.ColorManager",
    default_path = "/org/freedesktop/ColorManager"
)]
trait ColorManager {
    fn get_devices(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    fn find_profile_by_filename(&self, filename: &str) -> zbus::Result<OwnedObjectPath>;

    #[zbus(signal)]
    fn profile_added(&self, object_path: ObjectPath<'_>) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.freedesktop.ColorManager.Device",
    default_service = "org.freedesktop.ColorManager"
)]
trait ColordDevice {
    fn add_profile(&self, relation: &str, object_path: &ObjectPath<'_>) -> zbus::Result<()>;

    fn remove_profile(&self, object_path: &ObjectPath<'_>) -> zbus::Result<()>;

    fn make_profile_default(&self, object_path: &ObjectPath<'_>) -> zbus::Result<()>;

    fn set_enabled(&self, enabled: bool) -> zbus::Result<()>;

    #[zbus(property)]
    fn kind(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn vendor(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn model(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn enabled(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn profiles(&self) -> zbus::Result<Vec<OwnedObjectPath>>;
}

#[proxy(
    interface = "org.freedesktop.ColorManager.Profile",
    default_service = "org.freedesktop.ColorManager"
)]
trait ColordProfile {
    #[zbus(property)]
    fn filename(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn title(&self) -> zbus::Result<String>;
}

fn non_empty(value: zbus::Result<String>) -> Option<String> {
    value.ok().filter(|s| !s.is_empty())
}

/// [`ColorService`] backed by the colord daemon.
///
/// Property reads bypass the proxy cache so that a device's profile list
/// reflects changes made earlier in the same run.
///
/// # Example
///
/// ```rust,no_run
/// use ggt_colord::{ColorService, ColordClient};
///
/// let client = ColordClient::connect().unwrap();
/// for device in client.devices().unwrap() {
///     println!("{} ({})", device.id, device.kind);
/// }
/// ```
pub struct ColordClient {
    conn: Connection,
    manager: ColorManagerProxyBlocking<'static>,
}

impl ColordClient {
    /// Connects to colord on the system bus.
    pub fn connect() -> ColordResult<Self> {
        let conn = Connection::system()?;
        let manager = ColorManagerProxyBlocking::new(&conn)?;
        Ok(Self { conn, manager })
    }

    fn device<'p>(&self, id: &'p DeviceId) -> ColordResult<ColordDeviceProxyBlocking<'p>> {
        Ok(ColordDeviceProxyBlocking::builder(&self.conn)
            .path(id.as_str())?
            .cache_properties(CacheProperties::No)
            .build()?)
    }

    fn profile<'p>(&self, id: &'p ProfileId) -> ColordResult<ColordProfileProxyBlocking<'p>> {
        Ok(ColordProfileProxyBlocking::builder(&self.conn)
            .path(id.as_str())?
            .cache_properties(CacheProperties::No)
            .build()?)
    }
}

impl ColorService for ColordClient {
    fn devices(&self) -> ColordResult<Vec<DeviceInfo>> {
        let paths = self.manager.get_devices()?;
        debug!(count = paths.len(), "colord devices");

        paths
            .into_iter()
            .map(|path| -> ColordResult<DeviceInfo> {
                let id = DeviceId::new(path.as_str());
                let (kind, vendor, model) = {
                    let proxy = self.device(&id)?;
                    (proxy.kind()?, non_empty(proxy.vendor()), non_empty(proxy.model()))
                };
                Ok(DeviceInfo { id, kind, vendor, model })
            })
            .collect()
    }

    fn device_enabled(&self, device: &DeviceId) -> ColordResult<bool> {
        Ok(self.device(device)?.enabled()?)
    }

    fn set_device_enabled(&self, device: &DeviceId, enabled: bool) -> ColordResult<()> {
        debug!(%device, enabled, "SetEnabled");
        Ok(self.device(device)?.set_enabled(enabled)?)
    }

    fn device_profiles(&self, device: &DeviceId) -> ColordResult<Vec<ProfileId>> {
        let paths = self.device(device)?.profiles()?;
        Ok(paths.iter().map(|p| ProfileId::new(p.as_str())).collect())
    }

    fn profile_info(&self, profile: &ProfileId) -> ColordResult<ProfileInfo> {
        let proxy = self.profile(profile)?;
        let filename = non_empty(proxy.filename()).map(PathBuf::from);
        let title = non_empty(proxy.title());
        Ok(ProfileInfo {
            id: profile.clone(),
            filename,
            title,
        })
    }

    fn find_profile_by_filename(&self, filename: &str) -> ColordResult<Option<ProfileId>> {
        match self.manager.find_profile_by_filename(filename) {
            Ok(path) => Ok(Some(ProfileId::new(path.as_str()))),
            Err(zbus::Error::MethodError(name, _, _)) if name.as_str().ends_with(".NotFound") => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn add_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        debug!(%device, %profile, "AddProfile");
        let path = ObjectPath::try_from(profile.as_str())?;
        Ok(self.device(device)?.add_profile(RELATION_HARD, &path)?)
    }

    fn remove_profile(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        debug!(%device, %profile, "RemoveProfile");
        let path = ObjectPath::try_from(profile.as_str())?;
        Ok(self.device(device)?.remove_profile(&path)?)
    }

    fn make_profile_default(&self, device: &DeviceId, profile: &ProfileId) -> ColordResult<()> {
        debug!(%device, %profile, "MakeProfileDefault");
        let path = ObjectPath::try_from(profile.as_str())?;
        Ok(self.device(device)?.make_profile_default(&path)?)
    }

    fn watch_profiles(&self) -> ColordResult<Box<dyn ProfileWatch + '_>> {
        let proxy = futures::executor::block_on(ColorManagerProxy::new(self.conn.inner()))?;
        let signals = futures::executor::block_on(proxy.receive_profile_added())?;

        let added = signals.filter_map(|signal| {
            let id = signal
                .args()
                .ok()
                .map(|args| ProfileId::new(args.object_path().as_str()));
            futures::future::ready(id)
        });

        Ok(Box::new(SignalWatch {
            stream: Box::pin(added),
        }))
    }
}

/// Drains `ProfileAdded` signals without blocking.
struct SignalWatch {
    stream: Pin<Box<dyn Stream<Item = ProfileId>>>,
}

impl ProfileWatch for SignalWatch {
    fn poll_added(&mut self) -> ColordResult<Option<ProfileId>> {
        // Pending and finished streams both mean "nothing new".
        Ok(self.stream.next().now_or_never().flatten())
    }
}
