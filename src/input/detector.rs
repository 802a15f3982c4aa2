use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use crate::{dmi, drivers::lego};

use super::{
    controller::{Controller, PhysicalController},
    profile::{ControllerProfile, DeviceIds, ProfileRegistry},
    source::{
        probe_evdev, probe_hidraw, DeviceType, EvdevDevice, HidrawDevice, InputDevice,
        InputDeviceHwInfo, SourceError,
    },
};

/// Finds a supported physical controller
pub trait Detector: Send + Sync {
    /// Scan for controllers once. Returns the first supported controller,
    /// unopened.
    fn detect(&self) -> Result<Option<Box<dyn Controller>>, SourceError>;
}

/// Group device nodes by their hardware ids, keeping node order stable
pub fn group_by_ids(
    infos: Vec<InputDeviceHwInfo>,
) -> BTreeMap<DeviceIds, Vec<InputDeviceHwInfo>> {
    let mut groups: BTreeMap<DeviceIds, Vec<InputDeviceHwInfo>> = BTreeMap::new();
    for info in infos {
        let ids = DeviceIds::new(info.vendor, info.product);
        groups.entry(ids).or_default().push(info);
    }
    for nodes in groups.values_mut() {
        nodes.sort_by(|a, b| (a.device_type, &a.path).cmp(&(b.device_type, &b.path)));
    }
    groups
}

/// Build the controller for one group of nodes. Hidraw nodes are dropped
/// for profiles that only read evdev.
pub fn build_controller(
    profile: Arc<dyn ControllerProfile>,
    nodes: Vec<InputDeviceHwInfo>,
) -> Option<PhysicalController> {
    let reads_hidraw = profile.hidraw_report_id().is_some();
    let devices: Vec<Box<dyn InputDevice>> = nodes
        .into_iter()
        .filter_map(|info| match info.device_type {
            DeviceType::Evdev => Some(Box::new(EvdevDevice::new(info)) as Box<dyn InputDevice>),
            DeviceType::Hidraw if reads_hidraw => {
                Some(Box::new(HidrawDevice::new(info)) as Box<dyn InputDevice>)
            }
            DeviceType::Hidraw => None,
        })
        .collect();
    if devices.is_empty() {
        return None;
    }
    Some(PhysicalController::new(profile, devices))
}

/// Scans the evdev and hidraw directories for controllers with a
/// registered profile.
#[derive(Debug, Clone)]
pub struct DeviceDetector {
    registry: ProfileRegistry,
    input_dir: String,
    hidraw_dir: String,
    dmi_product_path: String,
}

impl DeviceDetector {
    pub fn new(
        registry: ProfileRegistry,
        input_dir: &str,
        hidraw_dir: &str,
        dmi_product_path: &str,
    ) -> Self {
        Self {
            registry,
            input_dir: input_dir.to_string(),
            hidraw_dir: hidraw_dir.to_string(),
            dmi_product_path: dmi_product_path.to_string(),
        }
    }

    /// Identity of every readable node in the given directory whose name
    /// starts with the given prefix.
    fn probe_dir<F>(&self, dir: &str, prefix: &str, probe: F) -> Vec<InputDeviceHwInfo>
    where
        F: Fn(&str) -> Result<Option<InputDeviceHwInfo>, SourceError>,
    {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Unable to read {dir}: {e}");
                return Vec::new();
            }
        };

        let mut infos = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(prefix) {
                continue;
            }
            let path = Path::new(dir).join(&name).to_string_lossy().to_string();
            match probe(&path) {
                Ok(Some(info)) => {
                    log::trace!(
                        "Found {path}: {} ({:04x}:{:04x})",
                        info.name,
                        info.vendor,
                        info.product
                    );
                    infos.push(info);
                }
                Ok(None) => (),
                // Nodes we may not open are not ours to bridge
                Err(e) => log::trace!("Skipping {path}: {e}"),
            }
        }
        infos
    }

    /// Hardware ids in the order they should be tried. The built-in
    /// controller goes first on a Legion Go, everything else keeps id order.
    pub fn candidate_order(
        &self,
        groups: &BTreeMap<DeviceIds, Vec<InputDeviceHwInfo>>,
    ) -> Vec<DeviceIds> {
        let mut order: Vec<DeviceIds> = groups.keys().copied().collect();
        if dmi::is_legion_go(&self.dmi_product_path) {
            log::debug!("Running on a Legion Go, preferring its built-in controller");
            let legion_go = DeviceIds::new(lego::driver::VID, lego::driver::XINPUT_PID);
            order.sort_by_key(|ids| *ids != legion_go);
        }
        order
    }
}

impl Detector for DeviceDetector {
    fn detect(&self) -> Result<Option<Box<dyn Controller>>, SourceError> {
        let mut infos = self.probe_dir(&self.input_dir, "event", probe_evdev);
        infos.extend(self.probe_dir(&self.hidraw_dir, "hidraw", probe_hidraw));
        let mut groups = group_by_ids(infos);

        for ids in self.candidate_order(&groups) {
            let Some(profile) = self.registry.lookup(ids) else {
                log::trace!("No profile for {ids}");
                continue;
            };
            let Some(nodes) = groups.remove(&ids) else {
                continue;
            };
            log::info!(
                "Detected {} ({ids}) with {} node(s)",
                profile.name(),
                nodes.len()
            );
            if let Some(controller) = build_controller(profile, nodes) {
                return Ok(Some(Box::new(controller)));
            }
        }

        log::debug!("No supported controller found");
        Ok(None)
    }
}
