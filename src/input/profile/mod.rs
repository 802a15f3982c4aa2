//! Controller profiles describe where each canonical button and axis lives
//! on one controller model. The codec interprets the tables, profiles only
//! override decoding or encoding for the parts a table can not express.
use std::{fmt::Debug, sync::Arc};

use super::{
    codec,
    state::{AxisMapping, ButtonMapping, ControllerState},
};

pub mod dualsense;
pub mod legion_go;
pub mod xbox;

#[cfg(test)]
pub mod profile_test;

pub use dualsense::DualSenseProfile;
pub use legion_go::LegionGoProfile;
pub use xbox::XboxProfile;

/// USB vendor and product id pair identifying a controller model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceIds {
    pub vendor: u16,
    pub product: u16,
}

impl DeviceIds {
    pub const fn new(vendor: u16, product: u16) -> Self {
        Self { vendor, product }
    }
}

impl std::fmt::Display for DeviceIds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.product)
    }
}

/// Layout and wire behavior of one controller model
pub trait ControllerProfile: Send + Sync + Debug {
    /// Human readable name of the controller model
    fn name(&self) -> &str;

    /// Hardware ids this profile applies to
    fn ids(&self) -> &[DeviceIds];

    fn button_mappings(&self) -> &'static [ButtonMapping];

    fn axis_mappings(&self) -> &'static [AxisMapping];

    /// Report id of the raw HID reports this profile can decode. Profiles
    /// without one are driven by evdev only and their hidraw nodes are
    /// never opened.
    fn hidraw_report_id(&self) -> Option<u8> {
        None
    }

    /// Create a fresh state with one entry per mapping
    fn new_state(&self) -> ControllerState {
        ControllerState::new(self.button_mappings(), self.axis_mappings())
    }

    /// Decode a raw HID report into the given state. Returns true if the
    /// state changed.
    fn decode(&self, buffer: &[u8], state: &mut ControllerState) -> bool {
        if let Some(report_id) = self.hidraw_report_id() {
            if buffer.first() != Some(&report_id) {
                log::trace!(
                    "Ignoring report {:?} on {}, expected {report_id}",
                    buffer.first(),
                    self.name()
                );
                return false;
            }
        }
        codec::decode(buffer, state)
    }

    /// Render the given state into a raw HID report
    fn encode(&self, state: &ControllerState, buffer: &mut [u8]) {
        codec::encode_buttons(state, buffer);
        codec::encode_axes(state, buffer);
    }
}

/// Lookup table from hardware ids to controller profiles
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<Arc<dyn ControllerProfile>>,
}

impl Default for ProfileRegistry {
    /// Registry with every profile this crate ships
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(LegionGoProfile));
        registry.register(Arc::new(XboxProfile));
        registry.register(Arc::new(DualSenseProfile::physical()));
        registry
    }
}

impl ProfileRegistry {
    /// Registry without any profile
    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    /// Add the given profile. Profiles registered later do not override
    /// earlier ones with the same ids.
    pub fn register(&mut self, profile: Arc<dyn ControllerProfile>) {
        log::trace!("Registering profile {}", profile.name());
        self.profiles.push(profile);
    }

    /// Returns the profile for the given hardware ids
    pub fn lookup(&self, ids: DeviceIds) -> Option<Arc<dyn ControllerProfile>> {
        self.profiles
            .iter()
            .find(|profile| profile.ids().contains(&ids))
            .cloned()
    }
}
