use std::{fmt::Debug, os::fd::RawFd, sync::Arc};

use super::{
    profile::ControllerProfile,
    rumble::RumbleState,
    source::{InputDevice, SourceError},
    state::ControllerState,
};

/// Size of the buffer used to read from a node. Large enough for the
/// biggest raw report and for several evdev records.
const READ_BUFFER_SIZE: usize = 256;

/// A logical physical controller, made of one or more device nodes
pub trait Controller: Send + Debug {
    fn name(&self) -> &str;

    /// Paths of every node this controller is made of
    fn paths(&self) -> Vec<String>;

    /// Returns true if the given node belongs to this controller
    fn owns_path(&self, path: &str) -> bool {
        self.paths().iter().any(|p| p == path)
    }

    /// Open and grab every node. Returns one descriptor per node, in node
    /// order. Nothing stays open if any node fails to open.
    fn open(&mut self) -> Result<Vec<RawFd>, SourceError>;

    /// Release every node
    fn close(&mut self);

    /// Drain everything readable from the node at the given index into the
    /// controller state. Returns true if the state changed.
    fn poll_source(&mut self, index: usize) -> Result<bool, SourceError>;

    fn state(&self) -> &ControllerState;

    /// Forward a rumble request to every node that supports it
    fn apply_rumble(&mut self, rumble: &RumbleState) -> Result<(), SourceError>;
}

/// Controller backed by real evdev and hidraw nodes, decoded with the
/// profile of its hardware ids.
#[derive(Debug)]
pub struct PhysicalController {
    profile: Arc<dyn ControllerProfile>,
    devices: Vec<Box<dyn InputDevice>>,
    state: ControllerState,
    buffer: [u8; READ_BUFFER_SIZE],
}

impl PhysicalController {
    pub fn new(profile: Arc<dyn ControllerProfile>, devices: Vec<Box<dyn InputDevice>>) -> Self {
        let state = profile.new_state();
        Self {
            profile,
            devices,
            state,
            buffer: [0; READ_BUFFER_SIZE],
        }
    }

    pub fn profile(&self) -> &Arc<dyn ControllerProfile> {
        &self.profile
    }

    pub fn devices(&self) -> &[Box<dyn InputDevice>] {
        &self.devices
    }
}

impl Controller for PhysicalController {
    fn name(&self) -> &str {
        self.profile.name()
    }

    fn paths(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|device| device.hw_info().path.clone())
            .collect()
    }

    fn open(&mut self) -> Result<Vec<RawFd>, SourceError> {
        let mut fds = Vec::with_capacity(self.devices.len());
        let mut failure = None;
        for device in self.devices.iter_mut() {
            match device.open() {
                Ok(fd) => fds.push(fd),
                Err(e) => {
                    log::error!("Failed to open {}: {e}", device.hw_info().path);
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            self.close();
            return Err(e);
        }
        log::info!("Opened {} with {} node(s)", self.profile.name(), fds.len());
        Ok(fds)
    }

    fn close(&mut self) {
        for device in self.devices.iter_mut() {
            device.close();
        }
    }

    fn poll_source(&mut self, index: usize) -> Result<bool, SourceError> {
        let Some(device) = self.devices.get_mut(index) else {
            return Ok(false);
        };
        let mut changed = false;
        loop {
            let count = device.read(&mut self.buffer)?;
            if count == 0 {
                break;
            }
            changed |= device.apply_to_state(
                &self.buffer[..count],
                self.profile.as_ref(),
                &mut self.state,
            );
        }
        Ok(changed)
    }

    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn apply_rumble(&mut self, rumble: &RumbleState) -> Result<(), SourceError> {
        let mut result = Ok(());
        for device in self.devices.iter_mut() {
            if let Err(e) = device.apply_rumble(rumble) {
                log::debug!("Unable to rumble {}: {e}", device.hw_info().path);
                result = Err(e);
            }
        }
        result
    }
}
