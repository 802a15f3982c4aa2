//! Physical input nodes. Each [InputDevice] wraps one kernel character
//! device and translates what it reads into canonical controller state.
use std::{fmt::Debug, io, os::fd::RawFd};

use thiserror::Error;

use super::{profile::ControllerProfile, rumble::RumbleState, state::ControllerState};

pub mod evdev;
pub mod hidraw;


pub use self::evdev::{probe_evdev, EvdevDevice};
pub use self::hidraw::{probe_hidraw, HidrawDevice};

/// Possible errors of a physical input node
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("ioctl failed on {path}: {source}")]
    Ioctl {
        path: String,
        source: nix::errno::Errno,
    },
    #[error("Failed to read: {0}")]
    Read(#[from] io::Error),
    #[error("Failed to apply force feedback: {0}")]
    ForceFeedback(io::Error),
    #[error("Device is not open")]
    NotOpen,
}

/// Kernel interface a node is accessed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceType {
    Evdev,
    Hidraw,
}

/// Identity of one device node, gathered during detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceHwInfo {
    pub name: String,
    pub path: String,
    pub vendor: u16,
    pub product: u16,
    pub device_type: DeviceType,
}

/// One physical input node
pub trait InputDevice: Send + Debug {
    fn hw_info(&self) -> &InputDeviceHwInfo;

    /// Open the node for exclusive, non-blocking reads. Returns the
    /// descriptor to wait on.
    fn open(&mut self) -> Result<RawFd, SourceError>;

    /// Release the node. Closing a closed node does nothing.
    fn close(&mut self);

    /// Descriptor of the open node
    fn raw_fd(&self) -> Option<RawFd>;

    /// Read what is currently available into the given buffer. Returns 0
    /// once the node has nothing more to read.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, SourceError>;

    /// Apply the bytes returned by [InputDevice::read] to the given state.
    /// Returns true if the state changed.
    fn apply_to_state(
        &self,
        buffer: &[u8],
        profile: &dyn ControllerProfile,
        state: &mut ControllerState,
    ) -> bool;

    /// Play the given rumble on the node, if it supports force feedback
    fn apply_rumble(&mut self, _rumble: &RumbleState) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Map a would-block read to "nothing to read"
pub(crate) fn read_available(result: io::Result<usize>) -> Result<usize, SourceError> {
    match result {
        Ok(count) => Ok(count),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(SourceError::Read(e)),
    }
}
