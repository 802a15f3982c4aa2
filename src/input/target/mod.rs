//! Virtual controllers presented to the host through UHID
use std::{fmt::Debug, io, os::fd::RawFd};

use thiserror::Error;

use super::{rumble::OutputState, state::ControllerState};

pub mod dualsense;


pub use dualsense::{DualSenseDevice, DualSenseFactory};

/// Character device used to create virtual HID devices
pub const UHID_PATH: &str = "/dev/uhid";

/// Possible errors of a virtual controller
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Failed to open {UHID_PATH}: {0}")]
    Open(io::Error),
    #[error("Failed to create virtual device: {0}")]
    Create(io::Error),
    #[error("Failed to read from virtual device: {0}")]
    Read(io::Error),
    #[error("Failed to write to virtual device: {0}")]
    Write(io::Error),
    #[error("Unknown UHID event type: {0}")]
    UnknownEvent(u32),
    #[error("Virtual device was destroyed")]
    Destroyed,
}

/// Lifecycle of a virtual device. A destroyed device cannot be revived,
/// reconnecting requires a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceLifecycle {
    #[default]
    Closed,
    /// The UHID character device is open
    Opened,
    /// The kernel knows about the device
    Created,
    /// A HID driver is bound and exchanges reports
    Running,
    Destroyed,
}

impl DeviceLifecycle {
    /// Returns true if a device in this state may move to the given one
    pub fn can_transition(self, to: DeviceLifecycle) -> bool {
        use DeviceLifecycle::*;
        matches!(
            (self, to),
            (Closed, Opened)
                | (Opened, Created)
                | (Created, Running)
                | (Running, Created)
                | (Closed | Opened | Created | Running, Destroyed)
        )
    }

    /// Move to the given state. Returns false and keeps the current state
    /// if the move is not allowed.
    pub fn transition(&mut self, to: DeviceLifecycle) -> bool {
        if !self.can_transition(to) {
            log::trace!("Ignoring lifecycle change {self:?} -> {to:?}");
            return false;
        }
        log::debug!("Virtual device lifecycle {self:?} -> {to:?}");
        *self = to;
        true
    }
}

/// A virtual controller the physical state is mirrored to
pub trait VirtualController: Send + Debug {
    fn name(&self) -> &str;

    /// Descriptor that becomes readable when the host sends an event
    fn raw_fd(&self) -> RawFd;

    fn state_mut(&mut self) -> &mut ControllerState;

    /// Copy the given physical state. Returns true if anything changed.
    fn consume_state(&mut self, physical: &ControllerState) -> bool;

    /// Send the current state to the host
    fn write_report(&mut self) -> Result<(), TargetError>;

    /// Handle every pending host event. Returns the latest output state the
    /// host asked for, if any.
    fn read_events(&mut self) -> Result<Option<OutputState>, TargetError>;

    /// Remove the device from the system. Destroying twice does nothing.
    fn destroy(&mut self) -> Result<(), TargetError>;

    fn lifecycle(&self) -> DeviceLifecycle;
}

/// Creates a fresh virtual controller for every connection
pub trait VirtualFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn VirtualController>, TargetError>;
}
