//! Virtual DualSense Edge connected over USB
use std::{
    fmt::Debug,
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    os::{
        fd::{AsRawFd, RawFd},
        unix::fs::OpenOptionsExt,
    },
};

use packed_struct::PackedStruct;
use tokio::sync::watch;
use uhid_virt::{Bus, CreateParams, OutputEvent, StreamError, UHIDDevice};

use crate::{
    drivers::dualsense::{
        driver::*, feature_report, hid_report::UsbPackedOutputReport,
        report_descriptor::DS_EDGE_USB_DESCRIPTOR,
    },
    input::{
        profile::{ControllerProfile, DualSenseProfile},
        rumble::{OutputState, RumbleState},
        state::ControllerState,
    },
};

use super::{DeviceLifecycle, TargetError, VirtualController, VirtualFactory, UHID_PATH};

/// Error code sent back for feature reports we have no answer for
const EIO: u16 = nix::libc::EIO as u16;

/// Emulated DualSense Edge. Owns one input report that is re-rendered from
/// the canonical state before every write.
pub struct DualSenseDevice<T: Read + Write + AsRawFd + Send = File> {
    device: UHIDDevice<T>,
    raw_fd: RawFd,
    profile: DualSenseProfile,
    state: ControllerState,
    report: [u8; INPUT_REPORT_USB_SIZE],
    sequence: u8,
    lifecycle: DeviceLifecycle,
    output_tx: watch::Sender<OutputState>,
}

impl DualSenseDevice<File> {
    /// Create the virtual device through the system UHID node
    pub fn create() -> Result<Self, TargetError> {
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(nix::libc::O_CLOEXEC | nix::libc::O_NONBLOCK)
            .open(UHID_PATH)
            .map_err(TargetError::Open)?;
        log::debug!("Opened {UHID_PATH}");
        Self::create_with(handle)
    }
}

impl<T: Read + Write + AsRawFd + Send> DualSenseDevice<T> {
    /// Create the virtual device on an already open UHID handle. The
    /// handle should be non-blocking.
    pub fn create_with(handle: T) -> Result<Self, TargetError> {
        let raw_fd = handle.as_raw_fd();
        let mut lifecycle = DeviceLifecycle::default();
        lifecycle.transition(DeviceLifecycle::Opened);
        log::debug!("Creating virtual {DS5_EDGE_NAME}");
        let device = UHIDDevice::create_with(handle, Self::create_params())
            .map_err(TargetError::Create)?;
        lifecycle.transition(DeviceLifecycle::Created);
        let profile = DualSenseProfile::edge();
        let state = profile.new_state();
        let (output_tx, _) = watch::channel(OutputState::default());

        Ok(Self {
            device,
            raw_fd,
            profile,
            state,
            report: Self::initial_report(),
            sequence: 0,
            lifecycle,
            output_tx,
        })
    }

    fn create_params() -> CreateParams {
        CreateParams {
            name: String::from(DS5_EDGE_NAME),
            phys: String::from(""),
            uniq: uniq(),
            bus: Bus::USB,
            vendor: DS5_EDGE_VID as u32,
            product: DS5_EDGE_PID as u32,
            version: DS5_EDGE_VERSION,
            country: 0,
            rd_data: DS_EDGE_USB_DESCRIPTOR.to_vec(),
        }
    }

    /// Input report with the bytes this bridge never changes: idle
    /// touchpad, full battery, USB power.
    fn initial_report() -> [u8; INPUT_REPORT_USB_SIZE] {
        let mut report = [0u8; INPUT_REPORT_USB_SIZE];
        report[0] = INPUT_REPORT_USB;
        for offset in TOUCH_CONTEXT_OFFSETS {
            report[offset] = TOUCH_INACTIVE;
        }
        report[BATTERY_OFFSET] = BATTERY_FULL;
        report[POWER_OFFSET] = USB_POWERED;
        report
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Receive the rumble and emulation flag the host asks for
    pub fn subscribe(&self) -> watch::Receiver<OutputState> {
        self.output_tx.subscribe()
    }

    /// The last rendered input report
    pub fn report(&self) -> &[u8; INPUT_REPORT_USB_SIZE] {
        &self.report
    }

    /// Render the whole input report from the current state
    pub fn render_report(&mut self) -> &[u8; INPUT_REPORT_USB_SIZE] {
        self.sequence = self.sequence.wrapping_add(1);
        self.profile.encode(&self.state, &mut self.report);
        self.report[SEQUENCE_NUMBER_OFFSET] = self.sequence;
        &self.report
    }

    /// Read one event from the host. Returns None once nothing is left.
    pub fn poll_event(&mut self) -> Result<Option<OutputEvent>, TargetError> {
        match self.device.read() {
            Ok(event) => Ok(Some(event)),
            Err(StreamError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(StreamError::Io(e)) => Err(TargetError::Read(e)),
            Err(StreamError::UnknownEventType(kind)) => Err(TargetError::UnknownEvent(kind)),
        }
    }

    /// Handle one event from the host. Returns the new output state if the
    /// event was an accepted output report.
    pub fn handle_event(&mut self, event: OutputEvent) -> Result<Option<OutputState>, TargetError> {
        match event {
            OutputEvent::Start { dev_flags: _ } => {
                log::debug!("Start event received");
                self.lifecycle.transition(DeviceLifecycle::Running);
                self.write_report()?;
            }
            OutputEvent::Stop => {
                log::debug!("Stop event received");
                if self.lifecycle == DeviceLifecycle::Running {
                    self.lifecycle.transition(DeviceLifecycle::Created);
                }
            }
            OutputEvent::Open => {
                log::debug!("Open event received");
            }
            OutputEvent::Close => {
                log::debug!("Close event received");
            }
            OutputEvent::Output { data } => {
                log::trace!("Got output data: {:?}", data);
                let Some(output) = self.handle_output(&data) else {
                    return Ok(None);
                };
                self.output_tx.send_replace(output);
                return Ok(Some(output));
            }
            OutputEvent::GetReport {
                id,
                report_number,
                report_type,
            } => {
                log::debug!(
                    "Received GetReport event: id: {id}, num: {report_number}, type: {:?}",
                    report_type
                );
                let result = match self.feature_report(report_number) {
                    Some(data) => self.device.write_get_report_reply(id, 0, data.to_vec()),
                    None => {
                        log::debug!("No reply for feature report {report_number:#04x}");
                        self.device.write_get_report_reply(id, EIO, Vec::new())
                    }
                };
                result.map_err(TargetError::Write)?;
            }
            OutputEvent::SetReport {
                id,
                report_number,
                report_type,
                data,
            } => {
                log::debug!(
                    "Received SetReport event: id: {id}, num: {report_number}, type: {:?}, data: {:?}",
                    report_type,
                    data
                );
                self.device
                    .write_set_report_reply(id, 0)
                    .map_err(TargetError::Write)?;
            }
        };
        Ok(None)
    }

    /// Decode a host output report. Reports with another id or an
    /// unexpected length are dropped.
    pub fn handle_output(&self, data: &[u8]) -> Option<OutputState> {
        if data.first() != Some(&OUTPUT_REPORT_USB) {
            log::debug!("Dropping output report with id {:?}", data.first());
            return None;
        }
        if data.len() != OUTPUT_REPORT_USB_SIZE && data.len() != OUTPUT_REPORT_USB_SHORT_SIZE {
            log::debug!("Dropping output report of {} bytes", data.len());
            return None;
        }
        let mut buffer = [0u8; OUTPUT_REPORT_USB_SHORT_SIZE];
        buffer.copy_from_slice(&data[..OUTPUT_REPORT_USB_SHORT_SIZE]);
        let report = match UsbPackedOutputReport::unpack(&buffer) {
            Ok(report) => report,
            Err(e) => {
                log::debug!("Failed to unpack output report: {:?}", e);
                return None;
            }
        };

        let rumble = RumbleState::new(
            report.rumble_emulation_left as f64 / 255.0,
            report.rumble_emulation_right as f64 / 255.0,
        );
        log::trace!("Host requested rumble: {rumble:?}");
        Some(OutputState {
            rumble,
            rumble_emulation: report.enable_rumble_emulation,
        })
    }

    /// Canned reply for the given feature report number
    pub fn feature_report(&self, report_number: u8) -> Option<&'static [u8]> {
        feature_report::feature_report(report_number)
    }
}

impl<T: Read + Write + AsRawFd + Send> VirtualController for DualSenseDevice<T> {
    fn name(&self) -> &str {
        DS5_EDGE_NAME
    }

    fn raw_fd(&self) -> RawFd {
        self.raw_fd
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn consume_state(&mut self, physical: &ControllerState) -> bool {
        self.state.copy_from(physical)
    }

    fn write_report(&mut self) -> Result<(), TargetError> {
        match self.lifecycle {
            DeviceLifecycle::Destroyed => return Err(TargetError::Destroyed),
            // The kernel rejects input before a driver is bound
            DeviceLifecycle::Running => (),
            _ => return Ok(()),
        }
        self.render_report();
        self.device
            .write(&self.report)
            .map_err(TargetError::Write)?;
        Ok(())
    }

    fn read_events(&mut self) -> Result<Option<OutputState>, TargetError> {
        let mut output = None;
        loop {
            let event = match self.poll_event() {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(TargetError::UnknownEvent(kind)) => {
                    log::debug!("Unknown event type: {kind}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Some(state) = self.handle_event(event)? {
                output = Some(state);
            }
        }
        Ok(output)
    }

    fn destroy(&mut self) -> Result<(), TargetError> {
        if self.lifecycle == DeviceLifecycle::Destroyed {
            return Ok(());
        }
        log::debug!("Destroying HID device");
        self.lifecycle.transition(DeviceLifecycle::Destroyed);
        self.device.destroy().map_err(TargetError::Write)?;
        Ok(())
    }

    fn lifecycle(&self) -> DeviceLifecycle {
        self.lifecycle
    }
}

impl<T: Read + Write + AsRawFd + Send> Debug for DualSenseDevice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualSenseDevice")
            .field("raw_fd", &self.raw_fd)
            .field("lifecycle", &self.lifecycle)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Creates a [DualSenseDevice] on the system UHID node
#[derive(Debug, Default, Clone, Copy)]
pub struct DualSenseFactory;

impl VirtualFactory for DualSenseFactory {
    fn create(&self) -> Result<Box<dyn VirtualController>, TargetError> {
        Ok(Box::new(DualSenseDevice::create()?))
    }
}
