use std::{
    fmt::Debug,
    fs::File,
    io::Read,
    mem::size_of,
    os::fd::{AsFd, AsRawFd, RawFd},
};

use evdev::{Device, EventType, FFEffect, FFEffectData, FFEffectKind, FFReplay, FFTrigger};
use nix::fcntl::{FcntlArg, OFlag};

use crate::input::{profile::ControllerProfile, rumble::RumbleState, state::ControllerState};

use super::{read_available, DeviceType, InputDevice, InputDeviceHwInfo, SourceError};

/// Size of one `struct input_event` record
pub const EVENT_SIZE: usize = size_of::<nix::libc::input_event>();

/// Value of a key event sent while a key is held down
const KEY_REPEAT: i32 = 2;

/// Type, code and value of one raw evdev record. The timestamp is skipped.
pub fn parse_event(record: &[u8]) -> Option<(u16, u16, i32)> {
    if record.len() < EVENT_SIZE {
        return None;
    }
    let offset = EVENT_SIZE - 8;
    let event_type = u16::from_ne_bytes([record[offset], record[offset + 1]]);
    let code = u16::from_ne_bytes([record[offset + 2], record[offset + 3]]);
    let value = i32::from_ne_bytes([
        record[offset + 4],
        record[offset + 5],
        record[offset + 6],
        record[offset + 7],
    ]);
    Some((event_type, code, value))
}

/// Read the identity of the evdev node at the given path. Nodes without a
/// vendor or product id (virtual keyboards, power buttons) are skipped.
pub fn probe_evdev(path: &str) -> Result<Option<InputDeviceHwInfo>, SourceError> {
    let device = Device::open(path).map_err(|source| SourceError::Open {
        path: path.to_string(),
        source,
    })?;
    let id = device.input_id();
    if id.vendor() == 0 || id.product() == 0 {
        return Ok(None);
    }
    Ok(Some(InputDeviceHwInfo {
        name: device.name().unwrap_or_default().to_string(),
        path: path.to_string(),
        vendor: id.vendor(),
        product: id.product(),
        device_type: DeviceType::Evdev,
    }))
}

/// Gamepad exposed through the input event subsystem
pub struct EvdevDevice {
    info: InputDeviceHwInfo,
    device: Option<Device>,
    reader: Option<File>,
    ff_effect: Option<FFEffect>,
}

impl EvdevDevice {
    pub fn new(info: InputDeviceHwInfo) -> Self {
        Self {
            info,
            device: None,
            reader: None,
            ff_effect: None,
        }
    }

    fn ioctl_error(&self, source: nix::errno::Errno) -> SourceError {
        SourceError::Ioctl {
            path: self.info.path.clone(),
            source,
        }
    }
}

impl Debug for EvdevDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevDevice")
            .field("info", &self.info)
            .field("open", &self.device.is_some())
            .field("ff_effect", &self.ff_effect.as_ref().map(|effect| effect.id()))
            .finish()
    }
}

impl InputDevice for EvdevDevice {
    fn hw_info(&self) -> &InputDeviceHwInfo {
        &self.info
    }

    fn open(&mut self) -> Result<RawFd, SourceError> {
        if let Some(device) = self.device.as_ref() {
            return Ok(device.as_raw_fd());
        }

        let path = self.info.path.clone();
        log::debug!("Opening device at: {}", path);
        let mut device = Device::open(&path).map_err(|source| SourceError::Open {
            path: path.clone(),
            source,
        })?;
        device.grab().map_err(|source| SourceError::Open {
            path: path.clone(),
            source,
        })?;

        // Set the device to do non-blocking reads
        let raw_fd = device.as_raw_fd();
        nix::fcntl::fcntl(raw_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
            .map_err(|e| self.ioctl_error(e))?;

        // Raw records are read through a duplicate of the descriptor so the
        // device stays available for force feedback.
        let reader = device
            .as_fd()
            .try_clone_to_owned()
            .map(File::from)
            .map_err(|source| SourceError::Open {
                path: self.info.path.clone(),
                source,
            })?;

        self.device = Some(device);
        self.reader = Some(reader);
        Ok(raw_fd)
    }

    fn close(&mut self) {
        // Removing the effect needs the device to still be open
        self.ff_effect = None;
        self.reader = None;
        let Some(mut device) = self.device.take() else {
            return;
        };
        if let Err(e) = device.ungrab() {
            log::warn!("Failed to release grab on {}: {e}", self.info.path);
        }
        log::debug!("Closed device at: {}", self.info.path);
    }

    fn raw_fd(&self) -> Option<RawFd> {
        self.device.as_ref().map(|device| device.as_raw_fd())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, SourceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(SourceError::NotOpen);
        };
        // Only read whole records
        let len = buffer.len() - buffer.len() % EVENT_SIZE;
        read_available(reader.read(&mut buffer[..len]))
    }

    fn apply_to_state(
        &self,
        buffer: &[u8],
        _profile: &dyn ControllerProfile,
        state: &mut ControllerState,
    ) -> bool {
        let mut changed = false;
        for record in buffer.chunks_exact(EVENT_SIZE) {
            let Some((event_type, code, value)) = parse_event(record) else {
                continue;
            };
            if event_type == EventType::KEY.0 {
                if value == KEY_REPEAT {
                    continue;
                }
                changed |= state.set_button_by_system_code(code, value == 1);
            } else if event_type == EventType::ABSOLUTE.0 {
                changed |= state.set_axis_by_system_code(code, value);
            }
        }
        changed
    }

    fn apply_rumble(&mut self, rumble: &RumbleState) -> Result<(), SourceError> {
        let Some(device) = self.device.as_mut() else {
            return Err(SourceError::NotOpen);
        };

        // If no effect was uploaded to handle force feedback, upload one.
        if self.ff_effect.is_none() {
            let effect_data = FFEffectData {
                direction: 0,
                trigger: FFTrigger {
                    button: 0,
                    interval: 0,
                },
                replay: FFReplay {
                    length: 50,
                    delay: 0,
                },
                kind: FFEffectKind::Rumble {
                    strong_magnitude: 0,
                    weak_magnitude: 0,
                },
            };
            log::trace!("Uploading FF effect data");
            let effect = device
                .upload_ff_effect(effect_data)
                .map_err(SourceError::ForceFeedback)?;
            self.ff_effect = Some(effect);
        }
        let Some(effect) = self.ff_effect.as_mut() else {
            return Ok(());
        };

        // Stop playing the effect if values are set to zero
        if rumble.is_empty() {
            log::trace!("Stopping FF effect");
            effect.stop().map_err(SourceError::ForceFeedback)?;
            return Ok(());
        }

        // Set the values of the effect and play it
        let (strong_magnitude, weak_magnitude) = rumble.magnitudes();
        let effect_data = FFEffectData {
            direction: 0,
            trigger: FFTrigger {
                button: 0,
                interval: 0,
            },
            replay: FFReplay {
                length: 60000,
                delay: 0,
            },
            kind: FFEffectKind::Rumble {
                strong_magnitude,
                weak_magnitude,
            },
        };
        log::trace!("Updating effect data");
        effect
            .update(effect_data)
            .map_err(SourceError::ForceFeedback)?;
        log::trace!("Playing effect with data: {:?}", effect_data);
        effect.play(1).map_err(SourceError::ForceFeedback)?;

        Ok(())
    }
}
