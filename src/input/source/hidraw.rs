use std::{
    fs::{File, OpenOptions},
    io::Read,
    os::{
        fd::{AsRawFd, RawFd},
        unix::fs::OpenOptionsExt,
    },
};

use crate::input::{profile::ControllerProfile, state::ControllerState};

use super::{read_available, DeviceType, InputDevice, InputDeviceHwInfo, SourceError};

/// `struct hidraw_devinfo` from linux/hidraw.h
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HidrawDevInfo {
    pub bustype: u32,
    pub vendor: i16,
    pub product: i16,
}

nix::ioctl_read!(hidraw_get_raw_info, b'H', 0x03, HidrawDevInfo);
nix::ioctl_read_buf!(hidraw_get_raw_name, b'H', 0x04, u8);

/// Read the identity of the hidraw node at the given path
pub fn probe_hidraw(path: &str) -> Result<Option<InputDeviceHwInfo>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_string(),
        source,
    })?;
    let fd = file.as_raw_fd();

    let mut raw_info = HidrawDevInfo::default();
    // SAFETY: the descriptor is open and the kernel fills a hidraw_devinfo
    unsafe { hidraw_get_raw_info(fd, &mut raw_info) }.map_err(|source| SourceError::Ioctl {
        path: path.to_string(),
        source,
    })?;
    let vendor = u16::from_ne_bytes(raw_info.vendor.to_ne_bytes());
    let product = u16::from_ne_bytes(raw_info.product.to_ne_bytes());
    if vendor == 0 && product == 0 {
        return Ok(None);
    }

    let mut name_buf = [0u8; 256];
    // SAFETY: the kernel writes at most the length of the buffer
    let name = match unsafe { hidraw_get_raw_name(fd, &mut name_buf) } {
        Ok(_) => parse_c_string(&name_buf),
        Err(e) => {
            log::trace!("Unable to read name of {path}: {e}");
            String::new()
        }
    };

    Ok(Some(InputDeviceHwInfo {
        name,
        path: path.to_string(),
        vendor,
        product,
        device_type: DeviceType::Hidraw,
    }))
}

fn parse_c_string(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|b| *b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).trim().to_string()
}

/// Vendor specific raw HID interface of a controller
#[derive(Debug)]
pub struct HidrawDevice {
    info: InputDeviceHwInfo,
    file: Option<File>,
}

impl HidrawDevice {
    pub fn new(info: InputDeviceHwInfo) -> Self {
        Self { info, file: None }
    }
}

impl InputDevice for HidrawDevice {
    fn hw_info(&self) -> &InputDeviceHwInfo {
        &self.info
    }

    fn open(&mut self) -> Result<RawFd, SourceError> {
        if let Some(file) = self.file.as_ref() {
            return Ok(file.as_raw_fd());
        }
        log::debug!("Opening device at: {}", self.info.path);
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(nix::libc::O_NONBLOCK)
            .open(&self.info.path)
            .map_err(|source| SourceError::Open {
                path: self.info.path.clone(),
                source,
            })?;
        let raw_fd = file.as_raw_fd();
        self.file = Some(file);
        Ok(raw_fd)
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            log::debug!("Closed device at: {}", self.info.path);
        }
    }

    fn raw_fd(&self) -> Option<RawFd> {
        self.file.as_ref().map(|file| file.as_raw_fd())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, SourceError> {
        let Some(file) = self.file.as_mut() else {
            return Err(SourceError::NotOpen);
        };
        read_available(file.read(buffer))
    }

    fn apply_to_state(
        &self,
        buffer: &[u8],
        profile: &dyn ControllerProfile,
        state: &mut ControllerState,
    ) -> bool {
        profile.decode(buffer, state)
    }
}
