use std::{fs, path::Path};

use crate::drivers::lego;

#[cfg(test)]
pub mod dmi_test;

/// Default location of the DMI product name exported by the kernel
pub const DMI_PRODUCT_NAME_PATH: &str = "/sys/devices/virtual/dmi/id/product_name";

/// Read the DMI property at the given path. Missing or unreadable
/// properties read as an empty string.
pub fn get_dmi_property<P: AsRef<Path>>(path: P) -> String {
    fs::read_to_string(path)
        .unwrap_or_default()
        .replace('\n', "")
}

/// Returns true if the product name at the given path identifies a Lenovo
/// Legion Go handheld.
pub fn is_legion_go<P: AsRef<Path>>(path: P) -> bool {
    get_dmi_property(path).trim() == lego::driver::DMI_PRODUCT_NAME
}
