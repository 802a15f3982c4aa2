// Source: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-playstation.c
pub const DS5_EDGE_NAME: &str = "Sony Interactive Entertainment DualSense Edge Wireless Controller";
pub const DS5_EDGE_VERSION: u32 = 256;
pub const DS5_EDGE_VID: u16 = 0x054c;
pub const DS5_EDGE_PID: u16 = 0x0df2;

pub const DS5_NAME: &str = "Sony Interactive Entertainment DualSense Wireless Controller";
pub const DS5_VID: u16 = 0x054c;
pub const DS5_PID: u16 = 0x0ce6;

pub const FEATURE_REPORT_PAIRING_INFO: u8 = 0x09;
pub const FEATURE_REPORT_PAIRING_INFO_SIZE: usize = 20;
pub const FEATURE_REPORT_FIRMWARE_INFO: u8 = 0x20;
pub const FEATURE_REPORT_FIRMWARE_INFO_SIZE: usize = 64;
pub const FEATURE_REPORT_CALIBRATION: u8 = 0x05;
pub const FEATURE_REPORT_CALIBRATION_SIZE: usize = 41;

pub const INPUT_REPORT_USB: u8 = 0x01;
pub const INPUT_REPORT_USB_SIZE: usize = 64;
pub const OUTPUT_REPORT_USB: u8 = 0x02;
pub const OUTPUT_REPORT_USB_SIZE: usize = 63;
pub const OUTPUT_REPORT_USB_SHORT_SIZE: usize = 48;

// Input report axis ranges
pub const STICK_MIN: f64 = u8::MIN as f64;
pub const STICK_MAX: f64 = u8::MAX as f64;

// Input report byte offsets that are not driven by the button table
pub const SEQUENCE_NUMBER_OFFSET: usize = 7;
pub const DPAD_OFFSET: usize = 8;
pub const TOUCH_CONTEXT_OFFSETS: [usize; 2] = [33, 37];
pub const BATTERY_OFFSET: usize = 53;
pub const POWER_OFFSET: usize = 54;

/// Touch contact id with the "not touching" bit set
pub const TOUCH_INACTIVE: u8 = 0x80;
/// Battery level 10 and charge complete
pub const BATTERY_FULL: u8 = 0x2A;
/// USB power and data connected
pub const USB_POWERED: u8 = 0x18;

/// MAC address reported in the pairing info feature report
pub const MAC_ADDRESS: [u8; 6] = [0x74, 0xe7, 0xd6, 0x3a, 0x53, 0x35];

/// Unique id the kernel shows for the virtual device. The pairing report
/// stores the MAC in reverse order, so the printed form is reversed too.
pub fn uniq() -> String {
    MAC_ADDRESS
        .iter()
        .rev()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
