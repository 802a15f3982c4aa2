//! Static feature reports of a DualSense Edge. The host driver refuses the
//! device if any of these differ from what real hardware returns.
use super::driver::{
    FEATURE_REPORT_CALIBRATION, FEATURE_REPORT_CALIBRATION_SIZE, FEATURE_REPORT_FIRMWARE_INFO,
    FEATURE_REPORT_FIRMWARE_INFO_SIZE, FEATURE_REPORT_PAIRING_INFO,
    FEATURE_REPORT_PAIRING_INFO_SIZE,
};

pub const PAIRING_INFO: [u8; FEATURE_REPORT_PAIRING_INFO_SIZE] = [
    0x09, 0x74, 0xe7, 0xd6, 0x3a, 0x53, 0x35, 0x08, 0x25, 0x00, 0x1e, 0x00, 0xee, 0x74, 0xd0, 0xbc,
    0x00, 0x00, 0x00, 0x00,
];

pub const FIRMWARE_INFO: [u8; FEATURE_REPORT_FIRMWARE_INFO_SIZE] = [
    0x20, 0x4a, 0x75, 0x6e, 0x20, 0x31, 0x39, 0x20, 0x32, 0x30, 0x32, 0x33, 0x31, 0x34, 0x3a, 0x34,
    0x37, 0x3a, 0x33, 0x34, 0x03, 0x00, 0x44, 0x00, 0x08, 0x02, 0x00, 0x01, 0x36, 0x00, 0x00, 0x01,
    0xc1, 0xc8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x54, 0x01, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
    0x0b, 0x00, 0x01, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

pub const CALIBRATION: [u8; FEATURE_REPORT_CALIBRATION_SIZE] = [
    0x05, 0xfe, 0xff, 0xfc, 0xff, 0xfe, 0xff, 0x83, 0x22, 0x78, 0xdd, 0x92, 0x22, 0x5f, 0xdd, 0x95,
    0x22, 0x6d, 0xdd, 0x1c, 0x02, 0x1c, 0x02, 0xf2, 0x1f, 0xed, 0xdf, 0xe3, 0x20, 0xda, 0xe0, 0xee,
    0x1f, 0xdf, 0xdf, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Look up the canned reply for the given feature report id
pub fn feature_report(report_id: u8) -> Option<&'static [u8]> {
    match report_id {
        FEATURE_REPORT_PAIRING_INFO => Some(&PAIRING_INFO),
        FEATURE_REPORT_FIRMWARE_INFO => Some(&FIRMWARE_INFO),
        FEATURE_REPORT_CALIBRATION => Some(&CALIBRATION),
        _ => None,
    }
}
