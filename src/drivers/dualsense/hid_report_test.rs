use std::error::Error;

use packed_struct::{PackedStruct, PackedStructSlice, PrimitiveEnum};

use crate::drivers::dualsense::{
    driver::{OUTPUT_REPORT_USB, OUTPUT_REPORT_USB_SHORT_SIZE},
    hid_report::{Direction, UsbPackedOutputReport},
};

#[test]
fn test_ds_output_report_unpack() -> Result<(), Box<dyn Error>> {
    let mut data = [0u8; OUTPUT_REPORT_USB_SHORT_SIZE];
    data[0] = OUTPUT_REPORT_USB;
    data[1] = 0b0000_0011;
    data[2] = 0b0000_0100;
    data[3] = 64;
    data[4] = 255;
    data[45] = 0x10;
    data[47] = 0xF0;

    let report = UsbPackedOutputReport::unpack_from_slice(&data)?;
    assert_eq!(report.report_id, OUTPUT_REPORT_USB);
    assert!(report.enable_rumble_emulation);
    assert!(report.use_rumble_not_haptics);
    assert!(!report.allow_audio_control);
    assert!(report.allow_led_color);
    assert_eq!(report.rumble_emulation_right, 64);
    assert_eq!(report.rumble_emulation_left, 255);
    assert_eq!(report.led_red, 0x10);
    assert_eq!(report.led_blue, 0xF0);

    Ok(())
}

#[test]
fn test_ds_output_report_pack() -> Result<(), Box<dyn Error>> {
    let report = UsbPackedOutputReport {
        enable_rumble_emulation: true,
        rumble_emulation_left: 0x80,
        ..Default::default()
    };
    let data = report.pack()?;
    assert_eq!(data.len(), OUTPUT_REPORT_USB_SHORT_SIZE);
    assert_eq!(data[0], 0x02);
    assert_eq!(data[1], 0x01);
    assert_eq!(data[3], 0x00);
    assert_eq!(data[4], 0x80);

    Ok(())
}

#[test]
fn test_direction_codes() {
    assert_eq!(Direction::North.to_primitive(), 0);
    assert_eq!(Direction::NorthWest.to_primitive(), 7);
    assert_eq!(Direction::default().to_primitive(), 8);
    assert_eq!(Direction::from_primitive(4), Some(Direction::South));
}

#[test]
fn test_direction_from_hat() {
    assert_eq!(Direction::from_hat(0.0, -1.0), Direction::North);
    assert_eq!(Direction::from_hat(1.0, -1.0), Direction::NorthEast);
    assert_eq!(Direction::from_hat(1.0, 1.0), Direction::SouthEast);
    assert_eq!(Direction::from_hat(-1.0, 0.0), Direction::West);
    assert_eq!(Direction::from_hat(0.0, 0.0), Direction::None);
    // Partially deflected hats are not a direction
    assert_eq!(Direction::from_hat(0.5, -1.0), Direction::None);

    for direction in [
        Direction::North,
        Direction::East,
        Direction::SouthWest,
        Direction::None,
    ] {
        let (x, y) = direction.to_hat();
        assert_eq!(Direction::from_hat(x, y), direction);
    }
}

#[test]
fn test_direction_from_buttons() {
    assert_eq!(
        Direction::from_buttons(true, false, false, true),
        Direction::NorthEast
    );
    assert_eq!(
        Direction::from_buttons(false, true, false, false),
        Direction::South
    );
    assert_eq!(
        Direction::from_buttons(true, true, false, false),
        Direction::None
    );
}
