use evdev::{AbsoluteAxisCode, KeyCode};

use crate::{
    drivers::{
        dualsense::driver::{DS5_EDGE_PID, DS5_PID, DS5_VID, INPUT_REPORT_USB_SIZE},
        lego,
    },
    input::{
        profile::{
            ControllerProfile, DeviceIds, DualSenseProfile, LegionGoProfile, ProfileRegistry,
            XboxProfile,
        },
        state::{AxisCode, ButtonCode},
    },
};

#[test]
fn test_registry_lookup() {
    let registry = ProfileRegistry::default();

    let profile = registry.lookup(DeviceIds::new(0x045e, 0x0b12));
    assert_eq!(profile.map(|p| p.name().to_string()), Some(XboxProfile.name().to_string()));

    let profile = registry.lookup(DeviceIds::new(lego::driver::VID, lego::driver::XINPUT_PID));
    assert_eq!(profile.and_then(|p| p.hidraw_report_id()), Some(0x04));

    let profile = registry.lookup(DeviceIds::new(DS5_VID, DS5_PID));
    assert!(profile.is_some(), "physical DualSense is supported");

    // The virtual controller must never be detected as a physical one
    assert!(registry.lookup(DeviceIds::new(DS5_VID, DS5_EDGE_PID)).is_none());
    assert!(registry.lookup(DeviceIds::new(0x1234, 0x5678)).is_none());
}

#[test]
fn test_empty_registry() {
    let mut registry = ProfileRegistry::empty();
    let ids = DeviceIds::new(0x045e, 0x0b12);
    assert!(registry.lookup(ids).is_none());
    registry.register(std::sync::Arc::new(XboxProfile));
    assert!(registry.lookup(ids).is_some());
}

#[test]
fn test_device_ids_display() {
    assert_eq!(DeviceIds::new(0x17ef, 0x6182).to_string(), "17ef:6182");
}

#[test]
fn test_xbox_evdev_codes() {
    let profile = XboxProfile;
    let mut state = profile.new_state();

    assert!(state.set_button_by_system_code(KeyCode::BTN_SOUTH.0, true));
    assert!(state.is_pressed(ButtonCode::A));
    assert!(state.set_button_by_system_code(KeyCode::BTN_NORTH.0, true));
    assert!(state.is_pressed(ButtonCode::X));

    // 10 bit triggers
    assert!(state.set_axis_by_system_code(AbsoluteAxisCode::ABS_Z.0, 1023));
    assert_eq!(state.axis_value(AxisCode::Lt), Some(1.0));
    assert!(state.set_axis_by_system_code(AbsoluteAxisCode::ABS_HAT0Y.0, -1));
    assert_eq!(state.axis_value(AxisCode::Hat0Y), Some(-1.0));
    assert!(state.set_axis_by_system_code(AbsoluteAxisCode::ABS_X.0, -32767));
    assert_eq!(state.axis_value(AxisCode::Lx), Some(-1.0));

    // Xbox profiles have no raw report, nothing decodes
    assert_eq!(profile.hidraw_report_id(), None);
}

#[test]
fn test_legion_go_report() {
    let profile = LegionGoProfile;
    let mut state = profile.new_state();

    let mut report = [0u8; lego::driver::XINPUT_PACKET_SIZE];
    report[0] = lego::driver::XINPUT_DATA;
    // Share and d-pad up
    report[18] = 0b0100_1000;
    // A and RB
    report[19] = 0b1000_0010;
    // Left paddle and start
    report[20] = 0b1000_0001;

    assert!(profile.decode(&report, &mut state));
    assert!(state.is_pressed(ButtonCode::Share));
    assert!(state.is_pressed(ButtonCode::DpadUp));
    assert!(state.is_pressed(ButtonCode::A));
    assert!(state.is_pressed(ButtonCode::Rb));
    assert!(state.is_pressed(ButtonCode::ExtraL1));
    assert!(state.is_pressed(ButtonCode::Start));
    assert!(!state.is_pressed(ButtonCode::Mode));
    assert!(!state.is_pressed(ButtonCode::B));
    assert!(!state.is_pressed(ButtonCode::Select));

    // Reports with another id are ignored
    report[0] = 0x01;
    report[18] = 0;
    assert!(!profile.decode(&report, &mut state));
    assert!(state.is_pressed(ButtonCode::Share));
}

#[test]
fn test_dualsense_encode_neutral() {
    let profile = DualSenseProfile::edge();
    let state = profile.new_state();
    let mut report = [0u8; INPUT_REPORT_USB_SIZE];
    profile.encode(&state, &mut report);

    assert_eq!(report[0], 0x01);
    assert_eq!(&report[1..5], &[128, 128, 128, 128]);
    assert_eq!(&report[5..7], &[0, 0]);
    assert_eq!(report[8], 0x08, "no direction");
    assert_eq!(report[9], 0);
    assert_eq!(report[10], 0);
}

#[test]
fn test_dualsense_encode_buttons() {
    let profile = DualSenseProfile::edge();
    let mut state = profile.new_state();
    state.set_button(ButtonCode::Y, true);
    state.set_button(ButtonCode::A, true);
    state.set_button(ButtonCode::Lb, true);
    state.set_button(ButtonCode::Start, true);
    state.set_button(ButtonCode::Mode, true);
    state.set_button(ButtonCode::ExtraR3, true);
    state.set_button(ButtonCode::ExtraL1, true);
    state.set_axis(AxisCode::Lx, 1.0);
    state.set_axis(AxisCode::Ry, -1.0);
    state.set_axis(AxisCode::Rt, 1.0);

    let mut report = [0u8; INPUT_REPORT_USB_SIZE];
    profile.encode(&state, &mut report);

    // triangle and cross, no direction
    assert_eq!(report[8], 0b1010_1000);
    // options and l1
    assert_eq!(report[9], 0b0010_0001);
    // left paddle, touchpad and ps
    assert_eq!(report[10], 0b0100_0011);
    assert_eq!(report[1], 255);
    assert_eq!(report[4], 0);
    assert_eq!(report[6], 255);
}

#[test]
fn test_dualsense_dpad() {
    let profile = DualSenseProfile::edge();
    let mut state = profile.new_state();
    let mut report = [0u8; INPUT_REPORT_USB_SIZE];

    state.set_axis(AxisCode::Hat0X, 1.0);
    state.set_axis(AxisCode::Hat0Y, 1.0);
    state.set_button(ButtonCode::X, true);
    profile.encode(&state, &mut report);
    assert_eq!(report[8], 0b0001_0011, "square and south east");

    // Buttons take precedence over the hat
    state.set_button(ButtonCode::DpadLeft, true);
    profile.encode(&state, &mut report);
    assert_eq!(report[8] & 0x0F, 6, "west");

    state.set_button(ButtonCode::DpadLeft, false);
    state.set_axis(AxisCode::Hat0X, 0.0);
    state.set_axis(AxisCode::Hat0Y, 0.0);
    profile.encode(&state, &mut report);
    assert_eq!(report[8], 0b0001_1000);
}

#[test]
fn test_dualsense_round_trip() {
    let profile = DualSenseProfile::edge();
    let mut state = profile.new_state();
    let pressed = [
        ButtonCode::B,
        ButtonCode::X,
        ButtonCode::Rs,
        ButtonCode::Select,
        ButtonCode::Rb,
        ButtonCode::ExtraR1,
        ButtonCode::ExtraR2,
        ButtonCode::ExtraL2,
    ];
    for code in pressed {
        state.set_button(code, true);
    }
    state.set_axis(AxisCode::Lx, -1.0);
    state.set_axis(AxisCode::Ly, 0.0);
    state.set_axis(AxisCode::Rx, 0.5);
    state.set_axis(AxisCode::Lt, 1.0);
    state.set_axis(AxisCode::Hat0X, -1.0);
    state.set_axis(AxisCode::Hat0Y, -1.0);

    let mut report = [0u8; INPUT_REPORT_USB_SIZE];
    profile.encode(&state, &mut report);

    let mut decoded = profile.new_state();
    assert!(profile.decode(&report, &mut decoded));
    for button in state.buttons() {
        if button.mapping.location.is_none() {
            continue;
        }
        let code = button.mapping.code;
        assert_eq!(decoded.is_pressed(code), button.pressed, "{code:?}");
    }
    for code in [AxisCode::Lx, AxisCode::Ly, AxisCode::Rx, AxisCode::Lt] {
        let expected = state.axis_value(code).unwrap_or_default();
        let actual = decoded.axis_value(code).unwrap_or_default();
        assert!(
            (expected - actual).abs() <= 1.0 / 127.0,
            "{code:?}: {expected} decoded as {actual}"
        );
    }
    assert_eq!(decoded.axis_value(AxisCode::Hat0X), Some(-1.0));
    assert_eq!(decoded.axis_value(AxisCode::Hat0Y), Some(-1.0));
}
