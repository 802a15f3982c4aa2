use crate::input::{
    codec::{self, bit_position},
    normalization::NormalizationMode,
    state::{AxisCode, AxisMapping, ButtonCode, ButtonMapping, ControllerState},
};

const BUTTONS: [ButtonMapping; 5] = [
    ButtonMapping::new(ButtonCode::A).at(0),
    ButtonMapping::new(ButtonCode::B).at(3),
    ButtonMapping::new(ButtonCode::X).at(4),
    ButtonMapping::new(ButtonCode::Y).at(7),
    ButtonMapping::new(ButtonCode::Start),
];

const AXES: [AxisMapping; 3] = [
    AxisMapping::new(AxisCode::Lx, NormalizationMode::M8).at(8),
    AxisMapping::new(AxisCode::Lt, NormalizationMode::U8).at(2 * 8),
    AxisMapping::new(AxisCode::Rt, NormalizationMode::U8),
];

#[test]
fn test_bit_position_counts_from_msb() {
    assert_eq!(bit_position(0), (0, 7));
    assert_eq!(bit_position(4), (0, 3));
    assert_eq!(bit_position(7), (0, 0));
    assert_eq!(bit_position(19 * 8 + 2), (19, 5));
}

#[test]
fn test_decode_single_button() {
    let mut state = ControllerState::new(&BUTTONS, &AXES);

    // Location 4 addresses bit 3 of the first byte
    let changed = codec::decode_buttons(&[0b0000_1000, 0, 0], &mut state);
    assert!(changed);
    assert!(state.is_pressed(ButtonCode::X));
    assert!(!state.is_pressed(ButtonCode::A));
    assert!(!state.is_pressed(ButtonCode::B));
    assert!(!state.is_pressed(ButtonCode::Y));

    // Location 3 addresses bit 4
    codec::decode_buttons(&[0b0001_0000, 0, 0], &mut state);
    assert!(state.is_pressed(ButtonCode::B));
    assert!(!state.is_pressed(ButtonCode::X));
}

#[test]
fn test_decode_reports_dirty_only_on_change() {
    let mut state = ControllerState::new(&BUTTONS, &AXES);
    let report = [0b1000_0001, 128, 0];
    assert!(codec::decode(&report, &mut state));
    assert!(state.is_pressed(ButtonCode::A));
    assert!(state.is_pressed(ButtonCode::Y));
    assert!(!codec::decode(&report, &mut state), "same report is not a change");
}

#[test]
fn test_decode_axes() {
    let mut state = ControllerState::new(&BUTTONS, &AXES);
    assert!(codec::decode_axes(&[0, 0, 255], &mut state));
    assert_eq!(state.axis_value(AxisCode::Lx), Some(-1.0));
    assert_eq!(state.axis_value(AxisCode::Lt), Some(1.0));
    // Unlocated axes are left alone
    assert_eq!(state.axis_value(AxisCode::Rt), Some(0.0));
}

#[test]
fn test_short_report_is_ignored() {
    let mut state = ControllerState::new(&BUTTONS, &AXES);
    assert!(!codec::decode(&[], &mut state));
}

#[test]
fn test_encode_mirrors_decode() {
    let mut state = ControllerState::new(&BUTTONS, &AXES);
    state.set_button(ButtonCode::A, true);
    state.set_button(ButtonCode::X, true);
    state.set_axis(AxisCode::Lx, 0.5);
    state.set_axis(AxisCode::Lt, 1.0);

    let mut buffer = [0u8; 3];
    codec::encode_buttons(&state, &mut buffer);
    codec::encode_axes(&state, &mut buffer);
    assert_eq!(buffer, [0b1000_1000, 192, 255]);

    let mut decoded = ControllerState::new(&BUTTONS, &AXES);
    codec::decode(&buffer, &mut decoded);
    for code in [ButtonCode::A, ButtonCode::B, ButtonCode::X, ButtonCode::Y] {
        assert_eq!(decoded.is_pressed(code), state.is_pressed(code), "{code:?}");
    }
    assert_eq!(decoded.axis_value(AxisCode::Lx), Some(0.5));
    assert_eq!(decoded.axis_value(AxisCode::Lt), Some(1.0));
}

#[test]
fn test_encode_clears_released_buttons() {
    let state = ControllerState::new(&BUTTONS, &AXES);
    let mut buffer = [0xFF, 0, 0];
    codec::encode_buttons(&state, &mut buffer);
    // Bits 1, 2, 5 and 6 are not mapped and survive
    assert_eq!(buffer[0], 0b0110_0110);
}

#[test]
fn test_encode_axes_with_custom_packing() {
    let mut state = ControllerState::new(&BUTTONS, &AXES);
    state.set_axis(AxisCode::Lx, -1.0);
    let mut buffer = [0u8; 3];
    codec::encode_axes_with(&state, &mut buffer, |mapping, value| match mapping.code {
        AxisCode::Lx => 42,
        _ => (value * 10.0) as u8,
    });
    assert_eq!(buffer, [0, 42, 0]);
}
