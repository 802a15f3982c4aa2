use evdev::{AbsoluteAxisCode, KeyCode};

use crate::input::{
    normalization::NormalizationMode,
    state::{AxisCode, AxisMapping, ButtonCode, ButtonMapping},
};

use super::{ControllerProfile, DeviceIds};

pub const VID: u16 = 0x045e;
pub const PID: u16 = 0x0b12;

const IDS: [DeviceIds; 1] = [DeviceIds::new(VID, PID)];

const BUTTONS: [ButtonMapping; 11] = [
    ButtonMapping::new(ButtonCode::X).system(KeyCode::BTN_NORTH.0),
    ButtonMapping::new(ButtonCode::Y).system(KeyCode::BTN_WEST.0),
    ButtonMapping::new(ButtonCode::B).system(KeyCode::BTN_EAST.0),
    ButtonMapping::new(ButtonCode::A).system(KeyCode::BTN_SOUTH.0),
    ButtonMapping::new(ButtonCode::Select).system(KeyCode::BTN_SELECT.0),
    ButtonMapping::new(ButtonCode::Start).system(KeyCode::BTN_START.0),
    ButtonMapping::new(ButtonCode::Lb).system(KeyCode::BTN_TL.0),
    ButtonMapping::new(ButtonCode::Rb).system(KeyCode::BTN_TR.0),
    ButtonMapping::new(ButtonCode::Ls).system(KeyCode::BTN_THUMBL.0),
    ButtonMapping::new(ButtonCode::Rs).system(KeyCode::BTN_THUMBR.0),
    ButtonMapping::new(ButtonCode::Mode).system(KeyCode::BTN_MODE.0),
];

// Triggers report 10 bits, hats -1..1
const AXES: [AxisMapping; 8] = [
    AxisMapping::new(AxisCode::Hat0X, NormalizationMode::I16)
        .system(AbsoluteAxisCode::ABS_HAT0X.0)
        .range(-1, 1),
    AxisMapping::new(AxisCode::Hat0Y, NormalizationMode::I16)
        .system(AbsoluteAxisCode::ABS_HAT0Y.0)
        .range(-1, 1),
    AxisMapping::new(AxisCode::Lt, NormalizationMode::U16)
        .system(AbsoluteAxisCode::ABS_Z.0)
        .range(0, 1023),
    AxisMapping::new(AxisCode::Rt, NormalizationMode::U16)
        .system(AbsoluteAxisCode::ABS_RZ.0)
        .range(0, 1023),
    AxisMapping::new(AxisCode::Lx, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_X.0),
    AxisMapping::new(AxisCode::Ly, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_Y.0),
    AxisMapping::new(AxisCode::Rx, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_RX.0),
    AxisMapping::new(AxisCode::Ry, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_RY.0),
];

/// Microsoft Xbox Series controller over USB. Everything arrives through
/// the evdev node created by xpad.
#[derive(Debug, Clone, Copy, Default)]
pub struct XboxProfile;

impl ControllerProfile for XboxProfile {
    fn name(&self) -> &str {
        "Microsoft Xbox Controller"
    }

    fn ids(&self) -> &[DeviceIds] {
        &IDS
    }

    fn button_mappings(&self) -> &'static [ButtonMapping] {
        &BUTTONS
    }

    fn axis_mappings(&self) -> &'static [AxisMapping] {
        &AXES
    }
}
