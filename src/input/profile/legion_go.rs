use evdev::{AbsoluteAxisCode, KeyCode};

use crate::{
    drivers::lego::driver::{self as lego, XINPUT_DATA},
    input::{
        normalization::NormalizationMode,
        state::{AxisCode, AxisMapping, ButtonCode, ButtonMapping},
    },
};

use super::{ControllerProfile, DeviceIds};

const IDS: [DeviceIds; 1] = [DeviceIds::new(lego::VID, lego::XINPUT_PID)];

const BUTTONS: [ButtonMapping; 21] = [
    ButtonMapping::new(ButtonCode::X)
        .system(KeyCode::BTN_NORTH.0)
        .at(lego::X_LOCATION),
    ButtonMapping::new(ButtonCode::Y)
        .system(KeyCode::BTN_WEST.0)
        .at(lego::Y_LOCATION),
    ButtonMapping::new(ButtonCode::B)
        .system(KeyCode::BTN_EAST.0)
        .at(lego::B_LOCATION),
    ButtonMapping::new(ButtonCode::A)
        .system(KeyCode::BTN_SOUTH.0)
        .at(lego::A_LOCATION),
    ButtonMapping::new(ButtonCode::Select)
        .system(KeyCode::BTN_SELECT.0)
        .at(lego::SELECT_LOCATION),
    ButtonMapping::new(ButtonCode::Start)
        .system(KeyCode::BTN_START.0)
        .at(lego::START_LOCATION),
    ButtonMapping::new(ButtonCode::Lb)
        .system(KeyCode::BTN_TL.0)
        .at(lego::LB_LOCATION),
    ButtonMapping::new(ButtonCode::Rb)
        .system(KeyCode::BTN_TR.0)
        .at(lego::RB_LOCATION),
    ButtonMapping::new(ButtonCode::Ls)
        .system(KeyCode::BTN_THUMBL.0)
        .at(lego::LS_LOCATION),
    ButtonMapping::new(ButtonCode::Rs)
        .system(KeyCode::BTN_THUMBR.0)
        .at(lego::RS_LOCATION),
    ButtonMapping::new(ButtonCode::Mode)
        .system(KeyCode::BTN_MODE.0)
        .at(lego::MODE_LOCATION),
    // Buttons the xpad driver does not expose
    ButtonMapping::new(ButtonCode::Share).at(lego::SHARE_LOCATION),
    ButtonMapping::new(ButtonCode::ExtraL1).at(lego::EXTRA_L1_LOCATION),
    ButtonMapping::new(ButtonCode::ExtraL2).at(lego::EXTRA_L2_LOCATION),
    ButtonMapping::new(ButtonCode::ExtraR1).at(lego::EXTRA_R1_LOCATION),
    ButtonMapping::new(ButtonCode::ExtraR2).at(lego::EXTRA_R2_LOCATION),
    ButtonMapping::new(ButtonCode::ExtraR3).at(lego::EXTRA_R3_LOCATION),
    ButtonMapping::new(ButtonCode::DpadLeft).at(lego::DPAD_LEFT_LOCATION),
    ButtonMapping::new(ButtonCode::DpadUp).at(lego::DPAD_UP_LOCATION),
    ButtonMapping::new(ButtonCode::DpadRight).at(lego::DPAD_RIGHT_LOCATION),
    ButtonMapping::new(ButtonCode::DpadDown).at(lego::DPAD_DOWN_LOCATION),
];

const AXES: [AxisMapping; 8] = [
    AxisMapping::new(AxisCode::Hat0X, NormalizationMode::I16)
        .system(AbsoluteAxisCode::ABS_HAT0X.0)
        .range(-1, 1),
    AxisMapping::new(AxisCode::Hat0Y, NormalizationMode::I16)
        .system(AbsoluteAxisCode::ABS_HAT0Y.0)
        .range(-1, 1),
    AxisMapping::new(AxisCode::Lt, NormalizationMode::U8).system(AbsoluteAxisCode::ABS_Z.0),
    AxisMapping::new(AxisCode::Rt, NormalizationMode::U8).system(AbsoluteAxisCode::ABS_RZ.0),
    AxisMapping::new(AxisCode::Lx, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_X.0),
    AxisMapping::new(AxisCode::Ly, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_Y.0),
    AxisMapping::new(AxisCode::Rx, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_RX.0),
    AxisMapping::new(AxisCode::Ry, NormalizationMode::I16).system(AbsoluteAxisCode::ABS_RY.0),
];

/// Built-in controllers of the Lenovo Legion Go in xinput mode. Sticks and
/// triggers arrive over evdev, the extra buttons only exist in the vendor
/// hidraw report.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegionGoProfile;

impl ControllerProfile for LegionGoProfile {
    fn name(&self) -> &str {
        "Lenovo Legion Go"
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

    fn hidraw_report_id(&self) -> Option<u8> {
        Some(XINPUT_DATA)
    }
}
