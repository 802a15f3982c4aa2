use packed_struct::PrimitiveEnum;

use crate::{
    drivers::dualsense::{
        driver::{
            DPAD_OFFSET, DS5_EDGE_NAME, DS5_EDGE_PID, DS5_NAME, DS5_PID, DS5_VID,
            INPUT_REPORT_USB, STICK_MAX, STICK_MIN,
        },
        hid_report::Direction,
    },
    input::{
        codec,
        normalization::{denormalize_signed_value, NormalizationMode},
        state::{AxisCode, AxisMapping, ButtonCode, ButtonMapping, ControllerState},
    },
};

use super::{ControllerProfile, DeviceIds};

const DS5_IDS: [DeviceIds; 1] = [DeviceIds::new(DS5_VID, DS5_PID)];
const DS5_EDGE_IDS: [DeviceIds; 1] = [DeviceIds::new(DS5_VID, DS5_EDGE_PID)];

const BUTTONS: [ButtonMapping; 21] = [
    // byte 8, the low nibble holds the d-pad direction
    ButtonMapping::new(ButtonCode::Y).at(8 * 8),
    ButtonMapping::new(ButtonCode::B).at(8 * 8 + 1),
    ButtonMapping::new(ButtonCode::A).at(8 * 8 + 2),
    ButtonMapping::new(ButtonCode::X).at(8 * 8 + 3),
    // byte 9, bits 4 and 5 are the digital trigger bits
    ButtonMapping::new(ButtonCode::Rs).at(9 * 8),
    ButtonMapping::new(ButtonCode::Ls).at(9 * 8 + 1),
    ButtonMapping::new(ButtonCode::Start).at(9 * 8 + 2),
    ButtonMapping::new(ButtonCode::Select).at(9 * 8 + 3),
    ButtonMapping::new(ButtonCode::Rb).at(9 * 8 + 6),
    ButtonMapping::new(ButtonCode::Lb).at(9 * 8 + 7),
    // byte 10
    ButtonMapping::new(ButtonCode::ExtraR1).at(10 * 8),
    ButtonMapping::new(ButtonCode::ExtraL1).at(10 * 8 + 1),
    ButtonMapping::new(ButtonCode::ExtraR2).at(10 * 8 + 2),
    ButtonMapping::new(ButtonCode::ExtraL2).at(10 * 8 + 3),
    ButtonMapping::new(ButtonCode::ExtraR3).at(10 * 8 + 6),
    ButtonMapping::new(ButtonCode::Mode).at(10 * 8 + 7),
    // Folded into the direction nibble
    ButtonMapping::new(ButtonCode::DpadLeft),
    ButtonMapping::new(ButtonCode::DpadUp),
    ButtonMapping::new(ButtonCode::DpadRight),
    ButtonMapping::new(ButtonCode::DpadDown),
    ButtonMapping::new(ButtonCode::Share),
];

const AXES: [AxisMapping; 8] = [
    AxisMapping::new(AxisCode::Lx, NormalizationMode::M8).at(8),
    AxisMapping::new(AxisCode::Ly, NormalizationMode::M8).at(2 * 8),
    AxisMapping::new(AxisCode::Rx, NormalizationMode::M8).at(3 * 8),
    AxisMapping::new(AxisCode::Ry, NormalizationMode::M8).at(4 * 8),
    AxisMapping::new(AxisCode::Lt, NormalizationMode::U8).at(5 * 8),
    AxisMapping::new(AxisCode::Rt, NormalizationMode::U8).at(6 * 8),
    AxisMapping::new(AxisCode::Hat0X, NormalizationMode::I8).range(-1, 1),
    AxisMapping::new(AxisCode::Hat0Y, NormalizationMode::I8).range(-1, 1),
];

/// USB input report layout of the DualSense family. The same table drives
/// decoding of a physical DualSense and encoding of the virtual DualSense
/// Edge.
#[derive(Debug, Clone, Copy)]
pub struct DualSenseProfile {
    name: &'static str,
    ids: &'static [DeviceIds],
}

impl DualSenseProfile {
    /// Profile of a physical DualSense. The Edge product id is left out so
    /// the bridge never picks up its own virtual device.
    pub fn physical() -> Self {
        Self {
            name: DS5_NAME,
            ids: &DS5_IDS,
        }
    }

    /// Profile of the emulated DualSense Edge
    pub fn edge() -> Self {
        Self {
            name: DS5_EDGE_NAME,
            ids: &DS5_EDGE_IDS,
        }
    }

    /// Direction encoded in the d-pad nibble. Pressed d-pad buttons win over
    /// the hat axes.
    pub fn dpad_direction(state: &ControllerState) -> Direction {
        let up = state.is_pressed(ButtonCode::DpadUp);
        let down = state.is_pressed(ButtonCode::DpadDown);
        let left = state.is_pressed(ButtonCode::DpadLeft);
        let right = state.is_pressed(ButtonCode::DpadRight);
        if up || down || left || right {
            return Direction::from_buttons(up, down, left, right);
        }

        let x = state.axis_value(AxisCode::Hat0X).unwrap_or_default();
        let y = state.axis_value(AxisCode::Hat0Y).unwrap_or_default();
        Direction::from_hat(x, y)
    }
}

impl ControllerProfile for DualSenseProfile {
    fn name(&self) -> &str {
        self.name
    }

    fn ids(&self) -> &[DeviceIds] {
        self.ids
    }

    fn button_mappings(&self) -> &'static [ButtonMapping] {
        &BUTTONS
    }

    fn axis_mappings(&self) -> &'static [AxisMapping] {
        &AXES
    }

    fn hidraw_report_id(&self) -> Option<u8> {
        Some(INPUT_REPORT_USB)
    }

    fn decode(&self, buffer: &[u8], state: &mut ControllerState) -> bool {
        let Some(dpad) = buffer.get(DPAD_OFFSET) else {
            return false;
        };
        if buffer[0] != INPUT_REPORT_USB {
            return false;
        }
        let mut changed = codec::decode(buffer, state);

        let direction = Direction::from_primitive(dpad & 0x0F).unwrap_or_default();
        let (x, y) = direction.to_hat();
        changed |= state.set_axis(AxisCode::Hat0X, x);
        changed |= state.set_axis(AxisCode::Hat0Y, y);
        changed
    }

    fn encode(&self, state: &ControllerState, buffer: &mut [u8]) {
        let Some(report_id) = buffer.first_mut() else {
            return;
        };
        *report_id = INPUT_REPORT_USB;

        codec::encode_buttons(state, buffer);
        codec::encode_axes_with(state, buffer, |mapping, value| {
            if mapping.is_signed() {
                denormalize_signed_value(value, STICK_MIN, STICK_MAX)
            } else {
                mapping.denormalize(value) as u8
            }
        });

        if let Some(dpad) = buffer.get_mut(DPAD_OFFSET) {
            let direction = Self::dpad_direction(state);
            *dpad = (*dpad & 0xF0) | direction.to_primitive();
        }
    }
}
