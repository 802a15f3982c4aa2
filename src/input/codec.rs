//! Bit addressed report codec shared by physical decoding and virtual
//! encoding. Locations are `byte * 8 + bit`, where the bit is counted from
//! the most significant bit of the byte. Axes occupy one whole byte.
use super::state::{AxisMapping, ControllerState};

/// Split a bit location into its byte index and the shift of the bit
/// inside that byte.
pub fn bit_position(location: usize) -> (usize, u8) {
    let byte = location / 8;
    let bit = 7 - (location % 8) as u8;
    (byte, bit)
}

/// Decode every button with a known location from the given report.
/// Returns true if any button changed.
pub fn decode_buttons(buffer: &[u8], state: &mut ControllerState) -> bool {
    let mut changed = false;
    for button in state.buttons_mut() {
        let Some(location) = button.mapping.location else {
            continue;
        };
        let (byte, bit) = bit_position(location);
        let Some(data) = buffer.get(byte) else {
            log::trace!(
                "Location {location} of {:?} is outside of the {} byte report",
                button.mapping.code,
                buffer.len()
            );
            continue;
        };
        let pressed = data & (1 << bit) != 0;
        if button.pressed != pressed {
            button.pressed = pressed;
            changed = true;
        }
    }
    changed
}

/// Decode every axis with a known location from the given report.
/// Returns true if any axis changed.
pub fn decode_axes(buffer: &[u8], state: &mut ControllerState) -> bool {
    let mut changed = false;
    for axis in state.axes_mut() {
        let Some(location) = axis.mapping.location else {
            continue;
        };
        let (byte, _) = bit_position(location);
        let Some(raw) = buffer.get(byte) else {
            log::trace!(
                "Location {location} of {:?} is outside of the {} byte report",
                axis.mapping.code,
                buffer.len()
            );
            continue;
        };
        let value = axis.mapping.normalize(*raw as i64);
        if axis.value != value {
            axis.value = value;
            changed = true;
        }
    }
    changed
}

/// Decode buttons and axes in one pass over the report.
pub fn decode(buffer: &[u8], state: &mut ControllerState) -> bool {
    let buttons_changed = decode_buttons(buffer, state);
    let axes_changed = decode_axes(buffer, state);
    buttons_changed || axes_changed
}

/// Set or clear the bit of every located button.
pub fn encode_buttons(state: &ControllerState, buffer: &mut [u8]) {
    for button in state.buttons() {
        let Some(location) = button.mapping.location else {
            continue;
        };
        let (byte, bit) = bit_position(location);
        let Some(data) = buffer.get_mut(byte) else {
            continue;
        };
        if button.pressed {
            *data |= 1 << bit;
        } else {
            *data &= !(1 << bit);
        }
    }
}

/// Write every located axis using the generic inverse of its mode.
pub fn encode_axes(state: &ControllerState, buffer: &mut [u8]) {
    encode_axes_with(state, buffer, |mapping, value| {
        mapping.denormalize(value) as u8
    });
}

/// Write every located axis, letting the caller decide how a normalized
/// value is packed into its byte.
pub fn encode_axes_with<F>(state: &ControllerState, buffer: &mut [u8], pack: F)
where
    F: Fn(&AxisMapping, f64) -> u8,
{
    for axis in state.axes() {
        let Some(location) = axis.mapping.location else {
            continue;
        };
        let (byte, _) = bit_position(location);
        let Some(data) = buffer.get_mut(byte) else {
            continue;
        };
        *data = pack(&axis.mapping, axis.value);
    }
}
