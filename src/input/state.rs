use std::collections::HashMap;

use super::normalization::{self, AxisRange, NormalizationMode};

/// Canonical, device independent button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ButtonCode {
    A,
    B,
    X,
    Y,
    Lb,
    Rb,
    Ls,
    Rs,
    Mode,
    Start,
    Select,
    Share,
    ExtraL1,
    ExtraL2,
    ExtraR1,
    ExtraR2,
    ExtraR3,
    DpadLeft,
    DpadUp,
    DpadRight,
    DpadDown,
}

/// Canonical, device independent axis identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisCode {
    Lx,
    Ly,
    Rx,
    Ry,
    Lt,
    Rt,
    Hat0X,
    Hat0Y,
}

/// Where a button lives on a particular device. `system_code` is the evdev
/// key code and `location` the bit location inside a raw HID report
/// (`byte * 8 + bit_from_msb`). Either one may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMapping {
    pub system_code: Option<u16>,
    pub code: ButtonCode,
    pub location: Option<usize>,
}

impl ButtonMapping {
    pub const fn new(code: ButtonCode) -> Self {
        Self {
            system_code: None,
            code,
            location: None,
        }
    }

    pub const fn system(mut self, system_code: u16) -> Self {
        self.system_code = Some(system_code);
        self
    }

    pub const fn at(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }
}

/// Where an axis lives on a particular device and how its raw value is
/// encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMapping {
    pub system_code: Option<u16>,
    pub code: AxisCode,
    pub location: Option<usize>,
    pub mode: NormalizationMode,
    pub range: Option<AxisRange>,
}

impl AxisMapping {
    pub const fn new(code: AxisCode, mode: NormalizationMode) -> Self {
        Self {
            system_code: None,
            code,
            location: None,
            mode,
            range: None,
        }
    }

    pub const fn system(mut self, system_code: u16) -> Self {
        self.system_code = Some(system_code);
        self
    }

    pub const fn at(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }

    pub const fn range(mut self, min: i32, max: i32) -> Self {
        self.range = Some(AxisRange::new(min, max));
        self
    }

    /// Returns true if the normalized value lives in `-1.0..=1.0`
    pub fn is_signed(&self) -> bool {
        match self.range {
            Some(range) => range.is_signed(),
            None => self.mode.is_signed(),
        }
    }

    /// Normalize a raw value read from the device
    pub fn normalize(&self, raw: i64) -> f64 {
        match self.range {
            Some(range) => range.normalize(raw.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
            None => normalization::normalize(raw, self.mode),
        }
    }

    /// Convert a normalized value back into the device's raw encoding
    pub fn denormalize(&self, value: f64) -> i64 {
        match self.range {
            Some(range) => range.denormalize(value) as i64,
            None => normalization::denormalize(value, self.mode),
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        if self.is_signed() {
            value.clamp(-1.0, 1.0)
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonState {
    pub mapping: ButtonMapping,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisState {
    pub mapping: AxisMapping,
    pub value: f64,
}

/// Canonical state of one controller. Button and axis states are indexed
/// both by canonical code and by device system code. Every setter reports
/// whether the value actually changed.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    buttons: HashMap<ButtonCode, ButtonState>,
    axes: HashMap<AxisCode, AxisState>,
    button_codes: HashMap<u16, ButtonCode>,
    axis_codes: HashMap<u16, AxisCode>,
}

impl ControllerState {
    /// Create a new state with one entry per mapping, all released and
    /// centered.
    pub fn new(buttons: &[ButtonMapping], axes: &[AxisMapping]) -> Self {
        let mut state = Self::default();
        for mapping in buttons {
            state.buttons.insert(
                mapping.code,
                ButtonState {
                    mapping: *mapping,
                    pressed: false,
                },
            );
            if let Some(system_code) = mapping.system_code {
                state.button_codes.insert(system_code, mapping.code);
            }
        }
        for mapping in axes {
            state.axes.insert(
                mapping.code,
                AxisState {
                    mapping: *mapping,
                    value: 0.0,
                },
            );
            if let Some(system_code) = mapping.system_code {
                state.axis_codes.insert(system_code, mapping.code);
            }
        }
        state
    }

    pub fn button(&self, code: ButtonCode) -> Option<&ButtonState> {
        self.buttons.get(&code)
    }

    /// Returns true if the button exists and is pressed
    pub fn is_pressed(&self, code: ButtonCode) -> bool {
        self.buttons.get(&code).is_some_and(|b| b.pressed)
    }

    pub fn axis(&self, code: AxisCode) -> Option<&AxisState> {
        self.axes.get(&code)
    }

    pub fn axis_value(&self, code: AxisCode) -> Option<f64> {
        self.axes.get(&code).map(|a| a.value)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &ButtonState> {
        self.buttons.values()
    }

    pub fn axes(&self) -> impl Iterator<Item = &AxisState> {
        self.axes.values()
    }

    pub(crate) fn buttons_mut(&mut self) -> impl Iterator<Item = &mut ButtonState> {
        self.buttons.values_mut()
    }

    pub(crate) fn axes_mut(&mut self) -> impl Iterator<Item = &mut AxisState> {
        self.axes.values_mut()
    }

    /// Set the pressed state of the given button. Unknown buttons are ignored.
    pub fn set_button(&mut self, code: ButtonCode, pressed: bool) -> bool {
        let Some(button) = self.buttons.get_mut(&code) else {
            return false;
        };
        if button.pressed == pressed {
            return false;
        }
        button.pressed = pressed;
        true
    }

    /// Set the pressed state of the button mapped to the given evdev key code
    pub fn set_button_by_system_code(&mut self, system_code: u16, pressed: bool) -> bool {
        let Some(code) = self.button_codes.get(&system_code).copied() else {
            log::trace!("No button mapped to system code {system_code}");
            return false;
        };
        self.set_button(code, pressed)
    }

    /// Set the normalized value of the given axis, clamped into its domain.
    pub fn set_axis(&mut self, code: AxisCode, value: f64) -> bool {
        let Some(axis) = self.axes.get_mut(&code) else {
            return false;
        };
        let value = axis.mapping.clamp(value);
        if axis.value == value {
            return false;
        }
        axis.value = value;
        true
    }

    /// Normalize and store the raw value of the axis mapped to the given
    /// evdev axis code.
    pub fn set_axis_by_system_code(&mut self, system_code: u16, raw: i32) -> bool {
        let Some(code) = self.axis_codes.get(&system_code).copied() else {
            log::trace!("No axis mapped to system code {system_code}");
            return false;
        };
        let Some(axis) = self.axes.get(&code) else {
            return false;
        };
        let value = axis.mapping.normalize(raw as i64);
        self.set_axis(code, value)
    }

    /// Copy every button and axis value that also exists in `other`.
    pub fn copy_from(&mut self, other: &ControllerState) -> bool {
        let mut changed = false;
        for button in other.buttons() {
            changed |= self.set_button(button.mapping.code, button.pressed);
        }
        for axis in other.axes() {
            changed |= self.set_axis(axis.mapping.code, axis.value);
        }
        changed
    }
}
