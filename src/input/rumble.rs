/// Strength of the two rumble motors, each in `0.0..=1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RumbleState {
    /// Low frequency, heavy motor
    pub strong: f64,
    /// High frequency, light motor
    pub weak: f64,
}

impl RumbleState {
    pub fn new(strong: f64, weak: f64) -> Self {
        Self {
            strong: strong.clamp(0.0, 1.0),
            weak: weak.clamp(0.0, 1.0),
        }
    }

    /// Returns true if both motors are off
    pub fn is_empty(&self) -> bool {
        self.strong == 0.0 && self.weak == 0.0
    }

    /// Motor magnitudes scaled to the range of an evdev rumble effect
    pub fn magnitudes(&self) -> (u16, u16) {
        let strong = (self.strong * u16::MAX as f64) as u16;
        let weak = (self.weak * u16::MAX as f64) as u16;
        (strong, weak)
    }
}

/// Output requested by the host through the virtual controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutputState {
    pub rumble: RumbleState,
    /// Host asked for rumble emulation instead of haptics
    pub rumble_emulation: bool,
}
