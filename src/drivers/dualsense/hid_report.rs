use packed_struct::prelude::*;

use super::driver::OUTPUT_REPORT_USB;

/// D-pad direction as encoded in the low nibble of the button byte
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
    #[default]
    None = 8,
}

impl Direction {
    /// Direction of the given hat values. Only exact -1, 0 and 1 values
    /// produce a direction, y grows downwards.
    pub fn from_hat(x: f64, y: f64) -> Self {
        let x = if x == -1.0 || x == 0.0 || x == 1.0 {
            x as i8
        } else {
            return Self::None;
        };
        let y = if y == -1.0 || y == 0.0 || y == 1.0 {
            y as i8
        } else {
            return Self::None;
        };
        match (x, y) {
            (0, -1) => Self::North,
            (1, -1) => Self::NorthEast,
            (1, 0) => Self::East,
            (1, 1) => Self::SouthEast,
            (0, 1) => Self::South,
            (-1, 1) => Self::SouthWest,
            (-1, 0) => Self::West,
            (-1, -1) => Self::NorthWest,
            _ => Self::None,
        }
    }

    /// Direction of four d-pad buttons. Opposing buttons cancel out.
    pub fn from_buttons(up: bool, down: bool, left: bool, right: bool) -> Self {
        let x = right as i8 - left as i8;
        let y = down as i8 - up as i8;
        Self::from_hat(x as f64, y as f64)
    }

    /// Hat values of this direction
    pub fn to_hat(&self) -> (f64, f64) {
        match self {
            Self::North => (0.0, -1.0),
            Self::NorthEast => (1.0, -1.0),
            Self::East => (1.0, 0.0),
            Self::SouthEast => (1.0, 1.0),
            Self::South => (0.0, 1.0),
            Self::SouthWest => (-1.0, 1.0),
            Self::West => (-1.0, 0.0),
            Self::NorthWest => (-1.0, -1.0),
            Self::None => (0.0, 0.0),
        }
    }
}

/// Head of the USB output report the host sends to change rumble, lights
/// and audio. Only the fields this bridge reacts to are broken out.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "48")]
pub struct UsbPackedOutputReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8,

    // byte 1
    #[packed_field(bits = "8")]
    pub allow_audio_control: bool,
    #[packed_field(bits = "9")]
    pub allow_mic_volume: bool,
    #[packed_field(bits = "10")]
    pub allow_speaker_volume: bool,
    #[packed_field(bits = "11")]
    pub allow_headphone_volume: bool,
    #[packed_field(bits = "12")]
    pub allow_left_trigger_ffb: bool,
    #[packed_field(bits = "13")]
    pub allow_right_trigger_ffb: bool,
    #[packed_field(bits = "14")]
    pub use_rumble_not_haptics: bool,
    #[packed_field(bits = "15")]
    pub enable_rumble_emulation: bool,

    // byte 2
    #[packed_field(bits = "16..=18", endian = "lsb")]
    pub _unused_flags: Integer<u8, packed_bits::Bits<3>>,
    #[packed_field(bits = "19")]
    pub allow_player_indicators: bool,
    #[packed_field(bits = "20")]
    pub reset_lights: bool,
    #[packed_field(bits = "21")]
    pub allow_led_color: bool,
    #[packed_field(bits = "22")]
    pub allow_audio_mute: bool,
    #[packed_field(bits = "23")]
    pub allow_mute_light: bool,

    // byte 3-4
    #[packed_field(bytes = "3")]
    pub rumble_emulation_right: u8,
    #[packed_field(bytes = "4")]
    pub rumble_emulation_left: u8,

    // byte 5-44
    #[packed_field(bytes = "5..=44")]
    pub _audio_and_triggers: [u8; 40],

    // byte 45-47
    #[packed_field(bytes = "45")]
    pub led_red: u8,
    #[packed_field(bytes = "46")]
    pub led_green: u8,
    #[packed_field(bytes = "47")]
    pub led_blue: u8,
}

impl Default for UsbPackedOutputReport {
    fn default() -> Self {
        Self {
            report_id: OUTPUT_REPORT_USB,
            allow_audio_control: false,
            allow_mic_volume: false,
            allow_speaker_volume: false,
            allow_headphone_volume: false,
            allow_left_trigger_ffb: false,
            allow_right_trigger_ffb: false,
            use_rumble_not_haptics: false,
            enable_rumble_emulation: false,
            _unused_flags: Default::default(),
            allow_player_indicators: false,
            reset_lights: false,
            allow_led_color: false,
            allow_audio_mute: false,
            allow_mute_light: false,
            rumble_emulation_right: 0,
            rumble_emulation_left: 0,
            _audio_and_triggers: [0; 40],
            led_red: 0,
            led_green: 0,
            led_blue: 0,
        }
    }
}
