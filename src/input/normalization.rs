//! Conversion between raw register values and normalized axis values.
//!
//! Signed and midpoint modes normalize into `-1.0..=1.0`, unsigned modes into
//! `0.0..=1.0`. The generic inverse truncates; the report-packing helper
//! [denormalize_signed_value] rounds and is kept separate on purpose.
use serde::{Deserialize, Serialize};

const I32_MAX: f64 = i32::MAX as f64;
const U32_MAX: f64 = u32::MAX as f64;
const M32_MID: i64 = 1 << 31;

/// Raw integer encoding of an axis value.
///
/// `U` is unsigned, `I` is two's complement and `M` is unsigned with the
/// neutral point in the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum NormalizationMode {
    U8,
    I8,
    M8,
    U16,
    I16,
    M16,
    U32,
    I32,
    M32,
}

impl NormalizationMode {
    /// Returns true if values in this mode normalize into `-1.0..=1.0`
    pub fn is_signed(&self) -> bool {
        !matches!(self, Self::U8 | Self::U16 | Self::U32)
    }

    /// Smallest and largest raw values [denormalize] can produce
    pub fn raw_bounds(&self) -> (i64, i64) {
        match self {
            Self::U8 | Self::M8 => (0, u8::MAX as i64),
            Self::I8 => (i8::MIN as i64, i8::MAX as i64),
            Self::U16 | Self::M16 => (0, u16::MAX as i64),
            Self::I16 => (i16::MIN as i64, i16::MAX as i64),
            Self::U32 | Self::M32 => (0, u32::MAX as i64),
            Self::I32 => (i32::MIN as i64, i32::MAX as i64),
        }
    }

    /// Clamp a normalized value into the domain of this mode
    pub fn clamp(&self, value: f64) -> f64 {
        if self.is_signed() {
            value.clamp(-1.0, 1.0)
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}

/// Normalize the given raw value. The raw value is first narrowed to the
/// width of the mode, so both `0xFF` and `-1` are accepted for [NormalizationMode::I8].
pub fn normalize(raw: i64, mode: NormalizationMode) -> f64 {
    let value = match mode {
        NormalizationMode::U8 => (raw & 0xFF) as f64 / u8::MAX as f64,
        NormalizationMode::I8 => (raw as i8) as f64 / i8::MAX as f64,
        NormalizationMode::M8 => ((raw & 0xFF) - 128) as f64 / 128.0,
        NormalizationMode::U16 => (raw & 0xFFFF) as f64 / u16::MAX as f64,
        NormalizationMode::I16 => (raw as i16) as f64 / i16::MAX as f64,
        NormalizationMode::M16 => ((raw & 0xFFFF) - 32768) as f64 / i16::MAX as f64,
        NormalizationMode::U32 => (raw as u32) as f64 / U32_MAX,
        NormalizationMode::I32 => (raw as i32) as f64 / I32_MAX,
        NormalizationMode::M32 => ((raw as u32) as i64 - M32_MID) as f64 / I32_MAX,
    };
    mode.clamp(value)
}

/// Convert a normalized value back into a raw value, truncating towards zero.
/// Signed modes return the sign-extended value, every other mode returns the
/// unsigned register value.
pub fn denormalize(value: f64, mode: NormalizationMode) -> i64 {
    let value = mode.clamp(value);
    let raw = match mode {
        NormalizationMode::U8 => (value * u8::MAX as f64) as i64,
        NormalizationMode::I8 => (value * i8::MAX as f64) as i64,
        NormalizationMode::M8 => (value * 128.0) as i64 + 128,
        NormalizationMode::U16 => (value * u16::MAX as f64) as i64,
        NormalizationMode::I16 => (value * i16::MAX as f64) as i64,
        NormalizationMode::M16 => (value * i16::MAX as f64) as i64 + 32768,
        NormalizationMode::U32 => (value * U32_MAX) as i64,
        NormalizationMode::I32 => (value * I32_MAX) as i64,
        NormalizationMode::M32 => (value * I32_MAX) as i64 + M32_MID,
    };
    let (min, max) = mode.raw_bounds();
    raw.clamp(min, max)
}

/// Re-express a normalized value as if it had been read with another mode.
pub fn convert(value: f64, from: NormalizationMode, to: NormalizationMode) -> f64 {
    normalize(denormalize(value, from), to)
}

/// Convert the given normalized value between -1.0 - 1.0 to the real value
/// based on the given minimum and maximum axis range. The positive and
/// negative halves are scaled separately around the midpoint and the result
/// is rounded, which is what DualSense stick bytes expect.
pub fn denormalize_signed_value(normal_value: f64, min: f64, max: f64) -> u8 {
    let normal_value = normal_value.clamp(-1.0, 1.0);
    let mid = (max + min) / 2.0;
    let value = if normal_value >= 0.0 {
        let maximum = max - mid;
        normal_value * maximum + mid
    } else {
        let minimum = min - mid;
        normal_value.abs() * minimum + mid
    };
    value.round().clamp(u8::MIN as f64, u8::MAX as f64) as u8
}

/// Kernel reported range of an absolute axis. Takes precedence over the
/// [NormalizationMode] of a mapping when the raw range is not byte or word
/// shaped (e.g. 10-bit triggers or -1..1 hats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Ranges that dip below zero normalize into `-1.0..=1.0`
    pub fn is_signed(&self) -> bool {
        self.min < 0
    }

    pub fn normalize(&self, raw: i32) -> f64 {
        let span = (self.max as f64) - (self.min as f64);
        if span <= 0.0 {
            return 0.0;
        }
        let raw = raw.clamp(self.min, self.max) as f64;
        let unit = (raw - self.min as f64) / span;
        if self.is_signed() {
            unit * 2.0 - 1.0
        } else {
            unit
        }
    }

    pub fn denormalize(&self, value: f64) -> i32 {
        let span = (self.max as f64) - (self.min as f64);
        let unit = if self.is_signed() {
            (value.clamp(-1.0, 1.0) + 1.0) / 2.0
        } else {
            value.clamp(0.0, 1.0)
        };
        let raw = (unit * span + self.min as f64) as i64;
        raw.clamp(self.min as i64, self.max as i64) as i32
    }
}
