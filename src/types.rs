//! Strongly-typed payloads for style values (widths, sizes, colors).
//!
//! Scripts hand back loosely typed numbers and arrays; everything that leaves
//! the decoder is one of these.

use std::fmt;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

// ============================================================================
// Units and widths
// ============================================================================

/// Unit attached to a numeric style value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    Pixel,
    /// Ground distance; the default for bare numbers in width-like params
    #[default]
    Meter,
    Millisecond,
    Second,
    Percentage,
}

impl Unit {
    /// Suffix used in scene files (`px`, `m`, ...)
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Pixel => "px",
            Unit::Meter => "m",
            Unit::Millisecond => "ms",
            Unit::Second => "s",
            Unit::Percentage => "%",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        match suffix {
            "px" => Some(Unit::Pixel),
            "m" => Some(Unit::Meter),
            "ms" => Some(Unit::Millisecond),
            "s" => Some(Unit::Second),
            "%" => Some(Unit::Percentage),
            _ => None,
        }
    }
}

/// A number with a unit
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Width {
    pub value: f32,
    pub unit: Unit,
}

impl Width {
    /// Width in meters (the unit a bare number means)
    pub fn new(value: f32) -> Self {
        Width { value, unit: Unit::Meter }
    }

    pub fn with_unit(value: f32, unit: Unit) -> Self {
        Width { value, unit }
    }

    pub fn pixels(value: f32) -> Self {
        Width { value, unit: Unit::Pixel }
    }

    /// Create a non-negative width with validation
    pub fn try_non_negative(value: f32, unit: Unit) -> Result<Self, NumericError> {
        if value.is_nan() {
            Err(NumericError::NaN)
        } else if value.is_infinite() {
            Err(NumericError::Infinite)
        } else if value < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Width { value, unit })
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Two-component size (sprites, points). Components default to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeValue {
    pub x: Width,
    pub y: Width,
}

impl Default for SizeValue {
    fn default() -> Self {
        SizeValue {
            x: Width::pixels(0.0),
            y: Width::pixels(0.0),
        }
    }
}

impl fmt::Display for SizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

// ============================================================================
// Colors
// ============================================================================

/// Packed 8-bit RGBA color; in memory order r, g, b, a (so `abgr` reads
/// alpha in the high byte).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Color {
    pub abgr: u32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            abgr: (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24),
        }
    }

    pub const fn from_abgr(abgr: u32) -> Color {
        Color { abgr }
    }

    pub fn r(self) -> u8 {
        (self.abgr & 0xff) as u8
    }

    pub fn g(self) -> u8 {
        ((self.abgr >> 8) & 0xff) as u8
    }

    pub fn b(self) -> u8 {
        ((self.abgr >> 16) & 0xff) as u8
    }

    pub fn a(self) -> u8 {
        (self.abgr >> 24) as u8
    }
}

/// `#rrggbbaa`
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a()
        )
    }
}

/// Floating point color with channels in 0..=1
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorF {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorF {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        ColorF { r, g, b, a }
    }

    /// Clamp each channel to 0..=1 and round to a byte. NaN channels become 0.
    pub fn to_color(self) -> Color {
        fn channel(v: f64) -> u8 {
            if v.is_nan() {
                return 0;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Color::rgba(channel(self.r), channel(self.g), channel(self.b), channel(self.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packs_red_in_low_byte() {
        let c = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.abgr, 0x4433_2211);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn color_display_is_rgba_hex() {
        assert_eq!(Color::rgba(255, 0, 128, 255).to_string(), "#ff0080ff");
    }

    #[test]
    fn colorf_rounds_and_clamps() {
        let c = ColorF::new(1.0, 0.5, -2.0, 3.0).to_color();
        assert_eq!(c, Color::rgba(255, 128, 0, 255));
    }

    #[test]
    fn colorf_nan_channel_is_zero() {
        let c = ColorF::new(f64::NAN, 1.0, 1.0, 1.0).to_color();
        assert_eq!(c.r(), 0);
    }

    #[test]
    fn width_defaults_to_meters() {
        assert_eq!(Width::new(3.0).unit, Unit::Meter);
        assert_eq!(Width::default().unit, Unit::Meter);
        assert_eq!(Width::pixels(2.0).to_string(), "2px");
    }

    #[test]
    fn width_try_non_negative() {
        assert!(Width::try_non_negative(1.0, Unit::Pixel).is_ok());
        assert_eq!(
            Width::try_non_negative(-1.0, Unit::Pixel),
            Err(NumericError::Negative)
        );
        assert_eq!(
            Width::try_non_negative(f32::NAN, Unit::Pixel),
            Err(NumericError::NaN)
        );
        assert_eq!(
            Width::try_non_negative(f32::INFINITY, Unit::Pixel),
            Err(NumericError::Infinite)
        );
    }

    #[test]
    fn unit_suffix_round_trip() {
        for unit in [Unit::Pixel, Unit::Meter, Unit::Millisecond, Unit::Second, Unit::Percentage] {
            assert_eq!(Unit::from_suffix(unit.suffix()), Some(unit));
        }
        assert_eq!(Unit::from_suffix("em"), None);
    }

    #[test]
    fn size_defaults_to_pixels() {
        let size = SizeValue::default();
        assert_eq!(size.x.unit, Unit::Pixel);
        assert_eq!(size.to_string(), "0px, 0px");
    }
}
