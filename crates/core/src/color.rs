//! Stroke color for links and particles.
//!
//! The color is configured as a `"r,g,b"` channel string (the form a CSS
//! `rgba(...)` call takes) and serializes back to the same string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NestError;

/// Red, green and blue channels in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorChannels {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorChannels {
    /// Cyan, `"0,255,255"`.
    pub const DEFAULT: ColorChannels = ColorChannels { r: 0, g: 255, b: 255 };
    pub const BLACK: ColorChannels = ColorChannels { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"r,g,b"`; whitespace around each channel is ignored.
    ///
    /// Returns `NestError::InvalidColor` unless there are exactly three
    /// integer channels in 0..=255.
    pub fn parse(s: &str) -> Result<Self, NestError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(NestError::InvalidColor(format!(
                "expected 3 comma-separated channels, got {} in {s:?}",
                parts.len()
            )));
        };
        let channel = |name: &str, v: &str| {
            v.parse::<u8>()
                .map_err(|e| NestError::InvalidColor(format!("invalid {name} channel {v:?}: {e}")))
        };
        Ok(Self {
            r: channel("red", *r)?,
            g: channel("green", *g)?,
            b: channel("blue", *b)?,
        })
    }

    /// CSS color string with the given alpha, clamped to [0, 1].
    ///
    /// ```
    /// # use canvas_nest_core::ColorChannels;
    /// assert_eq!(ColorChannels::DEFAULT.to_css_rgba(0.5), "rgba(0,255,255,0.5)");
    /// ```
    pub fn to_css_rgba(self, alpha: f64) -> String {
        format!("rgba({self},{})", clamp_alpha(alpha))
    }

    /// Straight (non-premultiplied) RGBA8 with alpha quantized from [0, 1].
    pub fn to_rgba8(self, alpha: f64) -> [u8; 4] {
        let a = (clamp_alpha(alpha) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }
}

/// Clamps an alpha to [0, 1]; NaN maps to 0.
pub fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

impl Default for ColorChannels {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ColorChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for ColorChannels {
    type Err = NestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ColorChannels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColorChannels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_string() {
        assert_eq!(ColorChannels::parse("0,255,255").unwrap(), ColorChannels::DEFAULT);
    }

    #[test]
    fn parse_ignores_whitespace() {
        let c = ColorChannels::parse(" 12, 34 ,56 ").unwrap();
        assert_eq!(c, ColorChannels::new(12, 34, 56));
    }

    #[test]
    fn parse_rejects_wrong_channel_count() {
        assert!(matches!(
            ColorChannels::parse("1,2"),
            Err(NestError::InvalidColor(_))
        ));
        assert!(ColorChannels::parse("1,2,3,4").is_err());
        assert!(ColorChannels::parse("").is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert!(ColorChannels::parse("256,0,0").is_err());
        assert!(ColorChannels::parse("-1,0,0").is_err());
        assert!(ColorChannels::parse("red,0,0").is_err());
    }

    #[test]
    fn display_matches_input_form() {
        assert_eq!(ColorChannels::new(1, 22, 133).to_string(), "1,22,133");
    }

    #[test]
    fn css_rgba_clamps_alpha() {
        let c = ColorChannels::new(10, 20, 30);
        assert_eq!(c.to_css_rgba(1.183), "rgba(10,20,30,1)");
        assert_eq!(c.to_css_rgba(-0.5), "rgba(10,20,30,0)");
        assert_eq!(c.to_css_rgba(0.25), "rgba(10,20,30,0.25)");
    }

    #[test]
    fn rgba8_quantizes_alpha() {
        let c = ColorChannels::DEFAULT;
        assert_eq!(c.to_rgba8(1.0), [0, 255, 255, 255]);
        assert_eq!(c.to_rgba8(0.0), [0, 255, 255, 0]);
        assert_eq!(c.to_rgba8(2.0)[3], 255);
        assert_eq!(c.to_rgba8(f64::NAN)[3], 0);
    }

    #[test]
    fn serializes_as_channel_string() {
        let json = serde_json::to_string(&ColorChannels::new(255, 0, 128)).unwrap();
        assert_eq!(json, "\"255,0,128\"");
        let back: ColorChannels = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorChannels::new(255, 0, 128));
    }

    #[test]
    fn deserialize_reports_bad_color() {
        let err = serde_json::from_str::<ColorChannels>("\"1,2\"").unwrap_err();
        assert!(err.to_string().contains("invalid color"), "got: {err}");
    }
}
