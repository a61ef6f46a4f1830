//! Nest configuration: overlay styling, particle count and the tuning
//! constants of the link renderer.
//!
//! Options arrive as a JSON object with camelCase keys and are merged over
//! the defaults key by key. Two merge paths exist:
//! - [`NestConfig::from_json`] is lenient: a key with the wrong type keeps
//!   its default (what a browser page passing a loose object expects).
//! - `serde` deserialization is strict about types but still fills missing
//!   keys from [`Default`].
//!
//! Either way, call [`NestConfig::validate`] before attaching.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::ColorChannels;
use crate::error::NestError;
use crate::params::{param_f64, param_i32, param_str, param_usize};

/// Stacking order of the overlay relative to the host's content.
pub const DEFAULT_Z_INDEX: i32 = -1;
/// Overlay opacity.
pub const DEFAULT_OPACITY: f64 = 0.5;
/// Fill of the particle squares. A 2D canvas context fills black unless told
/// otherwise.
pub const DEFAULT_POINT_COLOR: ColorChannels = ColorChannels::BLACK;
/// Number of ordinary particles.
pub const DEFAULT_COUNT: usize = 100;
/// Squared link radius of an ordinary point (about 77 units).
pub const DEFAULT_POINT_LINK_RADIUS_SQ: f64 = 6000.0;
/// Squared link radius of the pointer point (100 units).
pub const DEFAULT_POINTER_LINK_RADIUS_SQ: f64 = 10000.0;
/// Fraction of the offset to the pointer removed per tick in the outer band.
pub const DEFAULT_ATTRACTION: f64 = 0.02;
/// Added to every link's strength to form its alpha.
pub const DEFAULT_ALPHA_FLOOR: f64 = 0.2;
/// Side length of the square painted for each particle.
pub const DEFAULT_POINT_SIZE: f64 = 2.0;
/// Multiplier from link strength in [0, 1) to stroke width.
pub const DEFAULT_LINE_WIDTH_SCALE: f64 = 1.0;
/// Bound on each initial velocity component.
pub const DEFAULT_MAX_SPEED: f64 = 1.0;

/// Options for one attached nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NestConfig {
    pub z_index: i32,
    pub opacity: f64,
    pub color: ColorChannels,
    pub point_color: ColorChannels,
    pub count: usize,
    pub point_link_radius_sq: f64,
    pub pointer_link_radius_sq: f64,
    pub attraction: f64,
    pub alpha_floor: f64,
    pub point_size: f64,
    pub line_width_scale: f64,
    pub max_speed: f64,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            z_index: DEFAULT_Z_INDEX,
            opacity: DEFAULT_OPACITY,
            color: ColorChannels::DEFAULT,
            point_color: DEFAULT_POINT_COLOR,
            count: DEFAULT_COUNT,
            point_link_radius_sq: DEFAULT_POINT_LINK_RADIUS_SQ,
            pointer_link_radius_sq: DEFAULT_POINTER_LINK_RADIUS_SQ,
            attraction: DEFAULT_ATTRACTION,
            alpha_floor: DEFAULT_ALPHA_FLOOR,
            point_size: DEFAULT_POINT_SIZE,
            line_width_scale: DEFAULT_LINE_WIDTH_SCALE,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }
}

impl NestConfig {
    /// Merges a loosely typed options object over the defaults.
    ///
    /// Keys with the wrong JSON type keep their default. A `color` or
    /// `pointColor` string that is present but malformed is an error.
    pub fn from_json(options: &Value) -> Result<Self, NestError> {
        let d = Self::default();
        let color = match param_str(options, "color") {
            Some(s) => ColorChannels::parse(s)?,
            None => d.color,
        };
        let point_color = match param_str(options, "pointColor") {
            Some(s) => ColorChannels::parse(s)?,
            None => d.point_color,
        };
        Ok(Self {
            z_index: param_i32(options, "zIndex", d.z_index),
            opacity: param_f64(options, "opacity", d.opacity),
            color,
            point_color,
            count: param_usize(options, "count", d.count),
            point_link_radius_sq: param_f64(options, "pointLinkRadiusSq", d.point_link_radius_sq),
            pointer_link_radius_sq: param_f64(
                options,
                "pointerLinkRadiusSq",
                d.pointer_link_radius_sq,
            ),
            attraction: param_f64(options, "attraction", d.attraction),
            alpha_floor: param_f64(options, "alphaFloor", d.alpha_floor),
            point_size: param_f64(options, "pointSize", d.point_size),
            line_width_scale: param_f64(options, "lineWidthScale", d.line_width_scale),
            max_speed: param_f64(options, "maxSpeed", d.max_speed),
        })
    }

    /// Checks every numeric option against its accepted range.
    pub fn validate(&self) -> Result<(), NestError> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(NestError::InvalidConfig(format!(
                "opacity {} outside [0, 1]",
                self.opacity
            )));
        }
        for (name, value) in [
            ("pointLinkRadiusSq", self.point_link_radius_sq),
            ("pointerLinkRadiusSq", self.pointer_link_radius_sq),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(NestError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("attraction", self.attraction),
            ("alphaFloor", self.alpha_floor),
            ("pointSize", self.point_size),
            ("lineWidthScale", self.line_width_scale),
            ("maxSpeed", self.max_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(NestError::InvalidConfig(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Current values keyed the way [`NestConfig::from_json`] reads them.
    pub fn to_json(&self) -> Value {
        json!({
            "zIndex": self.z_index,
            "opacity": self.opacity,
            "color": self.color.to_string(),
            "pointColor": self.point_color.to_string(),
            "count": self.count,
            "pointLinkRadiusSq": self.point_link_radius_sq,
            "pointerLinkRadiusSq": self.pointer_link_radius_sq,
            "attraction": self.attraction,
            "alphaFloor": self.alpha_floor,
            "pointSize": self.point_size,
            "lineWidthScale": self.line_width_scale,
            "maxSpeed": self.max_speed,
        })
    }

    /// Type, default, range and description of every option.
    pub fn param_schema() -> Value {
        json!({
            "zIndex": {
                "type": "integer",
                "default": DEFAULT_Z_INDEX,
                "description": "Stacking order of the overlay canvas"
            },
            "opacity": {
                "type": "number",
                "default": DEFAULT_OPACITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Overlay opacity"
            },
            "color": {
                "type": "string",
                "default": ColorChannels::DEFAULT.to_string(),
                "description": "Stroke color as \"r,g,b\" channels"
            },
            "pointColor": {
                "type": "string",
                "default": DEFAULT_POINT_COLOR.to_string(),
                "description": "Fill of the particle squares as \"r,g,b\" channels"
            },
            "count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 0,
                "description": "Number of particles"
            },
            "pointLinkRadiusSq": {
                "type": "number",
                "default": DEFAULT_POINT_LINK_RADIUS_SQ,
                "description": "Squared distance under which two particles are linked"
            },
            "pointerLinkRadiusSq": {
                "type": "number",
                "default": DEFAULT_POINTER_LINK_RADIUS_SQ,
                "description": "Squared distance under which a particle links to the pointer"
            },
            "attraction": {
                "type": "number",
                "default": DEFAULT_ATTRACTION,
                "min": 0.0,
                "description": "Pull toward the pointer in the outer half of its radius"
            },
            "alphaFloor": {
                "type": "number",
                "default": DEFAULT_ALPHA_FLOOR,
                "min": 0.0,
                "description": "Alpha added to every link"
            },
            "pointSize": {
                "type": "number",
                "default": DEFAULT_POINT_SIZE,
                "min": 0.0,
                "description": "Side of the square painted per particle"
            },
            "lineWidthScale": {
                "type": "number",
                "default": DEFAULT_LINE_WIDTH_SCALE,
                "min": 0.0,
                "description": "Stroke width of a link at full strength"
            },
            "maxSpeed": {
                "type": "number",
                "default": DEFAULT_MAX_SPEED,
                "min": 0.0,
                "description": "Bound on each initial velocity component"
            }
        })
    }
}
