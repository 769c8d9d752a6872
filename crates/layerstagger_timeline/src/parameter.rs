// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed effect parameters.
//!
//! Every parameter kind a typed plugin can expose is one variant of
//! [`ParameterValue`]. Sampling and freezing go through [`Parameter`] so
//! callers never branch on the kind themselves.

use crate::keyframe::{self, Interpolation, Keyframe};
use serde::{Deserialize, Serialize};

/// Kind tag of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// On/off switch
    Boolean,
    /// Index into a list of options
    Choice,
    /// Floating point scalar
    Double,
    /// Integer scalar
    Integer,
    /// 2D floating point vector
    Double2D,
    /// 3D floating point vector
    Double3D,
    /// 2D integer vector
    Integer2D,
    /// 3D integer vector
    Integer3D,
    /// RGB color
    Rgb,
    /// RGBA color
    Rgba,
    /// Free text
    String,
    /// Plugin-defined opaque data
    Custom,
}

impl ParameterKind {
    /// Whether values of this kind blend between keyframes
    pub fn is_interpolated(&self) -> bool {
        !matches!(self, Self::Boolean | Self::Choice | Self::String | Self::Custom)
    }
}

/// Value of a parameter at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// Boolean value
    Boolean(bool),
    /// Choice index
    Choice(u32),
    /// Float value
    Double(f64),
    /// Integer value
    Integer(i32),
    /// 2D vector
    Double2D([f64; 2]),
    /// 3D vector
    Double3D([f64; 3]),
    /// 2D integer vector
    Integer2D([i32; 2]),
    /// 3D integer vector
    Integer3D([i32; 3]),
    /// Color (RGB)
    Rgb([f32; 3]),
    /// Color (RGBA)
    Rgba([f32; 4]),
    /// Text
    String(String),
    /// Opaque plugin data
    Custom(String),
}

impl ParameterValue {
    /// Kind tag of this value
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Boolean(_) => ParameterKind::Boolean,
            Self::Choice(_) => ParameterKind::Choice,
            Self::Double(_) => ParameterKind::Double,
            Self::Integer(_) => ParameterKind::Integer,
            Self::Double2D(_) => ParameterKind::Double2D,
            Self::Double3D(_) => ParameterKind::Double3D,
            Self::Integer2D(_) => ParameterKind::Integer2D,
            Self::Integer3D(_) => ParameterKind::Integer3D,
            Self::Rgb(_) => ParameterKind::Rgb,
            Self::Rgba(_) => ParameterKind::Rgba,
            Self::String(_) => ParameterKind::String,
            Self::Custom(_) => ParameterKind::Custom,
        }
    }

    /// Interpolate between two values of the same kind.
    ///
    /// Discrete kinds hold `self`. Returns `None` for mismatched kinds.
    pub fn interpolate(&self, other: &ParameterValue, t: f64) -> Option<ParameterValue> {
        let value = match (self, other) {
            (Self::Double(a), Self::Double(b)) => Self::Double(Interpolation::lerp(*a, *b, t)),
            (Self::Integer(a), Self::Integer(b)) => Self::Integer(
                Interpolation::lerp(f64::from(*a), f64::from(*b), t).round() as i32,
            ),
            (Self::Double2D(a), Self::Double2D(b)) => {
                Self::Double2D(Interpolation::lerp_array(*a, *b, t))
            }
            (Self::Double3D(a), Self::Double3D(b)) => {
                Self::Double3D(Interpolation::lerp_array(*a, *b, t))
            }
            (Self::Integer2D(a), Self::Integer2D(b)) => {
                Self::Integer2D(Interpolation::lerp_int(*a, *b, t))
            }
            (Self::Integer3D(a), Self::Integer3D(b)) => {
                Self::Integer3D(Interpolation::lerp_int(*a, *b, t))
            }
            (Self::Rgb(a), Self::Rgb(b)) => Self::Rgb(Interpolation::lerp_color(*a, *b, t)),
            (Self::Rgba(a), Self::Rgba(b)) => Self::Rgba(Interpolation::lerp_color(*a, *b, t)),
            (Self::Boolean(_), Self::Boolean(_))
            | (Self::Choice(_), Self::Choice(_))
            | (Self::String(_), Self::String(_))
            | (Self::Custom(_), Self::Custom(_)) => self.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Get as float if possible
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }
}

/// An animatable property of a typed effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, unique within its effect
    pub name: String,
    /// Whether the parameter is enabled
    pub enabled: bool,
    /// Whether the keyframes drive the value
    pub animated: bool,
    /// Constant value used while not animated
    pub value: ParameterValue,
    /// Keyframes, sorted by time
    pub keyframes: Vec<Keyframe>,
}

impl Parameter {
    /// Create a constant parameter
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            animated: false,
            value,
            keyframes: Vec::new(),
        }
    }

    /// Animate the parameter with the given keyframes
    pub fn with_keyframes(mut self, keyframes: Vec<Keyframe>) -> Self {
        self.keyframes = keyframes;
        keyframe::sort_by_time(&mut self.keyframes);
        self.animated = true;
        self
    }

    /// Kind of this parameter
    pub fn kind(&self) -> ParameterKind {
        self.value.kind()
    }

    /// Whether the parameter is animated
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Times of all keyframes
    pub fn keyframe_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.keyframes.iter().map(|k| k.time)
    }

    /// Value at a clip-local time
    pub fn sample_at(&self, time: f64) -> ParameterValue {
        if !self.animated {
            return self.value.clone();
        }
        keyframe::evaluate(&self.keyframes, time).unwrap_or_else(|| self.value.clone())
    }

    /// Replace the animation with a single constant value
    pub fn freeze(&mut self, value: ParameterValue) {
        self.animated = false;
        self.keyframes = vec![Keyframe::new(0.0, value.clone())];
        self.value = value;
    }
}
