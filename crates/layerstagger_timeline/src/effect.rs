// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effects attached to clips and tracks.

use crate::keyframe::{self, Keyframe};
use crate::parameter::{Parameter, ParameterValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub Uuid);

impl EffectId {
    /// Create a new random effect ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EffectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of the plugin an effect instance runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlugIn {
    /// Display name
    pub name: String,
    /// Stable plugin identifier
    pub unique_id: String,
    /// Whether the plugin exposes typed parameters
    pub typed: bool,
}

impl PlugIn {
    /// A keyframe-only plugin
    pub fn simple(name: impl Into<String>, unique_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
            typed: false,
        }
    }

    /// A plugin with typed parameters
    pub fn typed(name: impl Into<String>, unique_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
            typed: true,
        }
    }
}

/// An effect instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Unique effect ID
    pub id: EffectId,
    /// Plugin identity
    pub plugin: PlugIn,
    /// Whether the effect is enabled
    pub enabled: bool,
    /// Whether the effect is bypassed
    pub bypass: bool,
    /// Whether a track effect renders after its children are composited
    pub apply_after_composite: bool,
    /// Keyframes of a simple effect, sorted by time
    pub keyframes: Vec<Keyframe>,
    /// Parameters of a typed effect
    pub parameters: Vec<Parameter>,
}

impl Effect {
    /// Create an effect for a plugin
    pub fn new(plugin: PlugIn) -> Self {
        Self {
            id: EffectId::new(),
            plugin,
            enabled: true,
            bypass: false,
            apply_after_composite: false,
            keyframes: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Set the simple-effect keyframes
    pub fn with_keyframes(mut self, keyframes: Vec<Keyframe>) -> Self {
        self.keyframes = keyframes;
        keyframe::sort_by_time(&mut self.keyframes);
        self
    }

    /// Add a typed parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Enabled and not bypassed
    pub fn is_active(&self) -> bool {
        self.enabled && !self.bypass
    }

    /// Whether the effect exposes typed parameters
    pub fn is_typed(&self) -> bool {
        self.plugin.typed
    }

    /// Get a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Enabled, animated parameters
    pub fn animated_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.enabled && p.is_animated())
    }

    /// Get keyframe count of a simple effect
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Simple-effect state at a clip-local time
    pub fn sample_at(&self, time: f64) -> Option<ParameterValue> {
        keyframe::evaluate(&self.keyframes, time)
    }

    /// Copy of this effect with fresh identifiers
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = EffectId::new();
        for kf in copy
            .keyframes
            .iter_mut()
            .chain(copy.parameters.iter_mut().flat_map(|p| p.keyframes.iter_mut()))
        {
            kf.id = keyframe::KeyframeId::new();
        }
        copy
    }
}
