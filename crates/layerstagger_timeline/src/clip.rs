// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip definitions.

use crate::effect::Effect;
use crate::group::GroupId;
use crate::keyframe::{self, KeyframeId};
use crate::motion::{Bounds, MotionKeyframe};
use crate::track::TrackId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of a fade envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CurveType {
    /// No ramp
    Hold,
    /// Straight ramp
    #[default]
    Linear,
    /// Fast change at the start
    Fast,
    /// Slow change at the start
    Slow,
    /// S-shaped ramp
    Smooth,
    /// Steep change around the midpoint
    Sharp,
}

/// Fade envelope at one end of a clip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    /// Length in milliseconds
    pub length: f64,
    /// Gain multiplier
    pub gain: f32,
    /// Envelope shape
    pub curve: CurveType,
}

impl Fade {
    /// A fade of the given length and shape at unit gain
    pub fn new(length: f64, curve: CurveType) -> Self {
        Self {
            length,
            gain: 1.0,
            curve,
        }
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(0.0, CurveType::Linear)
    }
}

/// A video clip on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Clip name
    pub name: String,
    /// Owning track, set by the project
    pub track: Option<TrackId>,
    /// Start time in the project, milliseconds
    pub start: f64,
    /// End time in the project, milliseconds
    pub end: f64,
    /// Whether the clip is muted
    pub mute: bool,
    /// Whether the clip is selected
    pub selected: bool,
    /// Fade at the start
    pub fade_in: Fade,
    /// Fade at the end
    pub fade_out: Fade,
    /// Pan/crop keyframes, clip-local time, sorted
    pub motion: Vec<MotionKeyframe>,
    /// Effect chain
    pub effects: Vec<Effect>,
    /// Composite group membership, set by the project
    pub group: Option<GroupId>,
}

impl Clip {
    /// Create a new clip with a single neutral motion keyframe
    pub fn new(name: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            track: None,
            start,
            end,
            mute: false,
            selected: false,
            fade_in: Fade::default(),
            fade_out: Fade::default(),
            motion: vec![MotionKeyframe::new(0.0, Bounds::default())],
            effects: Vec::new(),
            group: None,
        }
    }

    /// Replace the motion keyframes
    pub fn with_motion(mut self, motion: Vec<MotionKeyframe>) -> Self {
        self.motion = motion;
        keyframe::sort_by_time(&mut self.motion);
        self
    }

    /// Add an effect to the chain
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the fades
    pub fn with_fades(mut self, fade_in: Fade, fade_out: Fade) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    /// Clip length in milliseconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// First and last motion keyframe times, when there are at least two
    pub fn motion_span(&self) -> Option<(f64, f64)> {
        match self.motion.as_slice() {
            [first, .., last] => Some((first.time, last.time)),
            _ => None,
        }
    }

    /// Copy of this clip with fresh identifiers, detached from track and group
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = ClipId::new();
        copy.track = None;
        copy.group = None;
        for kf in &mut copy.motion {
            kf.id = KeyframeId::new();
        }
        copy.effects = self.effects.iter().map(Effect::duplicate).collect();
        copy
    }
}
