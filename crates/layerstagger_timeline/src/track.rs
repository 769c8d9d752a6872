// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions.

use crate::clip::ClipId;
use crate::effect::Effect;
use crate::motion::{MotionRole, TrackMotion};
use crate::project::FrameSize;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackType {
    /// Video clips
    Video,
    /// Audio clips
    Audio,
}

/// How a track blends onto the tracks below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CompositeMode {
    /// Alpha-over
    #[default]
    SrcAlpha,
    /// Alpha-over in 3D space
    SrcAlpha3D,
    /// Additive
    Add,
    /// Subtractive
    Subtract,
    /// Multiply
    Multiply,
    /// Screen
    Screen,
    /// Overlay
    Overlay,
}

impl CompositeMode {
    /// Whether the mode composites in 3D space
    pub fn is_3d(&self) -> bool {
        matches!(self, Self::SrcAlpha3D)
    }
}

/// A track in the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Track type
    pub track_type: TrackType,
    /// Clips on this track, in time order
    pub clips: Vec<ClipId>,
    /// How many compositing levels deep the track sits
    pub nesting_level: u32,
    /// Blend mode of the track itself
    pub composite_mode: CompositeMode,
    /// Blend mode used when compositing child tracks
    pub parent_composite_mode: CompositeMode,
    /// The track's own motion
    pub motion: TrackMotion,
    /// Motion applied to the composited children
    pub parent_motion: TrackMotion,
    /// Track-level effect chain
    pub effects: Vec<Effect>,
    /// Whether the track is muted
    pub muted: bool,
    /// Whether the track is soloed
    pub solo: bool,
    /// Whether the track is selected
    pub selected: bool,
}

impl Track {
    /// Create a new track
    pub fn new(name: impl Into<String>, track_type: TrackType, frame: FrameSize) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            track_type,
            clips: Vec::new(),
            nesting_level: 0,
            composite_mode: CompositeMode::default(),
            parent_composite_mode: CompositeMode::default(),
            motion: TrackMotion::new(MotionRole::Child, frame),
            parent_motion: TrackMotion::new(MotionRole::Parent, frame),
            effects: Vec::new(),
            muted: false,
            solo: false,
            selected: false,
        }
    }

    /// Create a new video track
    pub fn video(name: impl Into<String>, frame: FrameSize) -> Self {
        Self::new(name, TrackType::Video, frame)
    }

    /// Set nesting level
    pub fn with_nesting(mut self, level: u32) -> Self {
        self.nesting_level = level;
        self
    }

    /// Whether this is a video track
    pub fn is_video(&self) -> bool {
        self.track_type == TrackType::Video
    }

    /// Get clip count
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Track motion of the given side
    pub fn motion_for(&self, role: MotionRole) -> &TrackMotion {
        match role {
            MotionRole::Child => &self.motion,
            MotionRole::Parent => &self.parent_motion,
        }
    }

    /// Mutable track motion of the given side
    pub fn motion_for_mut(&mut self, role: MotionRole) -> &mut TrackMotion {
        match role {
            MotionRole::Child => &mut self.motion,
            MotionRole::Parent => &mut self.parent_motion,
        }
    }
}
