// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip motion (pan/crop) and track motion descriptors.

use crate::keyframe::{self, Interpolation, InterpolationMode, KeyframeId, Timed};
use crate::project::FrameSize;
use serde::{Deserialize, Serialize};

/// 2D bounds of a clip's visible region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Center of the region
    pub center: [f64; 2],
    /// Region width
    pub width: f64,
    /// Region height
    pub height: f64,
    /// Rotation in radians
    pub rotation: f64,
}

impl Bounds {
    /// Bounds covering a whole frame of the given size
    pub fn full_frame(width: f64, height: f64) -> Self {
        Self {
            center: [width / 2.0, height / 2.0],
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Linear blend towards `other`
    pub fn lerp(&self, other: &Bounds, t: f64) -> Bounds {
        Bounds {
            center: Interpolation::lerp_array(self.center, other.center, t),
            width: Interpolation::lerp(self.width, other.width, t),
            height: Interpolation::lerp(self.height, other.height, t),
            rotation: Interpolation::lerp(self.rotation, other.rotation, t),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::full_frame(1.0, 1.0)
    }
}

/// A pan/crop keyframe of a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionKeyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Time in milliseconds, local to the clip
    pub time: f64,
    /// Visible region at this keyframe
    pub bounds: Bounds,
    /// Interpolation mode to next keyframe
    pub interpolation: InterpolationMode,
}

impl MotionKeyframe {
    /// Create a new motion keyframe
    pub fn new(time: f64, bounds: Bounds) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            bounds,
            interpolation: InterpolationMode::Linear,
        }
    }
}

impl Timed for MotionKeyframe {
    fn time(&self) -> f64 {
        self.time
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

/// Sample clip motion at a local time
pub fn sample_motion(keys: &[MotionKeyframe], time: f64) -> Option<Bounds> {
    match keyframe::surrounding(keys, time) {
        (None, None) => None,
        (Some(kf), None) | (None, Some(kf)) => Some(kf.bounds),
        (Some(a), Some(b)) => {
            let progress = keyframe::segment_progress(a.time, b.time, time);
            if progress >= 1.0 {
                return Some(b.bounds);
            }
            Some(a.bounds.lerp(&b.bounds, a.interpolation.ease(progress)))
        }
    }
}

/// Make sure a motion keyframe exists at `time`, returning its index.
///
/// A new keyframe holds the bounds sampled at that time.
pub fn insert_motion_keyframe(keys: &mut Vec<MotionKeyframe>, time: f64) -> usize {
    if let Some(idx) = keyframe::index_at(keys, time) {
        return idx;
    }
    let bounds = sample_motion(keys, time).unwrap_or_default();
    keyframe::insert_sorted(keys, MotionKeyframe::new(time, bounds))
}

/// Which side of a compositing boundary a track motion describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionRole {
    /// The track's own motion
    Child,
    /// The motion applied when the track composites its children
    Parent,
}

/// Fields shared by track motion, shadow and glow keyframes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackKeyframeBase {
    /// Time in milliseconds
    pub time: f64,
    /// Curve smoothness
    pub smoothness: f64,
    /// Interpolation mode to next keyframe
    pub interpolation: InterpolationMode,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Rotation around the z axis
    pub rotation_z: f64,
    /// Rotation center, x offset
    pub rotation_offset_x: f64,
    /// Rotation center, y offset
    pub rotation_offset_y: f64,
    /// Orientation around the z axis
    pub orientation_z: f64,
}

/// Extra fields of a track motion keyframe in 3D compositing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Depth3D {
    /// Depth position
    pub z: f64,
    /// Depth extent
    pub depth: f64,
    /// Rotation around the x axis
    pub rotation_x: f64,
    /// Rotation around the y axis
    pub rotation_y: f64,
    /// Rotation center, z offset
    pub rotation_offset_z: f64,
    /// Orientation around the x axis
    pub orientation_x: f64,
    /// Orientation around the y axis
    pub orientation_y: f64,
}

/// A track motion keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackMotionKeyframe {
    /// Shared fields
    pub base: TrackKeyframeBase,
    /// 3D fields
    pub depth: Depth3D,
}

/// A track shadow or glow keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackLightKeyframe {
    /// Shared fields
    pub base: TrackKeyframeBase,
    /// Blur amount
    pub blur: f64,
    /// Intensity
    pub intensity: f64,
    /// Color (RGBA)
    pub color: [f32; 4],
}

impl Timed for TrackMotionKeyframe {
    fn time(&self) -> f64 {
        self.base.time
    }

    fn set_time(&mut self, time: f64) {
        self.base.time = time;
    }
}

impl Timed for TrackLightKeyframe {
    fn time(&self) -> f64 {
        self.base.time
    }

    fn set_time(&mut self, time: f64) {
        self.base.time = time;
    }
}

/// Motion, shadow and glow keyframes of one side of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMotion {
    /// Child or parent side
    pub role: MotionRole,
    /// Project frame the defaults are derived from
    pub frame: FrameSize,
    /// Motion keyframes, never empty
    pub motion: Vec<TrackMotionKeyframe>,
    /// Shadow keyframes, never empty
    pub shadow: Vec<TrackLightKeyframe>,
    /// Glow keyframes, never empty
    pub glow: Vec<TrackLightKeyframe>,
    /// Whether the shadow is rendered
    pub shadow_enabled: bool,
    /// Whether the glow is rendered
    pub glow_enabled: bool,
}

impl TrackMotion {
    /// Create a neutral track motion
    pub fn new(role: MotionRole, frame: FrameSize) -> Self {
        Self {
            role,
            frame,
            motion: vec![Self::default_motion_keyframe(role, frame)],
            shadow: vec![Self::default_shadow_keyframe(role, frame)],
            glow: vec![Self::default_glow_keyframe(role, frame)],
            shadow_enabled: false,
            glow_enabled: false,
        }
    }

    fn default_base(role: MotionRole, frame: FrameSize) -> TrackKeyframeBase {
        // Parent widths are expressed in frame-aspect units
        let width = match role {
            MotionRole::Child => f64::from(frame.width),
            MotionRole::Parent => f64::from(frame.width) / frame.aspect_ratio(),
        };
        TrackKeyframeBase {
            time: 0.0,
            smoothness: 0.0,
            interpolation: InterpolationMode::Linear,
            x: 0.0,
            y: 0.0,
            width,
            height: f64::from(frame.height),
            rotation_z: 0.0,
            rotation_offset_x: 0.0,
            rotation_offset_y: 0.0,
            orientation_z: 0.0,
        }
    }

    /// The neutral motion keyframe for a role
    pub fn default_motion_keyframe(role: MotionRole, frame: FrameSize) -> TrackMotionKeyframe {
        TrackMotionKeyframe {
            base: Self::default_base(role, frame),
            depth: Depth3D::default(),
        }
    }

    /// The neutral shadow keyframe for a role
    pub fn default_shadow_keyframe(role: MotionRole, frame: FrameSize) -> TrackLightKeyframe {
        TrackLightKeyframe {
            base: Self::default_base(role, frame),
            blur: 0.2,
            intensity: 0.5,
            color: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// The neutral glow keyframe for a role
    pub fn default_glow_keyframe(role: MotionRole, frame: FrameSize) -> TrackLightKeyframe {
        TrackLightKeyframe {
            base: Self::default_base(role, frame),
            blur: 0.2,
            intensity: 0.6,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Whether the motion differs from the neutral state
    pub fn has_motion_data(&self) -> bool {
        has_data(&self.motion, &Self::default_motion_keyframe(self.role, self.frame))
    }

    /// Whether the shadow differs from the neutral state
    pub fn has_shadow_data(&self) -> bool {
        has_data(&self.shadow, &Self::default_shadow_keyframe(self.role, self.frame))
    }

    /// Whether the glow differs from the neutral state
    pub fn has_glow_data(&self) -> bool {
        has_data(&self.glow, &Self::default_glow_keyframe(self.role, self.frame))
    }

    /// Get or create the motion keyframe at `time`
    pub fn insert_motion_keyframe(&mut self, time: f64) -> &mut TrackMotionKeyframe {
        let neutral = Self::default_motion_keyframe(self.role, self.frame);
        let idx = insert_at(&mut self.motion, time, neutral);
        &mut self.motion[idx]
    }

    /// Get or create the shadow keyframe at `time`
    pub fn insert_shadow_keyframe(&mut self, time: f64) -> &mut TrackLightKeyframe {
        let neutral = Self::default_shadow_keyframe(self.role, self.frame);
        let idx = insert_at(&mut self.shadow, time, neutral);
        &mut self.shadow[idx]
    }

    /// Get or create the glow keyframe at `time`
    pub fn insert_glow_keyframe(&mut self, time: f64) -> &mut TrackLightKeyframe {
        let neutral = Self::default_glow_keyframe(self.role, self.frame);
        let idx = insert_at(&mut self.glow, time, neutral);
        &mut self.glow[idx]
    }

    /// Drop every motion keyframe but the first
    pub fn clear_motion(&mut self) {
        self.motion.truncate(1);
    }

    /// Drop every shadow keyframe but the first
    pub fn clear_shadow(&mut self) {
        self.shadow.truncate(1);
    }

    /// Drop every glow keyframe but the first
    pub fn clear_glow(&mut self) {
        self.glow.truncate(1);
    }
}

fn has_data<K: PartialEq>(keys: &[K], neutral: &K) -> bool {
    match keys {
        [] => false,
        [only] => only != neutral,
        _ => true,
    }
}

fn insert_at<K: Timed + Clone>(keys: &mut Vec<K>, time: f64, neutral: K) -> usize {
    if let Some(idx) = keyframe::index_at(keys, time) {
        return idx;
    }
    // Start from the keyframe in effect at that time
    let mut key = match keyframe::surrounding(keys, time) {
        (Some(kf), _) | (None, Some(kf)) => kf.clone(),
        (None, None) => neutral,
    };
    key.set_time(time);
    keyframe::insert_sorted(keys, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameSize {
        FrameSize::new(1920, 1080)
    }

    #[test]
    fn test_sample_motion_between_keyframes() {
        let keys = vec![
            MotionKeyframe::new(0.0, Bounds::full_frame(100.0, 100.0)),
            MotionKeyframe::new(1000.0, Bounds::full_frame(200.0, 200.0)),
        ];
        let bounds = sample_motion(&keys, 500.0).unwrap();
        assert!((bounds.width - 150.0).abs() < 1e-9);
        assert!((bounds.center[0] - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_insert_motion_keyframe_reuses_existing() {
        let mut keys = vec![
            MotionKeyframe::new(0.0, Bounds::default()),
            MotionKeyframe::new(300.0, Bounds::default()),
        ];
        assert_eq!(insert_motion_keyframe(&mut keys, 300.0), 1);
        assert_eq!(insert_motion_keyframe(&mut keys, 150.0), 1);
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_neutral_motion_has_no_data() {
        let mut motion = TrackMotion::new(MotionRole::Child, frame());
        assert!(!motion.has_motion_data());
        assert!(!motion.has_shadow_data());

        motion.insert_motion_keyframe(500.0).base.x = 40.0;
        assert!(motion.has_motion_data());

        motion.clear_motion();
        assert_eq!(motion.motion.len(), 1);
        assert!(!motion.has_motion_data());
    }

    #[test]
    fn test_parent_default_width_uses_frame_aspect() {
        let parent = TrackMotion::default_motion_keyframe(MotionRole::Parent, frame());
        let child = TrackMotion::default_motion_keyframe(MotionRole::Child, frame());
        assert!((child.base.width / parent.base.width - frame().aspect_ratio()).abs() < 1e-9);
    }
}
