// SPDX-License-Identifier: MIT OR Apache-2.0
//! Moving track motion between the child and parent sides of tracks.

use crate::error::Result;
use layerstagger_timeline::{
    CompositeMode, MotionRole, Project, Track, TrackId, TrackKeyframeBase, TrackLightKeyframe,
    TrackMotion, TrackMotionKeyframe,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which descriptors a transfer reads from and writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Source child motion to target child motion
    ChildToChild,
    /// Source child motion to target parent motion
    ChildToParent,
    /// Source parent motion to target child motion
    ParentToChild,
    /// Source parent motion to target parent motion
    ParentToParent,
}

impl TransferDirection {
    /// Source and target sides
    pub fn roles(self) -> (MotionRole, MotionRole) {
        match self {
            Self::ChildToChild => (MotionRole::Child, MotionRole::Child),
            Self::ChildToParent => (MotionRole::Child, MotionRole::Parent),
            Self::ParentToChild => (MotionRole::Parent, MotionRole::Child),
            Self::ParentToParent => (MotionRole::Parent, MotionRole::Parent),
        }
    }

    /// Width on the target side; parent widths are in frame-aspect units
    pub fn convert_width(self, width: f64, aspect: f64) -> f64 {
        match self {
            Self::ChildToParent => width / aspect,
            Self::ParentToChild => width * aspect,
            Self::ChildToChild | Self::ParentToParent => width,
        }
    }
}

/// Which kinds of keyframes a transfer moved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSummary {
    /// Motion keyframes moved
    pub motion: bool,
    /// Shadow keyframes moved
    pub shadow: bool,
    /// Glow keyframes moved
    pub glow: bool,
}

impl TransferSummary {
    /// Whether anything moved
    pub fn any(&self) -> bool {
        self.motion || self.shadow || self.glow
    }
}

fn copy_base(
    source: &TrackKeyframeBase,
    target: &mut TrackKeyframeBase,
    direction: TransferDirection,
    aspect: f64,
) {
    *target = TrackKeyframeBase {
        width: direction.convert_width(source.width, aspect),
        ..*source
    };
}

fn copy_motion_keyframe(
    source: &TrackMotionKeyframe,
    target: &mut TrackMotionKeyframe,
    direction: TransferDirection,
    aspect: f64,
    is_3d: bool,
) {
    copy_base(&source.base, &mut target.base, direction, aspect);
    if is_3d {
        target.depth = source.depth;
    }
}

fn copy_light_keyframe(
    source: &TrackLightKeyframe,
    target: &mut TrackLightKeyframe,
    direction: TransferDirection,
    aspect: f64,
) {
    copy_base(&source.base, &mut target.base, direction, aspect);
    target.blur = source.blur;
    target.intensity = source.intensity;
    target.color = source.color;
}

/// Neutral descriptor a cleared source is reset to.
///
/// Built from a detached 3D compositing track that never enters the project.
fn baseline(role: MotionRole, project: &Project) -> TrackMotion {
    let mut parent = Track::video("baseline", project.frame);
    parent.composite_mode = CompositeMode::SrcAlpha3D;
    parent.parent_composite_mode = CompositeMode::SrcAlpha3D;
    parent.motion_for(role).clone()
}

/// Move motion, shadow and glow keyframes from one track side to another.
///
/// Each kind moves only when the source carries data and the target does not,
/// so repeating a transfer is a no-op. Shadow and glow stay put on 3D tracks.
pub fn transfer_track_motion(
    project: &mut Project,
    source: TrackId,
    target: TrackId,
    direction: TransferDirection,
) -> Result<TransferSummary> {
    let (source_role, target_role) = direction.roles();
    let aspect = project.aspect_ratio();

    let (from, is_3d) = {
        let track = project.require_track(source)?;
        (track.motion_for(source_role).clone(), track.composite_mode.is_3d())
    };
    let to = project.require_track(target)?.motion_for(target_role);

    let summary = TransferSummary {
        motion: from.has_motion_data() && !to.has_motion_data(),
        shadow: !is_3d && from.shadow_enabled && from.has_shadow_data() && !to.has_shadow_data(),
        glow: !is_3d && from.glow_enabled && from.has_glow_data() && !to.has_glow_data(),
    };
    if !summary.any() {
        return Ok(summary);
    }

    let to = project.require_track_mut(target)?.motion_for_mut(target_role);
    if summary.motion {
        for (i, key) in from.motion.iter().enumerate() {
            let slot = if i == 0 {
                to.motion.first_mut()
            } else {
                Some(to.insert_motion_keyframe(key.base.time))
            };
            if let Some(slot) = slot {
                copy_motion_keyframe(key, slot, direction, aspect, is_3d);
            }
        }
    }
    if summary.shadow {
        for (i, key) in from.shadow.iter().enumerate() {
            let slot = if i == 0 {
                to.shadow.first_mut()
            } else {
                Some(to.insert_shadow_keyframe(key.base.time))
            };
            if let Some(slot) = slot {
                copy_light_keyframe(key, slot, direction, aspect);
            }
        }
        to.shadow_enabled = true;
    }
    if summary.glow {
        for (i, key) in from.glow.iter().enumerate() {
            let slot = if i == 0 {
                to.glow.first_mut()
            } else {
                Some(to.insert_glow_keyframe(key.base.time))
            };
            if let Some(slot) = slot {
                copy_light_keyframe(key, slot, direction, aspect);
            }
        }
        to.glow_enabled = true;
    }

    let neutral = baseline(source_role, project);
    let from = project.require_track_mut(source)?.motion_for_mut(source_role);
    let reset = TransferDirection::ChildToChild;
    if summary.motion {
        from.clear_motion();
        if let (Some(base), Some(slot)) = (neutral.motion.first(), from.motion.first_mut()) {
            copy_motion_keyframe(base, slot, reset, aspect, is_3d);
        }
    }
    if summary.shadow {
        from.clear_shadow();
        if let (Some(base), Some(slot)) = (neutral.shadow.first(), from.shadow.first_mut()) {
            copy_light_keyframe(base, slot, reset, aspect);
        }
    }
    if summary.glow {
        from.clear_glow();
        if let (Some(base), Some(slot)) = (neutral.glow.first(), from.glow.first_mut()) {
            copy_light_keyframe(base, slot, reset, aspect);
        }
    }

    debug!(?direction, ?summary, "transferred track motion");
    Ok(summary)
}
