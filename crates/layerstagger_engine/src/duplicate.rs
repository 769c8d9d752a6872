// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placing one staggered copy of a clip.

use crate::error::Result;
use crate::fade::fade_curve;
use crate::schedule::ScheduleSlot;
use layerstagger_timeline::{motion, Clip, ClipId, InterpolationMode, MotionKeyframe, Project, TrackId};
use tracing::debug;

/// Re-anchor a copy's motion so that the pose at `pos` becomes time 0.
///
/// Keyframes before `pos` are dropped. Later keyframes keep their times.
pub fn rebase_motion(keys: &mut Vec<MotionKeyframe>, pos: f64) {
    let idx = motion::insert_motion_keyframe(keys, pos);
    keys[idx].interpolation = InterpolationMode::Linear;
    keys.drain(..idx);
    if let Some(first) = keys.first_mut() {
        first.time = 0.0;
    }
}

/// Drop trailing keyframes past `start`, keeping at least one
pub fn truncate_motion(keys: &mut Vec<MotionKeyframe>, start: f64) {
    while keys.len() > 1 && keys.last().is_some_and(|kf| kf.time > start) {
        keys.pop();
    }
}

/// Scale a copy's fade-in gain by where it starts inside the source fades.
///
/// Copies never fade themselves; a copy that starts inside the source fade
/// out also scales its fade-in gain.
pub fn apply_fade_gain(copy: &mut Clip, source: &Clip) {
    copy.fade_in.length = 0.0;
    copy.fade_out.length = 0.0;

    if copy.start < source.start + source.fade_in.length {
        let t = (copy.start - source.start) / source.fade_in.length;
        copy.fade_in.gain *= fade_curve(t, source.fade_in.curve, false);
    } else if copy.start > source.end - source.fade_out.length {
        let t = (source.end - copy.start) / source.fade_out.length;
        copy.fade_in.gain *= fade_curve(t, source.fade_out.curve, true);
    }
}

/// Place the copy for `slot` on `track` and return its id.
///
/// The copy ends where the source ends, comes out deselected with its fades
/// folded into gain, and carries motion trimmed for its slot.
pub fn duplicate_clip(
    project: &mut Project,
    source_id: ClipId,
    track: TrackId,
    slot: &ScheduleSlot,
) -> Result<ClipId> {
    let source = project.require_clip(source_id)?.clone();
    let start = if slot.is_base {
        source.start
    } else {
        source.start + slot.time
    };

    let copy_id = project.copy_clip(source_id, track, start)?;
    let copy = project.require_clip_mut(copy_id)?;

    if slot.is_base {
        truncate_motion(&mut copy.motion, slot.time);
    } else {
        rebase_motion(&mut copy.motion, slot.time);
    }

    copy.end = source.end;
    copy.selected = false;
    apply_fade_gain(copy, &source);

    debug!(
        slot = slot.index,
        ordinal = slot.ordinal,
        offset = slot.time,
        base = slot.is_base,
        "placed copy"
    );
    Ok(copy_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerstagger_timeline::{Bounds, CurveType, Fade, FrameSize, Track};

    fn keyed(times: &[f64]) -> Vec<MotionKeyframe> {
        times
            .iter()
            .map(|&t| {
                let mut bounds = Bounds::default();
                bounds.center = [t, 0.0];
                MotionKeyframe::new(t, bounds)
            })
            .collect()
    }

    fn slot(time: f64, is_base: bool) -> ScheduleSlot {
        ScheduleSlot {
            index: 1,
            ordinal: 1,
            time,
            is_base,
        }
    }

    #[test]
    fn test_rebase_keeps_tail_from_pos() {
        let mut keys = keyed(&[0.0, 300.0, 600.0, 900.0]);
        let anchor = keys[1].id;
        rebase_motion(&mut keys, 300.0);

        let times: Vec<f64> = keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 600.0, 900.0]);
        assert_eq!(keys[0].id, anchor);
        assert_eq!(keys[0].bounds.center, [300.0, 0.0]);
        assert_eq!(keys[0].interpolation, InterpolationMode::Linear);
    }

    #[test]
    fn test_rebase_between_keyframes_samples_pose() {
        let mut keys = keyed(&[0.0, 1000.0]);
        rebase_motion(&mut keys, 250.0);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].time, 0.0);
        assert_eq!(keys[0].bounds.center, [250.0, 0.0]);
        assert_eq!(keys[1].time, 1000.0);
    }

    #[test]
    fn test_truncate_drops_keyframes_past_start() {
        let mut keys = keyed(&[0.0, 300.0, 600.0, 900.0]);
        truncate_motion(&mut keys, 300.0);
        let times: Vec<f64> = keys.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 300.0]);

        let mut late = keyed(&[500.0, 900.0]);
        truncate_motion(&mut late, 100.0);
        assert_eq!(late.len(), 1);
    }

    #[test]
    fn test_fade_in_scales_gain() {
        let source = Clip::new("src", 1000.0, 2000.0)
            .with_fades(Fade::new(400.0, CurveType::Linear), Fade::default());
        let mut copy = source.duplicate();
        copy.start = 1100.0;
        apply_fade_gain(&mut copy, &source);
        assert_eq!(copy.fade_in.length, 0.0);
        assert_eq!(copy.fade_in.gain, 0.25);
    }

    #[test]
    fn test_fade_out_scales_fade_in_gain() {
        let source = Clip::new("src", 1000.0, 2000.0)
            .with_fades(Fade::default(), Fade::new(400.0, CurveType::Linear));
        let mut copy = source.duplicate();
        copy.start = 1900.0;
        apply_fade_gain(&mut copy, &source);
        assert_eq!(copy.fade_out.length, 0.0);
        assert_eq!(copy.fade_in.gain, 0.25);
        assert_eq!(copy.fade_out.gain, 1.0);
    }

    #[test]
    fn test_no_fades_leave_gain() {
        let source = Clip::new("src", 1000.0, 2000.0);
        let mut copy = source.duplicate();
        copy.start = 1500.0;
        apply_fade_gain(&mut copy, &source);
        assert_eq!(copy.fade_in.gain, 1.0);
    }

    #[test]
    fn test_duplicate_clip_places_copy() {
        let mut project = Project::default();
        let frame = FrameSize::default();
        let parent = project.add_track(Track::video("Parent", frame));
        let child = project.add_track(Track::video("Child", frame).with_nesting(1));
        let mut clip = Clip::new("clip", 1000.0, 2000.0).with_motion(keyed(&[0.0, 1000.0]));
        clip.selected = true;
        let source = project.add_clip(parent, clip).unwrap();

        let copy_id = duplicate_clip(&mut project, source, child, &slot(500.0, false)).unwrap();
        let copy = project.clip(copy_id).unwrap();
        assert_eq!(copy.track, Some(child));
        assert_eq!(copy.start, 1500.0);
        assert_eq!(copy.end, 2000.0);
        assert!(!copy.selected);
        assert_eq!(copy.motion[0].time, 0.0);
        assert_eq!(copy.motion[0].bounds.center, [500.0, 0.0]);

        let base_id = duplicate_clip(&mut project, source, child, &slot(0.0, true)).unwrap();
        let base = project.clip(base_id).unwrap();
        assert_eq!(base.start, 1000.0);
        assert_eq!(base.motion.len(), 1);
        assert_eq!(project.clips_on(child).count(), 2);
    }
}
