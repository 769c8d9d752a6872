// SPDX-License-Identifier: MIT OR Apache-2.0
//! Staggering clips onto nested child tracks.
//!
//! For every source clip the repeater resolves a window, spreads copies of
//! the clip across it, and stacks each copy on its own track nested under the
//! source track. Copies share a composite group with the source so a later
//! run can find and replace them.

use crate::duplicate::duplicate_clip;
use crate::error::{Result, StaggerError};
use crate::range::{resolve_range, RangeStrategy, RangeWindow};
use crate::schedule::{compute_schedule, place_slot, SlotTrack};
use crate::settings::StaggerSettings;
use crate::split::{bake_effects, split_decisions, SplitConfirmation};
use crate::transfer::{transfer_track_motion, TransferDirection, TransferSummary};
use layerstagger_timeline::{ClipId, GroupId, Project, TimelineError, Track, TrackId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of staggering one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatReport {
    /// Source clip
    pub clip: ClipId,
    /// Strategy that produced the window
    pub strategy: RangeStrategy,
    /// Clip-local window the copies were spread over
    pub window: RangeWindow,
    /// Number of copies made
    pub count: usize,
    /// Copies, in slot order
    pub duplicates: Vec<ClipId>,
    /// Group holding the source and its copies
    pub group: GroupId,
    /// Track motion moved to the parent side, if a transfer ran
    pub transfer: Option<TransferSummary>,
}

/// A clip that could not be staggered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipFailure {
    /// Source clip
    pub clip: ClipId,
    /// Why it failed
    pub message: String,
}

/// Outcome of staggering a whole selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Clips that were staggered
    pub repeated: Vec<RepeatReport>,
    /// Clips that were skipped
    pub failed: Vec<ClipFailure>,
}

/// Stagger every selected video clip in display order.
///
/// A failing clip is logged and recorded; the remaining clips still run.
pub fn repeat_selection(
    project: &mut Project,
    settings: &StaggerSettings,
    confirm: &mut dyn SplitConfirmation,
) -> SelectionReport {
    let mut report = SelectionReport::default();
    for clip in project.selected_video_clips() {
        match repeat_layer(project, clip, settings, confirm) {
            Ok(done) => report.repeated.push(done),
            Err(err) => {
                warn!(?clip, "{err}");
                report.failed.push(ClipFailure {
                    clip,
                    message: err.to_string(),
                });
            }
        }
    }
    report
}

/// Stagger one clip
pub fn repeat_layer(
    project: &mut Project,
    clip_id: ClipId,
    settings: &StaggerSettings,
    confirm: &mut dyn SplitConfirmation,
) -> Result<RepeatReport> {
    let (resolved, track_id) = {
        let clip = project.require_clip(clip_id)?;
        let track_id = clip.track.ok_or(StaggerError::Detached(clip_id))?;
        let resolved =
            resolve_range(clip, &project.transport, settings.range, settings.range_adapt)?;
        (resolved, track_id)
    };

    project.require_clip_mut(clip_id)?.mute = false;
    project.deselect_all_tracks();

    let mode = settings.schedule_mode();
    let schedule = compute_schedule(&mode, resolved.window, settings.reverse);

    if mode.is_fixed_count() && schedule.is_empty() {
        // Clearing: bring the parent motion back down to the track
        transfer_track_motion(project, track_id, track_id, TransferDirection::ParentToChild)?;
    }

    let group = match project.require_clip(clip_id)?.group {
        Some(group) => {
            remove_previous_copies(project, track_id, group)?;
            group
        }
        None => {
            let group = project.create_group();
            project.add_to_group(group, clip_id)?;
            group
        }
    };

    let children = child_tracks(project, track_id)?;

    let mut report = RepeatReport {
        clip: clip_id,
        strategy: resolved.strategy,
        window: resolved.window,
        count: schedule.count(),
        duplicates: Vec::with_capacity(schedule.count()),
        group,
        transfer: None,
    };
    if schedule.is_empty() {
        debug!(?clip_id, "no copies scheduled");
        return Ok(report);
    }

    let source = project.require_clip(clip_id)?.clone();
    let decisions = split_decisions(&source, settings.split_policy, confirm);

    let source_track = project.require_track(track_id)?.clone();
    let parent_index = project
        .track_index(track_id)
        .ok_or(TimelineError::TrackNotFound(track_id))?;

    for slot in &schedule.slots {
        let target = match place_slot(parent_index, children.len(), slot.index) {
            SlotTrack::Existing(k) => children[k],
            SlotTrack::Insert(at) => {
                let track = Track::video(source_track.name.clone(), project.frame);
                project.insert_track(at, track)
            }
        };

        let track = project.require_track_mut(target)?;
        track.nesting_level = 1;
        track.composite_mode = source_track.composite_mode;
        track.name.clone_from(&source_track.name);
        track.solo = source_track.solo;
        track.muted = source_track.muted;

        let copy = duplicate_clip(project, clip_id, target, slot)?;
        bake_effects(project.require_clip_mut(copy)?, &source, &decisions, slot.time);
        project.add_to_group(group, copy)?;
        report.duplicates.push(copy);
    }

    project.require_clip_mut(clip_id)?.mute = settings.mute;

    for i in 0..schedule.count() {
        if let Some(track) = project.track_at_mut(parent_index + i + 1) {
            track.selected = true;
            track.nesting_level += source_track.nesting_level;
        }
    }

    if project.is_compositing_parent(track_id) {
        let track = project.require_track_mut(track_id)?;
        track.parent_composite_mode = track.composite_mode;
        if settings.transfer_to_parent_motion {
            report.transfer = Some(transfer_track_motion(
                project,
                track_id,
                track_id,
                TransferDirection::ChildToParent,
            )?);
        }
    }

    if settings.transfer_to_parent_fx {
        for effect in &mut project.require_track_mut(track_id)?.effects {
            effect.apply_after_composite = true;
        }
    }

    info!(
        clip = %source.name,
        strategy = ?report.strategy,
        start = report.window.start,
        end = report.window.end,
        count = report.count,
        "staggered clip"
    );
    Ok(report)
}

/// Drop copies left in the group by an earlier run.
///
/// A copy that is alone on its track takes the track with it.
fn remove_previous_copies(project: &mut Project, track_id: TrackId, group: GroupId) -> Result<()> {
    let nesting = project.require_track(track_id)?.nesting_level;
    let members: Vec<ClipId> = project
        .group(group)
        .ok_or(TimelineError::GroupNotFound(group))?
        .members()
        .collect();

    for member in members {
        let Some(owner) = project.clip(member).and_then(|c| c.track) else {
            continue;
        };
        let Some(track) = project.track(owner) else {
            continue;
        };
        if owner == track_id || !track.is_video() || track.nesting_level <= nesting {
            continue;
        }

        if track.clip_count() == 1 {
            debug!(?owner, "removing previous copy track");
            project.remove_track(owner);
        } else {
            debug!(?member, "removing previous copy");
            project.remove_clip(member);
        }
    }
    Ok(())
}

/// The contiguous run of deeper-nested video tracks below a track
fn child_tracks(project: &Project, track_id: TrackId) -> Result<Vec<TrackId>> {
    let index = project
        .track_index(track_id)
        .ok_or(TimelineError::TrackNotFound(track_id))?;
    let nesting = project.require_track(track_id)?.nesting_level;

    Ok((index + 1..)
        .map_while(|i| project.track_at(i))
        .take_while(|t| t.is_video() && t.nesting_level > nesting)
        .map(|t| t.id)
        .collect())
}
