// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project arena owning tracks, clips and composite groups.

use crate::clip::{Clip, ClipId};
use crate::error::{Result, TimelineError};
use crate::group::{CompositeGroup, GroupId};
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Create a new random project ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Output frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl FrameSize {
    /// Create a frame size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Playback cursor and loop region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transport {
    /// Cursor position in milliseconds
    pub cursor: f64,
    /// Loop region start in milliseconds
    pub loop_start: f64,
    /// Loop region length in milliseconds, negative when drawn backwards
    pub loop_length: f64,
}

impl Transport {
    /// Seek to specific time
    pub fn seek(&mut self, time: f64) {
        self.cursor = time.max(0.0);
    }

    /// Set loop range
    pub fn set_loop_range(&mut self, start: f64, end: f64) {
        self.loop_start = start;
        self.loop_length = end - start;
    }

    /// Loop region end in milliseconds
    pub fn loop_end(&self) -> f64 {
        self.loop_start + self.loop_length
    }
}

/// A timeline project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Output frame size
    pub frame: FrameSize,
    /// Playback cursor and loop region
    pub transport: Transport,
    /// Tracks in display order
    tracks: IndexMap<TrackId, Track>,
    /// All clips, owned here and referenced by tracks
    clips: IndexMap<ClipId, Clip>,
    /// Composite groups
    groups: IndexMap<GroupId, CompositeGroup>,
}

impl Project {
    /// Create a new project
    pub fn new(name: impl Into<String>, frame: FrameSize) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            frame,
            transport: Transport::default(),
            tracks: IndexMap::new(),
            clips: IndexMap::new(),
            groups: IndexMap::new(),
        }
    }

    /// Width divided by height of the output frame
    pub fn aspect_ratio(&self) -> f64 {
        self.frame.aspect_ratio()
    }

    /// Append a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Insert a track at a display index, shifting later tracks down
    pub fn insert_track(&mut self, index: usize, track: Track) -> TrackId {
        let id = track.id;
        let index = index.min(self.tracks.len());
        self.tracks.shift_insert(index, id, track);
        id
    }

    /// Remove a track together with its clips
    pub fn remove_track(&mut self, track_id: TrackId) -> Option<Track> {
        let clip_ids = self.tracks.get(&track_id)?.clips.clone();
        for clip_id in clip_ids {
            self.remove_clip(clip_id);
        }
        self.tracks.shift_remove(&track_id)
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Get a track or fail
    pub fn require_track(&self, track_id: TrackId) -> Result<&Track> {
        self.track(track_id).ok_or(TimelineError::TrackNotFound(track_id))
    }

    /// Get a mutable track or fail
    pub fn require_track_mut(&mut self, track_id: TrackId) -> Result<&mut Track> {
        self.track_mut(track_id).ok_or(TimelineError::TrackNotFound(track_id))
    }

    /// Display index of a track
    pub fn track_index(&self, track_id: TrackId) -> Option<usize> {
        self.tracks.get_index_of(&track_id)
    }

    /// Track at a display index
    pub fn track_at(&self, index: usize) -> Option<&Track> {
        self.tracks.get_index(index).map(|(_, t)| t)
    }

    /// Mutable track at a display index
    pub fn track_at_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_index_mut(index).map(|(_, t)| t)
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the track directly above a deeper-nested video track composites it
    pub fn is_compositing_parent(&self, track_id: TrackId) -> bool {
        let Some(index) = self.track_index(track_id) else {
            return false;
        };
        match (self.track_at(index), self.track_at(index + 1)) {
            (Some(track), Some(next)) => {
                track.is_video() && next.is_video() && next.nesting_level > track.nesting_level
            }
            _ => false,
        }
    }

    /// Add a clip to a track
    pub fn add_clip(&mut self, track_id: TrackId, mut clip: Clip) -> Result<ClipId> {
        let clips = &self.clips;
        let track = self
            .tracks
            .get_mut(&track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))?;

        let id = clip.id;
        clip.track = Some(track_id);
        let at = track
            .clips
            .partition_point(|c| clips.get(c).is_some_and(|other| other.start <= clip.start));
        track.clips.insert(at, id);
        self.clips.insert(id, clip);
        Ok(id)
    }

    /// Copy a clip onto a track at a new start time, keeping its length
    pub fn copy_clip(&mut self, clip_id: ClipId, track_id: TrackId, start: f64) -> Result<ClipId> {
        let source = self.clip(clip_id).ok_or(TimelineError::ClipNotFound(clip_id))?;
        let mut copy = source.duplicate();
        let length = copy.length();
        copy.start = start;
        copy.end = start + length;
        self.add_clip(track_id, copy)
    }

    /// Remove a clip from its track, its group and the project
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Option<Clip> {
        let clip = self.clips.shift_remove(&clip_id)?;
        if let Some(track) = clip.track.and_then(|t| self.tracks.get_mut(&t)) {
            track.clips.retain(|c| *c != clip_id);
        }
        if let Some(group) = clip.group.and_then(|g| self.groups.get_mut(&g)) {
            group.remove(clip_id);
        }
        Some(clip)
    }

    /// Get a clip
    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.clips.get(&clip_id)
    }

    /// Get a mutable clip
    pub fn clip_mut(&mut self, clip_id: ClipId) -> Option<&mut Clip> {
        self.clips.get_mut(&clip_id)
    }

    /// Get a clip or fail
    pub fn require_clip(&self, clip_id: ClipId) -> Result<&Clip> {
        self.clip(clip_id).ok_or(TimelineError::ClipNotFound(clip_id))
    }

    /// Get a mutable clip or fail
    pub fn require_clip_mut(&mut self, clip_id: ClipId) -> Result<&mut Clip> {
        self.clip_mut(clip_id).ok_or(TimelineError::ClipNotFound(clip_id))
    }

    /// Get all clips
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    /// Clips on a track, in time order
    pub fn clips_on(&self, track_id: TrackId) -> impl Iterator<Item = &Clip> {
        self.tracks
            .get(&track_id)
            .into_iter()
            .flat_map(|t| t.clips.iter())
            .filter_map(|c| self.clips.get(c))
    }

    /// Selected clips on video tracks, in display order
    pub fn selected_video_clips(&self) -> Vec<ClipId> {
        self.tracks
            .values()
            .filter(|t| t.is_video())
            .flat_map(|t| t.clips.iter())
            .filter(|c| self.clips.get(*c).is_some_and(|clip| clip.selected))
            .copied()
            .collect()
    }

    /// Clear the selection flag of every track
    pub fn deselect_all_tracks(&mut self) {
        for track in self.tracks.values_mut() {
            track.selected = false;
        }
    }

    /// Create an empty composite group
    pub fn create_group(&mut self) -> GroupId {
        let group = CompositeGroup::new();
        let id = group.id;
        self.groups.insert(id, group);
        id
    }

    /// Add a clip to a group; a clip belongs to at most one group
    pub fn add_to_group(&mut self, group_id: GroupId, clip_id: ClipId) -> Result<()> {
        let clip = self
            .clips
            .get_mut(&clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or(TimelineError::GroupNotFound(group_id))?;

        match clip.group {
            Some(existing) if existing == group_id => Ok(()),
            Some(existing) => Err(TimelineError::AlreadyGrouped {
                clip: clip_id,
                group: existing,
            }),
            None => {
                group.insert(clip_id);
                clip.group = Some(group_id);
                Ok(())
            }
        }
    }

    /// Get a group
    pub fn group(&self, group_id: GroupId) -> Option<&CompositeGroup> {
        self.groups.get(&group_id)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }

    /// Save project to file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load project from file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project", FrameSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_tracks(n: usize) -> (Project, Vec<TrackId>) {
        let mut project = Project::default();
        let ids = (0..n)
            .map(|i| project.add_track(Track::video(format!("V{i}"), project.frame)))
            .collect();
        (project, ids)
    }

    #[test]
    fn test_insert_track_shifts_later_tracks() {
        let (mut project, ids) = project_with_tracks(2);
        let inserted = project.insert_track(1, Track::video("new", project.frame));
        assert_eq!(project.track_index(ids[0]), Some(0));
        assert_eq!(project.track_index(inserted), Some(1));
        assert_eq!(project.track_index(ids[1]), Some(2));
    }

    #[test]
    fn test_remove_track_drops_clips_and_membership() {
        let (mut project, ids) = project_with_tracks(2);
        let a = project.add_clip(ids[0], Clip::new("a", 0.0, 100.0)).unwrap();
        let b = project.add_clip(ids[1], Clip::new("b", 0.0, 100.0)).unwrap();
        let group = project.create_group();
        project.add_to_group(group, a).unwrap();
        project.add_to_group(group, b).unwrap();

        project.remove_track(ids[1]);
        assert!(project.clip(b).is_none());
        assert_eq!(project.group(group).unwrap().members().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_clip_belongs_to_one_group() {
        let (mut project, ids) = project_with_tracks(1);
        let a = project.add_clip(ids[0], Clip::new("a", 0.0, 100.0)).unwrap();
        let g1 = project.create_group();
        let g2 = project.create_group();
        project.add_to_group(g1, a).unwrap();
        assert!(project.add_to_group(g1, a).is_ok());
        assert!(matches!(
            project.add_to_group(g2, a),
            Err(TimelineError::AlreadyGrouped { .. })
        ));
    }

    #[test]
    fn test_compositing_parent_detection() {
        let (mut project, ids) = project_with_tracks(3);
        assert!(!project.is_compositing_parent(ids[0]));
        project.track_mut(ids[1]).unwrap().nesting_level = 1;
        assert!(project.is_compositing_parent(ids[0]));
        assert!(!project.is_compositing_parent(ids[1]));
    }

    #[test]
    fn test_copy_clip_keeps_length() {
        let (mut project, ids) = project_with_tracks(2);
        let a = project.add_clip(ids[0], Clip::new("a", 100.0, 600.0)).unwrap();
        let copy = project.copy_clip(a, ids[1], 250.0).unwrap();
        let clip = project.clip(copy).unwrap();
        assert_eq!((clip.start, clip.end), (250.0, 750.0));
        assert_eq!(clip.track, Some(ids[1]));
    }

    #[test]
    fn test_ron_round_trip() {
        let (mut project, ids) = project_with_tracks(1);
        project.add_clip(ids[0], Clip::new("a", 0.0, 100.0)).unwrap();
        let ron = project.to_ron().unwrap();
        let loaded = Project::from_ron(&ron).unwrap();
        assert_eq!(loaded.track_count(), 1);
        assert_eq!(loaded.clips().count(), 1);
        assert_eq!(loaded.name, project.name);
    }
}
