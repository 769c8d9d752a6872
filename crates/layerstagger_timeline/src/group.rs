// SPDX-License-Identifier: MIT OR Apache-2.0
//! Composite groups linking clips across tracks.

use crate::clip::ClipId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a composite group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Create a new random group ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// Clips that move and edit as one unit.
///
/// Membership is managed through [`crate::Project`], which keeps each clip's
/// `group` field in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeGroup {
    /// Unique group ID
    pub id: GroupId,
    members: IndexSet<ClipId>,
}

impl CompositeGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self {
            id: GroupId::new(),
            members: IndexSet::new(),
        }
    }

    pub(crate) fn insert(&mut self, clip: ClipId) -> bool {
        self.members.insert(clip)
    }

    pub(crate) fn remove(&mut self, clip: ClipId) -> bool {
        self.members.shift_remove(&clip)
    }

    /// Whether a clip belongs to this group
    pub fn contains(&self, clip: ClipId) -> bool {
        self.members.contains(&clip)
    }

    /// Member clips in insertion order
    pub fn members(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.members.iter().copied()
    }

    /// Number of member clips
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Default for CompositeGroup {
    fn default() -> Self {
        Self::new()
    }
}
