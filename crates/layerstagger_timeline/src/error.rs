// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by the document model.

use crate::clip::ClipId;
use crate::group::GroupId;
use crate::track::TrackId;
use thiserror::Error;

/// Document model errors
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Track not found
    #[error("Track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// Clip not found
    #[error("Clip not found: {0:?}")]
    ClipNotFound(ClipId),

    /// Group not found
    #[error("Group not found: {0:?}")]
    GroupNotFound(GroupId),

    /// Clip is already a member of another group
    #[error("Clip {clip:?} already belongs to group {group:?}")]
    AlreadyGrouped {
        /// Clip being added
        clip: ClipId,
        /// Group the clip already belongs to
        group: GroupId,
    },

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// RON deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] ron::error::SpannedError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document model operations
pub type Result<T> = std::result::Result<T, TimelineError>;
