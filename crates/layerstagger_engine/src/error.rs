// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised while staggering a clip.

use crate::range::RangeStrategy;
use layerstagger_timeline::{ClipId, TimelineError};
use thiserror::Error;

/// Staggering errors. Each one is scoped to a single source clip.
#[derive(Debug, Error)]
pub enum StaggerError {
    /// No range strategy produced a usable window
    #[error("{}", .strategy.failure_message())]
    RangeUnresolved {
        /// Clip being staggered
        clip: ClipId,
        /// Last strategy tried
        strategy: RangeStrategy,
    },

    /// Clip is not placed on a track
    #[error("Clip {0:?} is not on a track")]
    Detached(ClipId),

    /// Document model error
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Result type for staggering operations
pub type Result<T> = std::result::Result<T, StaggerError>;

/// Errors persisting settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Serialization error
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// Deserialization error
    #[error("Failed to parse settings: {0}")]
    Deserialize(#[from] ron::error::SpannedError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
