// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layer staggering engine for Layer Stagger.
//!
//! This crate turns one clip into a stack of time-offset copies:
//! - Range resolution with strategy fallback
//! - Count and velocity scheduling
//! - Per-copy motion trimming and fade folding
//! - Optional baking of animated effects
//! - Track motion transfer between child and parent sides
//!
//! ## Architecture
//!
//! Every step is a function over `layerstagger_timeline::Project`:
//! - `repeater` drives one clip, or a whole selection, through the steps
//! - `settings` reads and writes the persisted configuration
//! - `split::SplitConfirmation` is the only interactive seam

pub mod duplicate;
pub mod error;
pub mod fade;
pub mod range;
pub mod repeater;
pub mod schedule;
pub mod settings;
pub mod split;
pub mod transfer;

pub use duplicate::duplicate_clip;
pub use error::{Result, SettingsError, StaggerError};
pub use fade::fade_curve;
pub use range::{resolve_range, RangeStrategy, RangeWindow, ResolvedRange};
pub use repeater::{repeat_layer, repeat_selection, ClipFailure, RepeatReport, SelectionReport};
pub use schedule::{
    compute_schedule, place_slot, Schedule, ScheduleMode, ScheduleSlot, SlotTrack, SpeedOperator,
    SpeedUnit, Velocity,
};
pub use settings::{MemorySettings, ModeType, SettingsStore, StaggerSettings, SETTINGS_SECTION};
pub use split::{SplitConfirmation, SplitPolicy};
pub use transfer::{transfer_track_motion, TransferDirection, TransferSummary};
