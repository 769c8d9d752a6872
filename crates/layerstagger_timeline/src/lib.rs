// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline document model for Layer Stagger.
//!
//! This crate provides the data the staggering engine reads and rewrites:
//! - Clips with fades and motion keyframes
//! - Effects with simple keyframes or typed parameters
//! - Tracks with nesting levels and track motion
//! - Composite groups linking clips across tracks
//!
//! ## Architecture
//!
//! The model is an arena:
//! - `Project` owns tracks, clips and groups by ID
//! - Tracks list their clips by ID, groups index clips by ID
//! - Keyframe sequences stay sorted with unique times

pub mod clip;
pub mod effect;
pub mod error;
pub mod group;
pub mod keyframe;
pub mod motion;
pub mod parameter;
pub mod project;
pub mod track;

pub use clip::{Clip, ClipId, CurveType, Fade};
pub use effect::{Effect, EffectId, PlugIn};
pub use error::{Result, TimelineError};
pub use group::{CompositeGroup, GroupId};
pub use keyframe::{Interpolation, InterpolationMode, Keyframe, KeyframeId, Timed, TIME_EPSILON};
pub use motion::{
    Bounds, Depth3D, MotionKeyframe, MotionRole, TrackKeyframeBase, TrackLightKeyframe,
    TrackMotion, TrackMotionKeyframe,
};
pub use parameter::{Parameter, ParameterKind, ParameterValue};
pub use project::{FrameSize, Project, ProjectId, Transport};
pub use track::{CompositeMode, Track, TrackId, TrackType};
