// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions and sorted-sequence helpers.

use crate::parameter::ParameterValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Two keyframe times closer than this (in milliseconds) are the same position
pub const TIME_EPSILON: f64 = 1e-4;

/// Anything positioned on a timeline in milliseconds
pub trait Timed {
    /// Position in milliseconds
    fn time(&self) -> f64;
    /// Move to a new position in milliseconds
    fn set_time(&mut self, time: f64);
}

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpolation mode from a keyframe to the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpolationMode {
    /// Linear interpolation
    #[default]
    Linear,
    /// Fast start, slow end
    Fast,
    /// Slow start, fast end
    Slow,
    /// Ease in and out
    Smooth,
    /// Sharp change around the midpoint
    Sharp,
    /// Hold the value until the next keyframe
    Hold,
}

impl InterpolationMode {
    /// Map linear segment progress `t` in `[0, 1]` to eased progress
    pub fn ease(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Fast => t * (2.0 - t),
            Self::Slow => t * t,
            Self::Smooth => t * t * (3.0 - 2.0 * t),
            Self::Sharp => 4.0 * (t - 0.5).powi(3) + 0.5,
            Self::Hold => 0.0,
        }
    }
}

/// A keyframe of an effect or parameter track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Time in milliseconds, local to the owning clip
    pub time: f64,
    /// Value at this keyframe
    pub value: ParameterValue,
    /// Interpolation mode to next keyframe
    pub interpolation: InterpolationMode,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, value: ParameterValue) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            value,
            interpolation: InterpolationMode::Linear,
        }
    }
}

impl Timed for Keyframe {
    fn time(&self) -> f64 {
        self.time
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Component-wise linear interpolation
    pub fn lerp_array<const N: usize>(a: [f64; N], b: [f64; N], t: f64) -> [f64; N] {
        let mut out = a;
        for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
            *o = Self::lerp(*x, *y, t);
        }
        out
    }

    /// Component-wise linear interpolation for single-precision colors
    pub fn lerp_color<const N: usize>(a: [f32; N], b: [f32; N], t: f64) -> [f32; N] {
        let mut out = a;
        for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
            *o = Self::lerp(f64::from(*x), f64::from(*y), t) as f32;
        }
        out
    }

    /// Component-wise interpolation for integer vectors, rounded to nearest
    pub fn lerp_int<const N: usize>(a: [i32; N], b: [i32; N], t: f64) -> [i32; N] {
        let mut out = a;
        for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
            *o = Self::lerp(f64::from(*x), f64::from(*y), t).round() as i32;
        }
        out
    }
}

/// Index of the keyframe positioned at `time`, if any
pub fn index_at<K: Timed>(keys: &[K], time: f64) -> Option<usize> {
    keys.iter().position(|k| (k.time() - time).abs() < TIME_EPSILON)
}

/// Insert a keyframe keeping the sequence sorted, returning its index.
///
/// A keyframe already at the same time is replaced.
pub fn insert_sorted<K: Timed>(keys: &mut Vec<K>, key: K) -> usize {
    if let Some(idx) = index_at(keys, key.time()) {
        keys[idx] = key;
        return idx;
    }
    let idx = keys.partition_point(|k| k.time() < key.time());
    keys.insert(idx, key);
    idx
}

/// Sort a keyframe sequence by time
pub fn sort_by_time<K: Timed>(keys: &mut [K]) {
    keys.sort_by(|a, b| a.time().total_cmp(&b.time()));
}

/// Find the keyframes surrounding a time
pub fn surrounding<K: Timed>(keys: &[K], time: f64) -> (Option<&K>, Option<&K>) {
    if keys.is_empty() {
        return (None, None);
    }

    // Find the first keyframe at or after time
    match keys.iter().position(|k| k.time() >= time) {
        // Time is past all keyframes
        None => (keys.last(), None),
        // Time is before or at first keyframe
        Some(0) => (None, keys.first()),
        Some(idx) => (Some(&keys[idx - 1]), Some(&keys[idx])),
    }
}

/// Linear progress of `time` between two keyframe times
pub fn segment_progress(from: f64, to: f64, time: f64) -> f64 {
    if (to - from).abs() < TIME_EPSILON {
        return 1.0;
    }
    ((time - from) / (to - from)).clamp(0.0, 1.0)
}

/// Evaluate a value keyframe sequence at a given time
pub fn evaluate(keys: &[Keyframe], time: f64) -> Option<ParameterValue> {
    match surrounding(keys, time) {
        (None, None) => None,
        (Some(kf), None) | (None, Some(kf)) => Some(kf.value.clone()),
        (Some(a), Some(b)) => {
            let progress = segment_progress(a.time, b.time, time);
            if progress >= 1.0 {
                return Some(b.value.clone());
            }
            a.value.interpolate(&b.value, a.interpolation.ease(progress))
        }
    }
}
