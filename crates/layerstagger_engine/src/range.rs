// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resolution of the time window a clip is staggered over.

use crate::error::{Result, StaggerError};
use layerstagger_timeline::{Clip, Transport};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the staggering window comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RangeStrategy {
    /// The whole clip
    WholeClip,
    /// First to last motion keyframe
    #[default]
    MotionKeyframes,
    /// Earliest to latest keyframe of the active effects
    EffectKeyframes,
    /// The single instant under the playback cursor
    PlayheadPosition,
    /// The transport loop region
    LoopRegion,
}

impl RangeStrategy {
    /// Strategy for a persisted setting value; unknown values mean the whole clip
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::MotionKeyframes,
            2 => Self::EffectKeyframes,
            3 => Self::PlayheadPosition,
            4 => Self::LoopRegion,
            _ => Self::WholeClip,
        }
    }

    /// Persisted setting value
    pub fn index(self) -> i64 {
        match self {
            Self::WholeClip => 0,
            Self::MotionKeyframes => 1,
            Self::EffectKeyframes => 2,
            Self::PlayheadPosition => 3,
            Self::LoopRegion => 4,
        }
    }

    /// Next strategy to try when this one fails
    pub fn fallback(self) -> Self {
        match self {
            Self::MotionKeyframes | Self::PlayheadPosition | Self::WholeClip => Self::WholeClip,
            Self::EffectKeyframes => Self::MotionKeyframes,
            Self::LoopRegion => Self::PlayheadPosition,
        }
    }

    /// User-facing explanation of why this strategy could not be used
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::WholeClip => "The clip has no usable range.",
            Self::MotionKeyframes => {
                "Cannot stagger: the clip needs at least 2 Pan/Crop keyframes."
            }
            Self::EffectKeyframes => {
                "Cannot stagger: no active effect on the clip has keyframes spanning a range."
            }
            Self::PlayheadPosition => "Cannot stagger: the cursor is outside the clip.",
            Self::LoopRegion => {
                "Cannot stagger: the loop region is empty or not inside the clip."
            }
        }
    }
}

/// Clip-local window `[start, end]` in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeWindow {
    /// Window start
    pub start: f64,
    /// Window end
    pub end: f64,
}

impl RangeWindow {
    /// Create a window
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Window length
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// A window together with the strategy that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRange {
    /// Strategy that succeeded
    pub strategy: RangeStrategy,
    /// Resolved window
    pub window: RangeWindow,
}

/// Apply one strategy without fallback
pub fn try_strategy(clip: &Clip, transport: &Transport, strategy: RangeStrategy) -> Option<RangeWindow> {
    let length = clip.length();
    match strategy {
        RangeStrategy::WholeClip => Some(RangeWindow::new(0.0, length)),
        RangeStrategy::MotionKeyframes => {
            clip.motion_span().map(|(start, end)| RangeWindow::new(start, end))
        }
        RangeStrategy::EffectKeyframes => effect_span(clip),
        RangeStrategy::PlayheadPosition => {
            let t = transport.cursor - clip.start;
            (0.0..=length).contains(&t).then(|| RangeWindow::new(t, t))
        }
        RangeStrategy::LoopRegion => {
            if transport.loop_length == 0.0 {
                return None;
            }
            let mut t1 = transport.loop_start - clip.start;
            let mut t2 = transport.loop_end() - clip.start;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            (t1 >= 0.0 && t2 <= length).then(|| RangeWindow::new(t1, t2))
        }
    }
}

fn effect_span(clip: &Clip) -> Option<RangeWindow> {
    let mut start = clip.length();
    let mut end = 0.0_f64;

    for effect in clip.effects.iter().filter(|e| e.is_active()) {
        if effect.is_typed() {
            let mut times: Vec<f64> = effect
                .animated_parameters()
                .flat_map(|p| p.keyframe_times())
                .collect();
            if times.len() > 1 {
                times.sort_by(f64::total_cmp);
                start = start.min(times[0]);
                end = end.max(times[times.len() - 1]);
            }
        } else {
            for kf in &effect.keyframes {
                start = start.min(kf.time);
                end = end.max(kf.time);
            }
        }
    }

    (start < end).then(|| RangeWindow::new(start, end))
}

/// Resolve the staggering window for a clip.
///
/// With `adapt` set, a failing strategy falls back along its chain until one
/// succeeds; the chain always ends at [`RangeStrategy::WholeClip`].
pub fn resolve_range(
    clip: &Clip,
    transport: &Transport,
    requested: RangeStrategy,
    adapt: bool,
) -> Result<ResolvedRange> {
    let mut strategy = requested;
    loop {
        if let Some(window) = try_strategy(clip, transport, strategy) {
            return Ok(ResolvedRange { strategy, window });
        }
        if !adapt {
            return Err(StaggerError::RangeUnresolved {
                clip: clip.id,
                strategy,
            });
        }
        let next = strategy.fallback();
        debug!(clip = %clip.name, from = ?strategy, to = ?next, "range strategy failed, adapting");
        strategy = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerstagger_timeline::{
        Bounds, Effect, Keyframe, MotionKeyframe, Parameter, ParameterValue, PlugIn,
    };

    fn clip_with_motion(times: &[f64]) -> Clip {
        Clip::new("clip", 1000.0, 2000.0).with_motion(
            times
                .iter()
                .map(|&t| MotionKeyframe::new(t, Bounds::default()))
                .collect(),
        )
    }

    #[test]
    fn test_motion_keyframes_window() {
        let clip = clip_with_motion(&[100.0, 900.0]);
        let resolved =
            resolve_range(&clip, &Transport::default(), RangeStrategy::MotionKeyframes, false)
                .unwrap();
        assert_eq!(resolved.window, RangeWindow::new(100.0, 900.0));
        assert_eq!(resolved.strategy, RangeStrategy::MotionKeyframes);
    }

    #[test]
    fn test_motion_falls_back_to_whole_clip() {
        let clip = clip_with_motion(&[0.0]);
        let transport = Transport::default();
        let resolved =
            resolve_range(&clip, &transport, RangeStrategy::MotionKeyframes, true).unwrap();
        assert_eq!(resolved.strategy, RangeStrategy::WholeClip);
        assert_eq!(resolved.window, RangeWindow::new(0.0, 1000.0));

        let err = resolve_range(&clip, &transport, RangeStrategy::MotionKeyframes, false)
            .unwrap_err();
        assert!(matches!(
            err,
            StaggerError::RangeUnresolved { strategy: RangeStrategy::MotionKeyframes, .. }
        ));
        assert!(err.to_string().contains("Pan/Crop"));
    }

    #[test]
    fn test_effect_keyframes_union_across_effects() {
        let simple = Effect::new(PlugIn::simple("Blur", "blur")).with_keyframes(vec![
            Keyframe::new(200.0, ParameterValue::Double(0.0)),
            Keyframe::new(500.0, ParameterValue::Double(1.0)),
        ]);
        let typed = Effect::new(PlugIn::typed("Glow", "glow")).with_parameter(
            Parameter::new("Radius", ParameterValue::Double(0.0)).with_keyframes(vec![
                Keyframe::new(400.0, ParameterValue::Double(1.0)),
                Keyframe::new(800.0, ParameterValue::Double(2.0)),
            ]),
        );
        let mut bypassed = Effect::new(PlugIn::simple("Sharpen", "sharpen")).with_keyframes(vec![
            Keyframe::new(0.0, ParameterValue::Double(0.0)),
            Keyframe::new(1000.0, ParameterValue::Double(1.0)),
        ]);
        bypassed.bypass = true;

        let clip = clip_with_motion(&[0.0])
            .with_effect(simple)
            .with_effect(typed)
            .with_effect(bypassed);
        let window = try_strategy(&clip, &Transport::default(), RangeStrategy::EffectKeyframes);
        assert_eq!(window, Some(RangeWindow::new(200.0, 800.0)));
    }

    #[test]
    fn test_effect_keyframes_falls_back_to_motion() {
        let clip = clip_with_motion(&[100.0, 300.0]);
        let resolved =
            resolve_range(&clip, &Transport::default(), RangeStrategy::EffectKeyframes, true)
                .unwrap();
        assert_eq!(resolved.strategy, RangeStrategy::MotionKeyframes);
        assert_eq!(resolved.window, RangeWindow::new(100.0, 300.0));
    }

    #[test]
    fn test_playhead_gives_degenerate_window() {
        let clip = clip_with_motion(&[0.0]);
        let mut transport = Transport::default();
        transport.seek(1250.0);
        let window = try_strategy(&clip, &transport, RangeStrategy::PlayheadPosition);
        assert_eq!(window, Some(RangeWindow::new(250.0, 250.0)));

        transport.seek(3000.0);
        assert_eq!(try_strategy(&clip, &transport, RangeStrategy::PlayheadPosition), None);
    }

    #[test]
    fn test_reversed_loop_region_is_swapped() {
        let clip = clip_with_motion(&[0.0]);
        let mut transport = Transport::default();
        transport.set_loop_range(1800.0, 1200.0);
        let window = try_strategy(&clip, &transport, RangeStrategy::LoopRegion);
        assert_eq!(window, Some(RangeWindow::new(200.0, 800.0)));
    }

    #[test]
    fn test_loop_region_falls_back_to_playhead_then_whole() {
        let clip = clip_with_motion(&[0.0]);
        let mut transport = Transport::default();
        transport.seek(1500.0);
        let resolved = resolve_range(&clip, &transport, RangeStrategy::LoopRegion, true).unwrap();
        assert_eq!(resolved.strategy, RangeStrategy::PlayheadPosition);

        transport.seek(0.0);
        let resolved = resolve_range(&clip, &transport, RangeStrategy::LoopRegion, true).unwrap();
        assert_eq!(resolved.strategy, RangeStrategy::WholeClip);
    }

    #[test]
    fn test_strategy_index_round_trip() {
        for index in 0..5 {
            assert_eq!(RangeStrategy::from_index(index).index(), index);
        }
        assert_eq!(RangeStrategy::from_index(42), RangeStrategy::WholeClip);
    }
}
