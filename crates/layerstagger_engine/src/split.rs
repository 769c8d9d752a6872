// SPDX-License-Identifier: MIT OR Apache-2.0
//! Freezing animated effects on staggered copies.
//!
//! A copy that starts at offset `pos` can keep the source's effect animation
//! or bake it down to the value the source has at `pos`. Which effects get
//! baked is decided once per source clip.

use layerstagger_timeline::{keyframe, Clip, Effect, Keyframe};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether animated effects are split on copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SplitPolicy {
    /// Ask for every candidate effect
    #[default]
    AskEachTime,
    /// Split every candidate effect
    AlwaysSplit,
    /// Never split
    NeverSplit,
}

impl SplitPolicy {
    /// Policy for a persisted setting value
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::AlwaysSplit,
            2 => Self::NeverSplit,
            _ => Self::AskEachTime,
        }
    }

    /// Persisted setting value
    pub fn index(self) -> i64 {
        match self {
            Self::AskEachTime => 0,
            Self::AlwaysSplit => 1,
            Self::NeverSplit => 2,
        }
    }
}

/// Yes/no prompt asked for each splittable effect
pub trait SplitConfirmation {
    /// Whether to split the effect at `effect_index` (0-based) named `effect_name`
    fn confirm_split(&mut self, effect_index: usize, effect_name: &str) -> bool;
}

impl<F> SplitConfirmation for F
where
    F: FnMut(usize, &str) -> bool,
{
    fn confirm_split(&mut self, effect_index: usize, effect_name: &str) -> bool {
        self(effect_index, effect_name)
    }
}

/// Whether an effect carries animation worth splitting
pub fn is_split_candidate(effect: &Effect) -> bool {
    if !effect.is_active() {
        return false;
    }
    if effect.is_typed() {
        effect.animated_parameters().any(|p| p.keyframe_count() > 1)
    } else {
        effect.keyframe_count() > 1
    }
}

/// Per-effect split decisions for a source clip.
///
/// [`SplitPolicy::NeverSplit`] returns an empty list, so every effect index
/// falls outside it.
pub fn split_decisions(
    clip: &Clip,
    policy: SplitPolicy,
    confirm: &mut dyn SplitConfirmation,
) -> Vec<bool> {
    if policy == SplitPolicy::NeverSplit {
        return Vec::new();
    }

    clip.effects
        .iter()
        .enumerate()
        .map(|(index, effect)| {
            let candidate = is_split_candidate(effect);
            if candidate && policy == SplitPolicy::AskEachTime {
                confirm.confirm_split(index, &effect.plugin.name)
            } else {
                candidate
            }
        })
        .collect()
}

/// Bake the accepted effects of `copy` at the source's state at `pos`
pub fn bake_effects(copy: &mut Clip, source: &Clip, decisions: &[bool], pos: f64) {
    for (index, effect) in copy.effects.iter_mut().enumerate() {
        if effect.bypass || !decisions.get(index).copied().unwrap_or(false) {
            continue;
        }

        if effect.is_typed() {
            let Some(origin) = source.effects.get(index) else {
                continue;
            };
            if origin.plugin != effect.plugin {
                debug!(index, plugin = %effect.plugin.name, "effect identity differs, not splitting");
                continue;
            }
            bake_parameters(effect, origin, pos);
        } else {
            bake_keyframes(effect, pos);
        }
    }
}

fn bake_keyframes(effect: &mut Effect, pos: f64) {
    let idx = match keyframe::index_at(&effect.keyframes, pos) {
        Some(idx) => idx,
        None => {
            let Some(value) = effect.sample_at(pos) else {
                return;
            };
            keyframe::insert_sorted(&mut effect.keyframes, Keyframe::new(pos, value))
        }
    };

    let mut kept = effect.keyframes[idx].clone();
    kept.time = 0.0;
    effect.keyframes = vec![kept];
}

fn bake_parameters(effect: &mut Effect, origin: &Effect, pos: f64) {
    for param in effect.parameters.iter_mut() {
        if !param.enabled || !param.is_animated() {
            continue;
        }
        let Some(source_param) = origin.parameter(&param.name) else {
            continue;
        };
        let value = source_param.sample_at(pos);
        param.freeze(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerstagger_timeline::{Parameter, ParameterValue, PlugIn};

    fn ramp_effect() -> Effect {
        Effect::new(PlugIn::typed("Glow", "glow")).with_parameter(
            Parameter::new("Amount", ParameterValue::Double(0.0)).with_keyframes(vec![
                Keyframe::new(0.0, ParameterValue::Double(0.0)),
                Keyframe::new(400.0, ParameterValue::Double(50.0)),
                Keyframe::new(900.0, ParameterValue::Double(100.0)),
            ]),
        )
    }

    fn blur_effect() -> Effect {
        Effect::new(PlugIn::simple("Blur", "blur")).with_keyframes(vec![
            Keyframe::new(0.0, ParameterValue::Double(0.0)),
            Keyframe::new(1000.0, ParameterValue::Double(1.0)),
        ])
    }

    #[test]
    fn test_candidates() {
        let mut bypassed = blur_effect();
        bypassed.bypass = true;
        let still = Effect::new(PlugIn::simple("Tint", "tint"));
        let clip = Clip::new("clip", 0.0, 1000.0)
            .with_effect(ramp_effect())
            .with_effect(bypassed)
            .with_effect(still)
            .with_effect(blur_effect());

        let decisions = split_decisions(&clip, SplitPolicy::AlwaysSplit, &mut |_: usize, _: &str| false);
        assert_eq!(decisions, vec![true, false, false, true]);
    }

    #[test]
    fn test_ask_prompts_once_per_candidate() {
        let clip = Clip::new("clip", 0.0, 1000.0)
            .with_effect(ramp_effect())
            .with_effect(Effect::new(PlugIn::simple("Tint", "tint")))
            .with_effect(blur_effect());

        let mut asked = Vec::new();
        let mut confirm = |index: usize, name: &str| {
            asked.push((index, name.to_string()));
            index == 2
        };
        let decisions = split_decisions(&clip, SplitPolicy::AskEachTime, &mut confirm);
        assert_eq!(decisions, vec![false, false, true]);
        assert_eq!(asked, vec![(0, "Glow".to_string()), (2, "Blur".to_string())]);
    }

    #[test]
    fn test_never_split_is_empty() {
        let clip = Clip::new("clip", 0.0, 1000.0).with_effect(ramp_effect());
        let mut confirm = |_: usize, _: &str| -> bool { panic!("must not ask") };
        assert!(split_decisions(&clip, SplitPolicy::NeverSplit, &mut confirm).is_empty());
    }

    #[test]
    fn test_bake_typed_parameter() {
        let source = Clip::new("clip", 0.0, 1000.0).with_effect(ramp_effect());
        let mut copy = source.duplicate();
        bake_effects(&mut copy, &source, &[true], 300.0);

        let param = copy.effects[0].parameter("Amount").unwrap();
        assert!(!param.animated);
        assert_eq!(param.keyframes.len(), 1);
        assert_eq!(param.keyframes[0].time, 0.0);
        assert_eq!(param.value, ParameterValue::Double(37.5));
        assert_eq!(param.sample_at(800.0), ParameterValue::Double(37.5));
    }

    #[test]
    fn test_bake_every_parameter_kind() {
        use ParameterValue as V;
        // (from, to, value at a quarter of the way)
        let rows = vec![
            (V::Boolean(false), V::Boolean(true), V::Boolean(false)),
            (V::Choice(1), V::Choice(4), V::Choice(1)),
            (V::Double(0.0), V::Double(100.0), V::Double(25.0)),
            (V::Integer(0), V::Integer(100), V::Integer(25)),
            (V::Double2D([0.0, 0.0]), V::Double2D([100.0, 200.0]), V::Double2D([25.0, 50.0])),
            (
                V::Double3D([0.0, 0.0, 0.0]),
                V::Double3D([100.0, 200.0, 400.0]),
                V::Double3D([25.0, 50.0, 100.0]),
            ),
            (V::Integer2D([0, 0]), V::Integer2D([100, 200]), V::Integer2D([25, 50])),
            (V::Integer3D([0, 0, 0]), V::Integer3D([100, 200, 400]), V::Integer3D([25, 50, 100])),
            (V::Rgb([0.0, 0.0, 0.0]), V::Rgb([1.0, 0.5, 0.0]), V::Rgb([0.25, 0.125, 0.0])),
            (
                V::Rgba([0.0, 0.0, 0.0, 1.0]),
                V::Rgba([1.0, 0.5, 0.0, 0.0]),
                V::Rgba([0.25, 0.125, 0.0, 0.75]),
            ),
            (V::String("a".into()), V::String("b".into()), V::String("a".into())),
            (V::Custom("x".into()), V::Custom("y".into()), V::Custom("x".into())),
        ];

        let mut effect = Effect::new(PlugIn::typed("Everything", "everything"));
        for (i, (from, to, _)) in rows.iter().enumerate() {
            effect.parameters.push(
                Parameter::new(format!("p{i}"), from.clone()).with_keyframes(vec![
                    Keyframe::new(0.0, from.clone()),
                    Keyframe::new(1000.0, to.clone()),
                ]),
            );
        }
        let source = Clip::new("clip", 0.0, 1000.0).with_effect(effect);
        let mut copy = source.duplicate();
        bake_effects(&mut copy, &source, &[true], 250.0);

        for (i, (from, _, expected)) in rows.iter().enumerate() {
            let param = copy.effects[0].parameter(&format!("p{i}")).unwrap();
            assert!(!param.animated, "{:?}", from.kind());
            assert_eq!(param.keyframes.len(), 1);
            assert_eq!(&param.value, expected, "{:?}", from.kind());
            assert_eq!(param.kind().is_interpolated(), from != expected);
        }
    }

    #[test]
    fn test_rejected_split_keeps_keyframes() {
        let source = Clip::new("clip", 0.0, 1000.0).with_effect(ramp_effect());
        let mut copy = source.duplicate();
        bake_effects(&mut copy, &source, &[false], 300.0);
        bake_effects(&mut copy, &source, &[], 300.0);

        let param = copy.effects[0].parameter("Amount").unwrap();
        assert!(param.animated);
        assert_eq!(param.keyframes.len(), 3);
    }

    #[test]
    fn test_bake_simple_keyframes() {
        let source = Clip::new("clip", 0.0, 1000.0).with_effect(blur_effect());
        let mut copy = source.duplicate();
        bake_effects(&mut copy, &source, &[true], 250.0);

        let effect = &copy.effects[0];
        assert_eq!(effect.keyframes.len(), 1);
        assert_eq!(effect.keyframes[0].time, 0.0);
        assert_eq!(effect.keyframes[0].value, ParameterValue::Double(0.25));
    }

    #[test]
    fn test_bake_skips_mismatched_plugin() {
        let source = Clip::new("clip", 0.0, 1000.0).with_effect(ramp_effect());
        let mut copy = source.duplicate();
        copy.effects[0].plugin = PlugIn::typed("Other", "other");
        bake_effects(&mut copy, &source, &[true], 300.0);
        assert_eq!(copy.effects[0].parameter("Amount").unwrap().keyframes.len(), 3);
    }
}
