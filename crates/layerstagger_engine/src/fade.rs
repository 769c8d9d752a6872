// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fade envelope evaluation.

use layerstagger_timeline::CurveType;

/// Eased fade amplitude at progress `t` in `[0, 1]`.
///
/// `Slow` and `Fast` trade places on a fade-out so both ends of a clip read
/// the same curve when mirrored.
pub fn fade_curve(t: f64, curve: CurveType, fade_out: bool) -> f32 {
    let (square, inverse_square) = if fade_out {
        (CurveType::Fast, CurveType::Slow)
    } else {
        (CurveType::Slow, CurveType::Fast)
    };

    let value = if curve == square {
        t * t
    } else if curve == inverse_square {
        t * (2.0 - t)
    } else {
        match curve {
            CurveType::Smooth => t * t * (3.0 - 2.0 * t),
            CurveType::Sharp => 4.0 * (t - 0.5).powi(3) + 0.5,
            _ => t,
        }
    };
    value as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [CurveType; 6] = [
        CurveType::Hold,
        CurveType::Linear,
        CurveType::Fast,
        CurveType::Slow,
        CurveType::Smooth,
        CurveType::Sharp,
    ];

    #[test]
    fn test_endpoints_for_every_curve() {
        for curve in CURVES {
            for fade_out in [false, true] {
                assert_eq!(fade_curve(0.0, curve, fade_out), 0.0, "{curve:?}");
                assert_eq!(fade_curve(1.0, curve, fade_out), 1.0, "{curve:?}");
            }
        }
    }

    #[test]
    fn test_symmetric_curves_pass_through_midpoint() {
        for curve in [CurveType::Hold, CurveType::Linear, CurveType::Smooth, CurveType::Sharp] {
            for fade_out in [false, true] {
                assert_eq!(fade_curve(0.5, curve, fade_out), 0.5, "{curve:?}");
            }
        }
        // The quadratic curves bend away from the diagonal
        assert_eq!(fade_curve(0.5, CurveType::Slow, false), 0.25);
        assert_eq!(fade_curve(0.5, CurveType::Fast, false), 0.75);
    }

    #[test]
    fn test_smooth_formula() {
        for t in [0.1, 0.25, 0.8] {
            let expected = (t * t * (3.0 - 2.0 * t)) as f32;
            assert_eq!(fade_curve(t, CurveType::Smooth, false), expected);
        }
    }

    #[test]
    fn test_slow_and_fast_swap_on_fade_out() {
        assert_eq!(fade_curve(0.2, CurveType::Slow, false), 0.04_f64 as f32);
        assert_eq!(fade_curve(0.2, CurveType::Fast, true), 0.04_f64 as f32);
        assert_eq!(fade_curve(0.2, CurveType::Fast, false), 0.36_f64 as f32);
        assert_eq!(fade_curve(0.2, CurveType::Slow, true), 0.36_f64 as f32);
    }

    #[test]
    fn test_sharp_formula() {
        let t = 0.75_f64;
        assert_eq!(fade_curve(t, CurveType::Sharp, false), (4.0 * 0.25_f64.powi(3) + 0.5) as f32);
    }
}
