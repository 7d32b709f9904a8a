//! Keyframe animation primitives available inside every sandbox document.
//!
//! The remote utility-styling engine does not guarantee runtime keyframe
//! availability inside an isolated document, so the handful of utility
//! animations snippet markup may reference (`spin`, `ping`, `pulse`,
//! `bounce`) are re-declared locally and evaluated here, with the standard
//! timing curves.

use crate::foundation::core::{Affine, Rect, Vec2};

/// Timing function mapping normalized keyframe progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Timing {
    /// Linear interpolation.
    Linear,
    /// CSS cubic-bezier timing with control points `(x1, y1)` and `(x2, y2)`.
    Bezier(CubicBezier),
}

impl Timing {
    /// Apply this timing function to progress `t` in `[0, 1]`.
    pub(crate) fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Bezier(b) => b.eval(t),
        }
    }
}

/// A CSS `cubic-bezier(x1, y1, x2, y2)` easing curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CubicBezier {
    pub(crate) x1: f64,
    pub(crate) y1: f64,
    pub(crate) x2: f64,
    pub(crate) y2: f64,
}

impl CubicBezier {
    /// Solve the curve for input progress `x`, returning eased progress.
    ///
    /// The curve is parametric; `x(t)` is monotonic for valid control points
    /// so a fixed-iteration bisection is enough at sub-pixel precision.
    pub(crate) fn eval(self, x: f64) -> f64 {
        fn component(p1: f64, p2: f64, t: f64) -> f64 {
            let inv = 1.0 - t;
            3.0 * inv * inv * t * p1 + 3.0 * inv * t * t * p2 + t * t * t
        }

        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let (mut lo, mut hi) = (0.0f64, 1.0f64);
        let mut t = x;
        for _ in 0..24 {
            let cx = component(self.x1, self.x2, t);
            if cx < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        component(self.y1, self.y2, t)
    }
}

/// The utility animation classes the sandbox declares locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityAnim {
    /// Full rotation about the element center, 1 s linear.
    Spin,
    /// Scale from 1× to 2× with a fade-out, 1 s.
    Ping,
    /// Opacity dip to 0.5 and back, 2 s. No geometry change.
    Pulse,
    /// Vertical bob by a quarter of the element height, 1 s.
    Bounce,
}

impl UtilityAnim {
    /// Recognize a utility animation class (`animate-spin`, ...).
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "animate-spin" => Some(Self::Spin),
            "animate-ping" => Some(Self::Ping),
            "animate-pulse" => Some(Self::Pulse),
            "animate-bounce" => Some(Self::Bounce),
            _ => None,
        }
    }

    /// Recognize a keyframe name inside an inline `animation:` declaration,
    /// e.g. `animation: spin 2s linear infinite`.
    pub fn from_animation_value(value: &str) -> Option<Self> {
        value.split_ascii_whitespace().find_map(|token| match token {
            "spin" => Some(Self::Spin),
            "ping" => Some(Self::Ping),
            "pulse" => Some(Self::Pulse),
            "bounce" => Some(Self::Bounce),
            _ => None,
        })
    }

    /// Animation cycle length in seconds.
    pub fn period_secs(self) -> f64 {
        match self {
            Self::Spin | Self::Ping | Self::Bounce => 1.0,
            Self::Pulse => 2.0,
        }
    }

    /// Geometry transform this animation applies to an element whose resting
    /// rectangle is `rect`, `secs` after its timeline started.
    pub fn geometry_at(self, secs: f64, rect: Rect) -> Affine {
        let p = cycle_progress(secs, self.period_secs());
        let center = rect.center();
        match self {
            Self::Spin => Affine::rotate_about(p * std::f64::consts::TAU, center),
            Self::Ping => {
                // Reaches 2x scale at 75% of the cycle and holds.
                let eased = Timing::Bezier(CubicBezier {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 0.2,
                    y2: 1.0,
                })
                .apply((p / 0.75).min(1.0));
                let s = 1.0 + eased;
                Affine::translate(center.to_vec2())
                    * Affine::scale(s)
                    * Affine::translate(-center.to_vec2())
            }
            Self::Pulse => Affine::IDENTITY,
            Self::Bounce => {
                // Raised by a quarter height at the cycle ends, grounded at
                // the midpoint, with the standard asymmetric easings.
                let lift = 0.25 * rect.height();
                let dy = if p < 0.5 {
                    let eased = Timing::Bezier(CubicBezier {
                        x1: 0.8,
                        y1: 0.0,
                        x2: 1.0,
                        y2: 1.0,
                    })
                    .apply(p / 0.5);
                    -lift * (1.0 - eased)
                } else {
                    let eased = Timing::Bezier(CubicBezier {
                        x1: 0.0,
                        y1: 0.0,
                        x2: 0.2,
                        y2: 1.0,
                    })
                    .apply((p - 0.5) / 0.5);
                    -lift * eased
                };
                Affine::translate(Vec2::new(0.0, dy))
            }
        }
    }

    /// Opacity factor at `secs` after the timeline started.
    pub fn opacity_at(self, secs: f64) -> f64 {
        let p = cycle_progress(secs, self.period_secs());
        match self {
            Self::Spin | Self::Bounce => 1.0,
            Self::Ping => 1.0 - (p / 0.75).min(1.0),
            Self::Pulse => {
                let eased = Timing::Bezier(CubicBezier {
                    x1: 0.4,
                    y1: 0.0,
                    x2: 0.6,
                    y2: 1.0,
                })
                .apply(if p < 0.5 { p / 0.5 } else { (1.0 - p) / 0.5 });
                1.0 - 0.5 * eased
            }
        }
    }
}

fn cycle_progress(secs: f64, period: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    (secs / period).fract()
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/anim.rs"]
mod tests;
