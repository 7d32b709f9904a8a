//! Scale-and-center math for fitting measured content into a viewport.
//!
//! The fit is two independent transforms, matching the two wrapper elements
//! in the sandbox document: an outer translation moves the measured center
//! onto the viewport center, then a uniform scale about the viewport center
//! shrinks oversized content into the available area. Keeping them separate
//! means the scale's origin never interacts with the centering math.

use crate::foundation::core::{Affine, Point, Rect, Vec2, Viewport};

/// A computed fit: uniform scale plus centering translation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitTransform {
    /// Uniform shrink factor, always in `(0, 1]`. The engine only
    /// down-scales oversized content, never magnifies.
    pub scale: f64,
    /// Translation moving the measured-box center to the viewport center.
    pub translate: Vec2,
}

impl FitTransform {
    /// No scaling, no translation.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::new(0.0, 0.0),
    };

    /// Fit a measured bounding box into the viewport.
    ///
    /// `None` (nothing measurable) degenerates to the identity transform:
    /// scale 1, translation 0.
    pub fn fit(bounds: Option<Rect>, viewport: Viewport) -> Self {
        let Some(bounds) = bounds else {
            return Self::IDENTITY;
        };
        let (w, h) = (bounds.width(), bounds.height());
        if w <= 0.0 && h <= 0.0 {
            return Self::IDENTITY;
        }

        let ratio_w = if w > 0.0 {
            viewport.available_width() / w
        } else {
            f64::INFINITY
        };
        let ratio_h = if h > 0.0 {
            viewport.available_height() / h
        } else {
            f64::INFINITY
        };
        Self {
            scale: ratio_w.min(ratio_h).min(1.0),
            translate: center_translation(bounds, viewport),
        }
    }

    /// Keep the scale, update only the centering translation for a new
    /// instantaneous bounding box.
    ///
    /// This is the per-frame path: recomputing scale while an animation
    /// plays would produce visible size jitter, so playback only ever
    /// re-centers.
    pub fn recentered(self, bounds: Option<Rect>, viewport: Viewport) -> Self {
        match bounds {
            Some(bounds) => Self {
                scale: self.scale,
                translate: center_translation(bounds, viewport),
            },
            None => self,
        }
    }

    /// The combined affine this fit applies to sandbox content: translation
    /// first, then scale about the viewport center.
    pub fn to_affine(self, viewport: Viewport) -> Affine {
        let c = viewport.center().to_vec2();
        Affine::translate(c)
            * Affine::scale(self.scale)
            * Affine::translate(-c)
            * Affine::translate(self.translate)
    }
}

fn center_translation(bounds: Rect, viewport: Viewport) -> Vec2 {
    let center: Point = bounds.center();
    viewport.center() - center
}

#[cfg(test)]
#[path = "../../tests/unit/engine/fit.rs"]
mod tests;
