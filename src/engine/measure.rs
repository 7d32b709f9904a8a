//! Bounding-box measurement over a sandbox scene.
//!
//! The engine never needs to know what the snippet *is*, only where its
//! rendered boxes are. Measurement visits every box and accumulates the
//! running extremes; boxes with zero width and zero height are treated as
//! non-visual and excluded. A snippet with nothing visible degenerates to
//! `None`, which the fit pass maps to the identity transform; measurement
//! itself can never fail.

use crate::foundation::core::Rect;
use crate::sandbox::scene::Scene;

/// Running extremes of a set of rectangles.
#[derive(Clone, Copy, Debug)]
pub struct BoundsAccumulator {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    any: bool,
}

impl BoundsAccumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            any: false,
        }
    }

    /// Fold one rendered rectangle into the extremes.
    ///
    /// Rectangles with zero width and zero height are non-visual and
    /// ignored.
    pub fn include(&mut self, rect: Rect) {
        if rect.width() == 0.0 && rect.height() == 0.0 {
            return;
        }
        self.min_x = self.min_x.min(rect.x0);
        self.min_y = self.min_y.min(rect.y0);
        self.max_x = self.max_x.max(rect.x1);
        self.max_y = self.max_y.max(rect.y1);
        self.any = true;
    }

    /// Fold another accumulator's extremes into this one.
    pub fn union(&mut self, other: &Self) {
        if other.any {
            self.include(Rect::new(other.min_x, other.min_y, other.max_x, other.max_y));
        }
    }

    /// The accumulated bounding box, or `None` when nothing visual was seen.
    pub fn finish(&self) -> Option<Rect> {
        self.any
            .then(|| Rect::new(self.min_x, self.min_y, self.max_x, self.max_y))
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Measure the instantaneous bounding box of every visual element in the
/// scene at `now_secs`.
pub fn measure_scene(scene: &Scene, now_secs: f64) -> Option<Rect> {
    let mut acc = BoundsAccumulator::new();
    for idx in 0..scene.len() {
        acc.include(scene.rect_at(idx, now_secs));
    }
    acc.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/measure.rs"]
mod tests;
