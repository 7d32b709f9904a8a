use crate::foundation::error::{VitrineError, VitrineResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index on a sandbox instance's clock.
///
/// The clock starts at zero when the instance is mounted and only advances
/// while the instance is ticked; it is never shared between instances.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Frame index converted to seconds on the sandbox clock.
    pub fn as_secs(self) -> f64 {
        self.0 as f64 / TICK_RATE_HZ
    }

    /// The next frame.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Nominal sandbox tick rate in frames per second.
///
/// All animation timing and sampling windows are expressed against this rate,
/// mirroring a rendering engine's per-frame callback.
pub const TICK_RATE_HZ: f64 = 60.0;

/// A sandbox's viewport: the pixel area the fitted snippet must fill, plus
/// the padding the fit pass keeps clear around it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Padding in pixels kept clear on every side when fitting.
    pub padding: f64,
}

impl Viewport {
    /// Create a validated viewport.
    ///
    /// Padding must leave a nonzero area available, otherwise there is
    /// nothing to fit into.
    pub fn new(width: u32, height: u32, padding: f64) -> VitrineResult<Self> {
        if width == 0 || height == 0 {
            return Err(VitrineError::validation("viewport must have nonzero area"));
        }
        if !padding.is_finite() || padding < 0.0 {
            return Err(VitrineError::validation(
                "viewport padding must be finite and >= 0",
            ));
        }
        if 2.0 * padding >= f64::from(width) || 2.0 * padding >= f64::from(height) {
            return Err(VitrineError::validation(
                "viewport padding leaves no available area",
            ));
        }
        Ok(Self {
            width,
            height,
            padding,
        })
    }

    /// Width available to fitted content, i.e. `width - 2 * padding`.
    pub fn available_width(self) -> f64 {
        f64::from(self.width) - 2.0 * self.padding
    }

    /// Height available to fitted content, i.e. `height - 2 * padding`.
    pub fn available_height(self) -> f64 {
        f64::from(self.height) - 2.0 * self.padding
    }

    /// Center point of the viewport.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Full viewport rectangle at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            padding: 32.0,
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Scale this color's alpha by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let op = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;

        fn scale(c: u8, op: u8) -> u8 {
            ((u16::from(c) * u16::from(op) + 127) / 255) as u8
        }

        Self {
            r: scale(self.r, op),
            g: scale(self.g, op),
            b: scale(self.b, op),
            a: scale(self.a, op),
        }
    }

    /// Pack into an `[r, g, b, a]` byte array.
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
