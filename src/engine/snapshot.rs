//! Static raster capture of a sandbox's rendered frame.
//!
//! A snapshot stands in for a paused live sandbox, so idle previews cost
//! nothing per frame. The whole document is rasterized (background gradient
//! included, not just the snippet subtree) at a fixed supersampling factor
//! for crisper output than the viewport's pixel size, then encoded as a PNG
//! data URL the host can composite anywhere. Cross-origin media inside the
//! snippet taints the surface; capture then fails and the caller decides how
//! to degrade.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageEncoder as _;
use rayon::prelude::*;

use crate::engine::fit::FitTransform;
use crate::foundation::core::{Rgba8Premul, Viewport};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::foundation::math::{mul_div255_u16, over};
use crate::sandbox::document::VisualTheme;
use crate::sandbox::scene::Scene;

/// Fixed supersampling factor for captured rasters.
pub const SUPERSAMPLE: u32 = 2;

/// A captured raster of a sandbox's last rendered frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    /// Raster width in pixels (viewport width × supersample).
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// The encoded image as a `data:image/png;base64,…` URL.
    pub data_url: String,
}

impl Snapshot {
    /// Decode the PNG bytes back out of the data URL.
    pub fn png_bytes(&self) -> VitrineResult<Vec<u8>> {
        let payload = self
            .data_url
            .strip_prefix("data:image/png;base64,")
            .ok_or_else(|| VitrineError::serde("snapshot data URL has unexpected prefix"))?;
        BASE64
            .decode(payload)
            .map_err(|e| VitrineError::serde(format!("snapshot base64: {e}")))
    }
}

/// Rasterize the sandbox document at `now_secs` with the given fit applied.
///
/// Fails with [`VitrineError::Capture`] when the scene contains content that
/// taints the raster surface.
pub fn capture(
    scene: &Scene,
    now_secs: f64,
    fit: FitTransform,
    viewport: Viewport,
    theme: VisualTheme,
) -> VitrineResult<Snapshot> {
    if scene.is_tainted() {
        return Err(VitrineError::capture(
            "raster surface tainted by cross-origin content",
        ));
    }

    let width = viewport.width * SUPERSAMPLE;
    let height = viewport.height * SUPERSAMPLE;
    let mut pixels = vec![0u8; width as usize * height as usize * 4];

    // Background gradient, top stop to bottom stop; rows are independent.
    let (top, bottom) = theme.background_stops();
    let row_bytes = width as usize * 4;
    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let t = y as f64 / (height.max(2) - 1) as f64;
            let color = lerp_premul(top, bottom, t).to_bytes();
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        });

    // Content boxes in tree order, fitted into viewport space.
    let affine = fit.to_affine(viewport);
    let ss = f64::from(SUPERSAMPLE);
    for idx in 0..scene.len() {
        let rect = affine.transform_rect_bbox(scene.rect_at(idx, now_secs));
        if rect.width() == 0.0 && rect.height() == 0.0 {
            continue;
        }
        let paint = scene.paint(idx).with_opacity(scene.opacity_at(idx, now_secs));
        let src = paint.to_bytes();

        let x0 = ((rect.x0 * ss).floor().max(0.0) as usize).min(width as usize);
        let x1 = ((rect.x1 * ss).ceil().max(0.0) as usize).min(width as usize);
        let y0 = ((rect.y0 * ss).floor().max(0.0) as usize).min(height as usize);
        let y1 = ((rect.y1 * ss).ceil().max(0.0) as usize).min(height as usize);
        for y in y0..y1 {
            let row = &mut pixels[y * row_bytes..(y + 1) * row_bytes];
            for px in row[x0 * 4..x1 * 4].chunks_exact_mut(4) {
                let out = over([px[0], px[1], px[2], px[3]], src);
                px.copy_from_slice(&out);
            }
        }
    }

    encode_png(&mut pixels, width, height)
}

/// Un-premultiply in place and encode as a PNG data URL.
fn encode_png(pixels: &mut [u8], width: u32, height: u32) -> VitrineResult<Snapshot> {
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3];
        if a != 0 && a != 255 {
            for c in px.iter_mut().take(3) {
                *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            }
        }
    }

    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(pixels, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| VitrineError::capture(format!("png encode: {e}")))?;

    Ok(Snapshot {
        width,
        height,
        data_url: format!("data:image/png;base64,{}", BASE64.encode(&png)),
    })
}

fn lerp_premul(a: Rgba8Premul, b: Rgba8Premul, t: f64) -> Rgba8Premul {
    let tt = (t.clamp(0.0, 1.0) * 255.0).round() as u16;
    let it = 255 - tt;

    fn mix(a: u8, b: u8, it: u16, tt: u16) -> u8 {
        (mul_div255_u16(u16::from(a), it) + mul_div255_u16(u16::from(b), tt)).min(255) as u8
    }

    Rgba8Premul {
        r: mix(a.r, b.r, it, tt),
        g: mix(a.g, b.g, it, tt),
        b: mix(a.b, b.b, it, tt),
        a: mix(a.a, b.a, it, tt),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/snapshot.rs"]
mod tests;
