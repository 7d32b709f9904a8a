//! The sandbox's retained element tree.
//!
//! The scene is a per-instance arena of measured boxes: each fragment
//! element gets a resting rectangle from a deterministic block layout, plus
//! whatever utility animations it (or an ancestor) carries. The fit engine
//! never sees markup, only `rect_at` samples of this scene over time.
//!
//! The layout is a minimal stand-in for the host platform's renderer: inline
//! `width`/`height`/`left`/`top` (px and %), `position: absolute`, the
//! utility sizing classes (`w-N`/`h-N`, 4 px per step, `w-full`/`h-full`),
//! block width defaulting to the container, block height to the stacked
//! content. Unknown styling classes simply do not size anything, which is
//! exactly the degraded behavior when the remote styling engine is
//! unreachable.

use kurbo::Size;
use smallvec::SmallVec;

use crate::foundation::core::{Affine, Point, Rect, Rgba8Premul, Viewport};
use crate::foundation::math::Fnv1a64;
use crate::markup::fragment::{Element, FragmentNode};
use crate::sandbox::anim::UtilityAnim;

/// Tags laid out as inline content (width from content, not container).
const INLINE_TAGS: &[&str] = &[
    "a", "b", "code", "em", "i", "label", "small", "span", "strong",
];

/// Replaced elements with the classic 300×150 default box.
const REPLACED_TAGS: &[&str] = &["canvas", "iframe", "svg", "video"];

/// Approximate glyph metrics for the sandbox's default UI font.
const TEXT_CHAR_ADVANCE: f64 = 8.0;
const TEXT_LINE_HEIGHT: f64 = 18.0;

/// An animation carried by a node or inherited from an ancestor.
///
/// `carrier` indexes the node whose resting rectangle anchors the animation
/// (its center for spins, its height for bounces).
#[derive(Clone, Copy, Debug)]
struct AnimRef {
    anim: UtilityAnim,
    carrier: usize,
}

/// One measured box of the scene.
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Tag name (`#text` for character data).
    pub tag: String,
    /// Resting layout rectangle, before any animation transform.
    pub rect: Rect,
    paint: Rgba8Premul,
    anims: SmallVec<[AnimRef; 1]>,
}

/// A sandbox instance's element tree, ready for per-frame measurement.
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    anim_epoch_secs: f64,
    tainted: bool,
}

impl Scene {
    /// Lay out a scanned fragment inside `viewport`.
    pub fn build(roots: &[FragmentNode], viewport: Viewport) -> Self {
        let mut builder = SceneBuilder {
            nodes: Vec::new(),
            tainted: false,
        };
        let container = Size::new(f64::from(viewport.width), f64::from(viewport.height));
        builder.layout_children(roots, Point::ORIGIN, container, &[]);
        Self {
            nodes: builder.nodes,
            anim_epoch_secs: 0.0,
            tainted: builder.tainted,
        }
    }

    /// Number of boxes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no boxes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The scene's boxes, parents before children.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Whether any box carries an animation.
    pub fn has_animations(&self) -> bool {
        self.nodes.iter().any(|n| !n.anims.is_empty())
    }

    /// Whether the scene contains content that taints a raster capture.
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Restart every animation timeline from frame zero at `now_secs`.
    pub fn restart_animations(&mut self, now_secs: f64) {
        self.anim_epoch_secs = now_secs;
    }

    /// The axis-aligned bounds of box `idx` at `now_secs` on the sandbox
    /// clock, with ancestor and own animation transforms applied.
    pub fn rect_at(&self, idx: usize, now_secs: f64) -> Rect {
        let node = &self.nodes[idx];
        if node.anims.is_empty() {
            return node.rect;
        }
        let local = (now_secs - self.anim_epoch_secs).max(0.0);
        let mut affine = Affine::IDENTITY;
        for spec in &node.anims {
            let pivot = self.nodes[spec.carrier].rect;
            affine = affine * spec.anim.geometry_at(local, pivot);
        }
        affine.transform_rect_bbox(node.rect)
    }

    /// Combined animation opacity of box `idx` at `now_secs`.
    pub fn opacity_at(&self, idx: usize, now_secs: f64) -> f64 {
        let node = &self.nodes[idx];
        let local = (now_secs - self.anim_epoch_secs).max(0.0);
        node.anims
            .iter()
            .map(|spec| spec.anim.opacity_at(local))
            .product()
    }

    /// Deterministic fill color of box `idx`.
    pub fn paint(&self, idx: usize) -> Rgba8Premul {
        self.nodes[idx].paint
    }
}

struct SceneBuilder {
    nodes: Vec<SceneNode>,
    tainted: bool,
}

impl SceneBuilder {
    /// Stack `children` top-to-bottom at `origin`; returns consumed height
    /// and widest extent.
    fn layout_children(
        &mut self,
        children: &[FragmentNode],
        origin: Point,
        container: Size,
        inherited: &[AnimRef],
    ) -> Size {
        let mut cursor_y = origin.y;
        let mut max_w = 0.0f64;
        for child in children {
            match child {
                FragmentNode::Text(text) => {
                    let w = (text.chars().count() as f64 * TEXT_CHAR_ADVANCE).min(container.width);
                    let rect =
                        Rect::new(origin.x, cursor_y, origin.x + w, cursor_y + TEXT_LINE_HEIGHT);
                    self.nodes.push(SceneNode {
                        tag: "#text".to_string(),
                        rect,
                        paint: Rgba8Premul::from_straight_rgba(148, 163, 184, 255),
                        anims: SmallVec::from_slice(inherited),
                    });
                    cursor_y += TEXT_LINE_HEIGHT;
                    max_w = max_w.max(w);
                }
                FragmentNode::Element(element) => {
                    let size = self.layout_element(
                        element,
                        Point::new(origin.x, cursor_y),
                        container,
                        inherited,
                    );
                    if let Some(size) = size {
                        cursor_y += size.height;
                        max_w = max_w.max(size.width);
                    }
                }
            }
        }
        Size::new(max_w, cursor_y - origin.y)
    }

    /// Lay out one element; returns the flow size it consumed (`None` for
    /// out-of-flow boxes).
    fn layout_element(
        &mut self,
        element: &Element,
        flow_origin: Point,
        container: Size,
        inherited: &[AnimRef],
    ) -> Option<Size> {
        if matches!(element.tag.as_str(), "script" | "style" | "link" | "meta") {
            // Non-visual by definition; scripts and styles never measure.
            return Some(Size::ZERO);
        }
        self.note_taint(element);

        let absolute = element
            .style_prop("position")
            .is_some_and(|p| p.eq_ignore_ascii_case("absolute") || p.eq_ignore_ascii_case("fixed"));
        let origin = if absolute {
            let left = resolve_length(element, "left", "", container.width).unwrap_or(0.0);
            let top = resolve_length(element, "top", "", container.height).unwrap_or(0.0);
            Point::new(flow_origin.x + left, flow_origin.y + top)
        } else {
            flow_origin
        };

        let explicit_w = resolve_length(element, "width", "w", container.width);
        let explicit_h = resolve_length(element, "height", "h", container.height);
        let is_inline = INLINE_TAGS.contains(&element.tag.as_str());
        let is_replaced = REPLACED_TAGS.contains(&element.tag.as_str());

        let resolved_w = explicit_w.or_else(|| {
            if is_replaced {
                Some(300.0)
            } else if is_inline || element.tag == "img" {
                None
            } else {
                Some(container.width)
            }
        });
        let resolved_h = explicit_h.or_else(|| {
            if is_replaced {
                Some(150.0)
            } else {
                None
            }
        });

        // Reserve the element's slot so children index it as their animation
        // carrier, then lay children out inside it.
        let idx = self.nodes.len();
        self.nodes.push(SceneNode {
            tag: element.tag.clone(),
            rect: Rect::ZERO,
            paint: paint_for(element),
            anims: SmallVec::new(),
        });
        let mut anims: SmallVec<[AnimRef; 1]> = SmallVec::from_slice(inherited);
        if let Some(anim) = own_animation(element) {
            anims.push(AnimRef { anim, carrier: idx });
        }
        self.nodes[idx].anims = anims.clone();

        let child_container = Size::new(resolved_w.unwrap_or(container.width), container.height);
        let content = self.layout_children(&element.children, origin, child_container, &anims);

        let width = resolved_w.unwrap_or(content.width);
        let height = resolved_h.unwrap_or(content.height);
        self.nodes[idx].rect = Rect::new(origin.x, origin.y, origin.x + width, origin.y + height);

        if absolute {
            None
        } else {
            Some(Size::new(width, height))
        }
    }

    fn note_taint(&mut self, element: &Element) {
        if !matches!(element.tag.as_str(), "img" | "video" | "iframe") {
            return;
        }
        if let Some(src) = element.attr("src") {
            let lower = src.trim().to_ascii_lowercase();
            if lower.starts_with("http://") || lower.starts_with("https://") {
                self.tainted = true;
            }
        }
    }
}

/// Resolve an element's length along one axis from its inline style, sizing
/// classes, or presentational attribute.
fn resolve_length(
    element: &Element,
    style_name: &str,
    class_prefix: &str,
    container: f64,
) -> Option<f64> {
    if let Some(value) = element.style_prop(style_name)
        && let Some(px) = parse_css_length(&value, container)
    {
        return Some(px);
    }
    if !class_prefix.is_empty()
        && let Some(px) = sizing_class(element, class_prefix, container)
    {
        return Some(px);
    }
    if matches!(style_name, "width" | "height")
        && let Some(value) = element.attr(style_name)
        && let Ok(px) = value.trim().parse::<f64>()
    {
        return Some(px);
    }
    None
}

/// `w-6` → 24 px, `w-px` → 1 px, `w-full` → container.
fn sizing_class(element: &Element, prefix: &str, container: f64) -> Option<f64> {
    for class in element.classes() {
        let Some(suffix) = class.strip_prefix(prefix).and_then(|s| s.strip_prefix('-')) else {
            continue;
        };
        match suffix {
            "full" | "screen" => return Some(container),
            "px" => return Some(1.0),
            _ => {
                if let Ok(steps) = suffix.parse::<u32>() {
                    return Some(f64::from(steps) * 4.0);
                }
            }
        }
    }
    None
}

fn parse_css_length(value: &str, container: f64) -> Option<f64> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok().map(|p| p / 100.0 * container);
    }
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok()
}

fn own_animation(element: &Element) -> Option<UtilityAnim> {
    if let Some(anim) = element.classes().find_map(UtilityAnim::from_class) {
        return Some(anim);
    }
    element
        .style_prop("animation")
        .or_else(|| element.style_prop("animation-name"))
        .and_then(|v| UtilityAnim::from_animation_value(&v))
}

/// Deterministic per-element fill derived from tag and classes, so repeated
/// renders of one snippet rasterize identically.
fn paint_for(element: &Element) -> Rgba8Premul {
    let mut hash = Fnv1a64::new_default();
    hash.write_str(&element.tag);
    for class in element.classes() {
        hash.write_str(class);
    }
    let h = hash.finish();
    let r = 72 + (h & 0x7f) as u8;
    let g = 72 + ((h >> 8) & 0x7f) as u8;
    let b = 72 + ((h >> 16) & 0x7f) as u8;
    Rgba8Premul::from_straight_rgba(r, g, b, 255)
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/scene.rs"]
mod tests;
