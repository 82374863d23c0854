//! World scanner: page geometry in, collision blocks out.
//!
//! The scanner only reads measurements. It never writes to the page, so
//! repeated scans of the same layout produce the same world.

use crate::api::config::ScanConfig;
use crate::components::block::Block;

/// Tags that never become terrain: document structure, metadata, scripts,
/// SVG internals and embedded frames.
const EXCLUDED_TAGS: &[&str] = &[
    "html", "head", "body", "meta", "link", "title", "style", "script", "noscript",
    "template", "base", "br", "wbr",
    "path", "g", "circle", "ellipse", "line", "polyline", "polygon", "rect", "defs",
    "use", "symbol", "clippath", "mask", "lineargradient", "radialgradient", "stop",
    "tspan", "textpath", "pattern", "filter", "marker",
    "iframe",
];

/// A measured rectangle in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// One candidate element as reported by a geometry source.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSample {
    /// Tag name, any case.
    pub tag: String,
    /// Bounding rectangle relative to the viewport.
    pub rect: Rect,
    /// Raw effective stacking order, e.g. `"auto"` or `"12"`.
    pub stacking_order: String,
    /// Rendered at all (not `display: none`, `visibility: hidden`, or fully transparent).
    pub visible: bool,
    /// Part of the game's own overlay.
    pub overlay: bool,
}

impl ElementSample {
    pub fn new(tag: impl Into<String>, rect: Rect) -> Self {
        Self {
            tag: tag.into(),
            rect,
            stacking_order: String::from("auto"),
            visible: true,
            overlay: false,
        }
    }

    pub fn with_stacking_order(mut self, value: impl Into<String>) -> Self {
        self.stacking_order = value.into();
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Scroll position and size of the visible window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything the scanner needs from one look at the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub viewport: Viewport,
    /// Full scrollable document size.
    pub document_width: f32,
    pub document_height: f32,
    pub elements: Vec<ElementSample>,
}

/// Anything that can measure the page on demand: the live DOM, an
/// accessibility tree, or a fixture in tests.
pub trait GeometrySource {
    fn snapshot(&mut self) -> PageSnapshot;
}

impl GeometrySource for PageSnapshot {
    fn snapshot(&mut self) -> PageSnapshot {
        self.clone()
    }
}

/// Why elements were kept or dropped during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub sampled: usize,
    pub kept: usize,
    pub rejected_tag: usize,
    pub rejected_hidden: usize,
    pub rejected_size: usize,
    pub rejected_offscreen: usize,
    /// Eligible elements dropped because `max_elements` was reached.
    pub rejected_capacity: usize,
}

/// Turn a raw stacking-order value into a block height.
///
/// Anything that is not a finite non-negative number counts as 0; the result
/// is clamped to `max`.
pub fn parse_stacking_order(raw: &str, max: f32) -> f32 {
    let value = raw.trim().parse::<f32>().unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return 0.0;
    }
    value.min(max.max(0.0))
}

pub fn is_excluded_tag(tag: &str) -> bool {
    EXCLUDED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Blocks from a snapshot. Eligible elements come first in document order,
/// at most `max_elements` of them; the ground block is always last.
pub fn scan_page(snapshot: &PageSnapshot, config: &ScanConfig) -> (Vec<Block>, ScanStats) {
    let mut stats = ScanStats {
        sampled: snapshot.elements.len(),
        ..Default::default()
    };
    let mut blocks = Vec::with_capacity(snapshot.elements.len() / 4 + 1);
    let view = &snapshot.viewport;
    let margin = config.viewport_margin;

    for element in &snapshot.elements {
        if is_excluded_tag(&element.tag) {
            stats.rejected_tag += 1;
            continue;
        }
        if !element.visible || element.overlay {
            stats.rejected_hidden += 1;
            continue;
        }
        let rect = element.rect;
        if !(rect.width >= config.min_element_size && rect.height >= config.min_element_size) {
            stats.rejected_size += 1;
            continue;
        }
        let offscreen = rect.x + rect.width < -margin
            || rect.y + rect.height < -margin
            || rect.x > view.width + margin
            || rect.y > view.height + margin;
        if offscreen {
            stats.rejected_offscreen += 1;
            continue;
        }
        if blocks.len() >= config.max_elements {
            stats.rejected_capacity += 1;
            continue;
        }

        blocks.push(Block::new(
            rect.x + view.scroll_x,
            rect.y + view.scroll_y,
            parse_stacking_order(&element.stacking_order, config.max_stacking_order),
            rect.width,
            rect.height,
            config.block_depth,
        ));
    }
    stats.kept = blocks.len();

    blocks.push(ground_block(snapshot));
    (blocks, stats)
}

/// Zero-thickness plane at z = 0 covering the whole document (or viewport,
/// whichever is larger).
pub fn ground_block(snapshot: &PageSnapshot) -> Block {
    let width = snapshot.document_width.max(snapshot.viewport.width).max(0.0);
    let height = snapshot.document_height.max(snapshot.viewport.height).max(0.0);
    Block::new(0.0, 0.0, 0.0, width, height, 0.0)
}
