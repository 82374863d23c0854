use pageclimb_engine::{ElementSample, GeometrySource, PageSnapshot, Rect, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Window};

/// Elements inside a subtree marked with this attribute belong to the game
/// overlay and are never measured as terrain.
pub const OVERLAY_SELECTOR: &str = "[data-pageclimb-overlay]";

/// Measures the live document.
pub struct DomGeometrySource {
    window: Window,
    document: Document,
    /// Last successful measurement, reused when the page cannot be read.
    last: PageSnapshot,
}

impl DomGeometrySource {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            window,
            document,
            last: PageSnapshot::default(),
        })
    }

    fn try_snapshot(&self) -> Result<PageSnapshot, JsValue> {
        let viewport = Viewport {
            scroll_x: self.window.scroll_x()? as f32,
            scroll_y: self.window.scroll_y()? as f32,
            width: number(self.window.inner_width()?),
            height: number(self.window.inner_height()?),
        };
        let (document_width, document_height) = match self.document.document_element() {
            Some(root) => (root.scroll_width() as f32, root.scroll_height() as f32),
            None => (viewport.width, viewport.height),
        };

        let nodes = self.document.query_selector_all("body *")?;
        let mut elements = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            elements.push(self.sample(&element)?);
        }

        Ok(PageSnapshot {
            viewport,
            document_width,
            document_height,
            elements,
        })
    }

    fn sample(&self, element: &Element) -> Result<ElementSample, JsValue> {
        let tag = element.tag_name().to_ascii_lowercase();
        let r = element.get_bounding_client_rect();
        let rect = Rect::new(r.x() as f32, r.y() as f32, r.width() as f32, r.height() as f32);

        let visible = match self.window.get_computed_style(element)? {
            Some(style) => {
                let display = style.get_property_value("display")?;
                let visibility = style.get_property_value("visibility")?;
                let opacity = style
                    .get_property_value("opacity")?
                    .trim()
                    .parse::<f32>()
                    .unwrap_or(1.0);
                display != "none" && visibility != "hidden" && visibility != "collapse" && opacity > 0.0
            }
            None => false,
        };
        let overlay = element.closest(OVERLAY_SELECTOR)?.is_some();

        Ok(ElementSample::new(tag, rect)
            .with_stacking_order(self.stacking_order(element)?)
            .with_visible(visible)
            .with_overlay(overlay))
    }

    /// The z-index that actually applies: the element's own numeric value, or
    /// the nearest ancestor's. `auto` everywhere up the chain means "auto".
    fn stacking_order(&self, element: &Element) -> Result<String, JsValue> {
        let mut current = Some(element.clone());
        while let Some(el) = current {
            if let Some(style) = self.window.get_computed_style(&el)? {
                let value = style.get_property_value("z-index")?;
                if value.trim().parse::<f32>().is_ok() {
                    return Ok(value);
                }
            }
            current = el.parent_element();
        }
        Ok("auto".to_string())
    }
}

impl GeometrySource for DomGeometrySource {
    fn snapshot(&mut self) -> PageSnapshot {
        match self.try_snapshot() {
            Ok(snapshot) => {
                self.last = snapshot.clone();
                snapshot
            }
            Err(err) => {
                log::warn!("page measurement failed, reusing previous layout: {:?}", err);
                self.last.clone()
            }
        }
    }
}

fn number(value: JsValue) -> f32 {
    value.as_f64().unwrap_or(0.0) as f32
}
