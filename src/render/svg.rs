//! SVG assembly from per-layer primitive buffers

use std::collections::HashMap;

use super::{SvgConfig, Viewport};

/// Collects SVG primitives into per-layer buffers and assembles the final
/// document with layer groups in style order
pub struct SvgBuilder {
    config: SvgConfig,
    layers: HashMap<String, Vec<String>>,
    seen: Vec<String>,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            layers: HashMap::new(),
            seen: Vec::new(),
        }
    }

    pub fn config(&self) -> &SvgConfig {
        &self.config
    }

    /// Format a number with the configured precision
    pub fn fmt(&self, value: f64) -> String {
        fmt_number(value, self.config.precision)
    }

    fn buffer(&mut self, layer: &str) -> &mut Vec<String> {
        if !self.layers.contains_key(layer) {
            self.seen.push(layer.to_string());
        }
        self.layers.entry(layer.to_string()).or_default()
    }

    /// Add a circle element
    pub fn add_circle(&mut self, layer: &str, cx: f64, cy: f64, r: f64, fill: &str) {
        let element = format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            self.fmt(cx),
            self.fmt(cy),
            self.fmt(r),
            fill
        );
        self.buffer(layer).push(element);
    }

    /// Add an embedded image element
    pub fn add_image(&mut self, layer: &str, href: &str, x: f64, y: f64, w: f64, h: f64) {
        let element = format!(
            r#"<image x="{}" y="{}" width="{}" height="{}" href="{}"/>"#,
            self.fmt(x),
            self.fmt(y),
            self.fmt(w),
            self.fmt(h),
            href
        );
        self.buffer(layer).push(element);
    }

    /// Add a text element; `attrs` carries everything beyond position
    pub fn add_text(&mut self, layer: &str, text: &str, x: f64, y: f64, attrs: &str) {
        let element = format!(
            r#"<text x="{}" y="{}"{}>{}</text>"#,
            self.fmt(x),
            self.fmt(y),
            attrs,
            escape_xml(text)
        );
        self.buffer(layer).push(element);
    }

    /// Add a path element from a prebuilt `d` attribute
    pub fn add_path(&mut self, layer: &str, d: &str, attrs: &str) {
        let element = format!(r#"<path d="{}"{}/>"#, d, attrs);
        self.buffer(layer).push(element);
    }

    /// Add a polygon element from a prebuilt points list
    pub fn add_polygon(&mut self, layer: &str, points: &str, attrs: &str) {
        let element = format!(r#"<polygon points="{}"{}/>"#, points, attrs);
        self.buffer(layer).push(element);
    }

    /// Build the final SVG string.
    ///
    /// Layer groups are emitted in `layer_order`; buffered layers missing
    /// from it follow in first-seen order. Layers without primitives
    /// produce no group.
    pub fn build(self, viewport: &Viewport, layer_order: &[String]) -> String {
        let mut svg = String::new();

        if self.config.xml_declaration {
            svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            self.fmt(viewport.min_x),
            self.fmt(viewport.min_y),
            self.fmt(viewport.view_width),
            self.fmt(viewport.view_height),
            self.fmt(viewport.pixel_width),
            self.fmt(viewport.pixel_height),
        ));
        svg.push('\n');

        let trailing = self
            .seen
            .iter()
            .filter(|id| !layer_order.contains(*id))
            .cloned()
            .collect::<Vec<String>>();

        for id in layer_order.iter().chain(trailing.iter()) {
            let Some(primitives) = self.layers.get(id) else {
                continue;
            };
            svg.push_str(&format!("<g id=\"{}\">\n", escape_xml(id)));
            for primitive in primitives {
                svg.push_str(primitive);
                svg.push('\n');
            }
            svg.push_str("</g>\n");
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Format a number with fixed precision, trimming trailing zeros
fn fmt_number(value: f64, precision: u8) -> String {
    let s = format!("{:.*}", usize::from(precision), value);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
