//! Style layer descriptors attached to rendered features.
//!
//! Paint and layout properties are kept as opaque JSON maps, the way the
//! map engine hands them over. The renderer reads the handful of keys it
//! understands through the typed accessors here; a key that is absent or
//! has an unexpected shape reads as `None`.

use serde_json::{Map, Value};

/// Kind of a style layer, from the style document's `type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Symbol,
    Circle,
    Line,
    Fill,
    Other(String),
}

impl From<&str> for LayerKind {
    fn from(kind: &str) -> Self {
        match kind {
            "symbol" => LayerKind::Symbol,
            "circle" => LayerKind::Circle,
            "line" => LayerKind::Line,
            "fill" => LayerKind::Fill,
            other => LayerKind::Other(other.to_string()),
        }
    }
}

/// Opaque property map with typed, failure-tolerant accessors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Map<String, Value>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// String value, `None` for absent or non-string keys
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.as_str()
    }

    /// Numeric value, `None` for absent or non-numeric keys
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key)?.as_f64()
    }

    /// All-numeric array value, `None` when any element is not a number
    pub fn f64_list(&self, key: &str) -> Option<Vec<f64>> {
        self.0
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }

    /// All-string array value, `None` when any element is not a string
    pub fn str_list(&self, key: &str) -> Option<Vec<&str>> {
        self.0
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// String value, with numbers rendered as text.
    ///
    /// Style documents carry labels like `text-field` as either strings or
    /// bare numbers.
    pub fn string_like(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Read-only descriptor of the style layer a feature was drawn by
#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    pub id: String,
    pub kind: LayerKind,
    pub paint: Properties,
    pub layout: Properties,
}

impl StyleLayer {
    /// A layer with empty paint and layout maps
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            paint: Properties::new(),
            layout: Properties::new(),
        }
    }

    /// Add a paint property
    pub fn with_paint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.paint.insert(key, value);
        self
    }

    /// Add a layout property
    pub fn with_layout(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.layout.insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_kind_from_str() {
        assert_eq!(LayerKind::from("symbol"), LayerKind::Symbol);
        assert_eq!(LayerKind::from("circle"), LayerKind::Circle);
        assert_eq!(LayerKind::from("line"), LayerKind::Line);
        assert_eq!(LayerKind::from("fill"), LayerKind::Fill);
        assert_eq!(
            LayerKind::from("heatmap"),
            LayerKind::Other("heatmap".to_string())
        );
    }

    #[test]
    fn test_str_accessor() {
        let mut props = Properties::new();
        props.insert("line-color", "#ff0000");
        props.insert("line-width", 3.0);

        assert_eq!(props.str("line-color"), Some("#ff0000"));
        assert_eq!(props.str("line-width"), None);
        assert_eq!(props.str("missing"), None);
    }

    #[test]
    fn test_f64_accessor_accepts_integers() {
        let mut props = Properties::new();
        props.insert("circle-radius", 5);

        assert_eq!(props.f64("circle-radius"), Some(5.0));
    }

    #[test]
    fn test_f64_list_rejects_mixed_arrays() {
        let mut props = Properties::new();
        props.insert("line-dasharray", json!([3.0, 1.0]));
        props.insert("broken", json!([3.0, "x"]));

        assert_eq!(props.f64_list("line-dasharray"), Some(vec![3.0, 1.0]));
        assert_eq!(props.f64_list("broken"), None);
    }

    #[test]
    fn test_str_list() {
        let mut props = Properties::new();
        props.insert("text-font", json!(["Noto Sans Regular", "Arial"]));

        assert_eq!(
            props.str_list("text-font"),
            Some(vec!["Noto Sans Regular", "Arial"])
        );
    }

    #[test]
    fn test_string_like_renders_numbers() {
        let mut props = Properties::new();
        props.insert("text-field", "Main St");
        props.insert("route-number", 42);
        props.insert("bad", json!({"a": 1}));

        assert_eq!(props.string_like("text-field"), Some("Main St".to_string()));
        assert_eq!(props.string_like("route-number"), Some("42".to_string()));
        assert_eq!(props.string_like("bad"), None);
    }

    #[test]
    fn test_layer_builders() {
        let layer = StyleLayer::new("roads", LayerKind::Line)
            .with_paint("line-color", "#334455")
            .with_layout("line-cap", "round");

        assert_eq!(layer.id, "roads");
        assert_eq!(layer.paint.str("line-color"), Some("#334455"));
        assert_eq!(layer.layout.str("line-cap"), Some("round"));
    }
}
