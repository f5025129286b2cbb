//! Configuration for SVG output

/// Configuration options for exported SVG markup
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Decimal precision for projected coordinates
    pub precision: u8,

    /// Whether to include the XML declaration
    pub xml_declaration: bool,

    /// Font size assumed when a symbol layer omits `text-size`
    pub base_text_size: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            xml_declaration: true,
            base_text_size: 16.0,
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coordinate precision
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Drop the XML declaration, for markup embedded in HTML
    pub fn without_xml_declaration(mut self) -> Self {
        self.xml_declaration = false;
        self
    }

    /// Set the fallback text size
    pub fn with_base_text_size(mut self, size: f64) -> Self {
        self.base_text_size = size;
        self
    }
}
