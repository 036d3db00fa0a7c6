//! Inline style model
//!
//! Inline styles are the live preview of pending edits: gesture arithmetic
//! mutates properties here and the final style string becomes the edit
//! payload. Rendering is deterministic so snapshot comparison can work on
//! the serialized text.

use serde::{Deserialize, Serialize};

/// Parse a pixel length such as `"12px"` or `"-3.5px"`.
///
/// Returns `None` for `auto`, percentages, viewport units, or anything
/// else that is not plain pixels.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px")?;
    number.trim().parse::<f64>().ok()
}

/// Render a pixel length.
pub fn px_string(value: f64) -> String {
    format!("{}px", value)
}

/// Horizontal position anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorX {
    Left,
    Right,
}

impl AnchorX {
    pub fn property(&self) -> &'static str {
        match self {
            AnchorX::Left => "left",
            AnchorX::Right => "right",
        }
    }

    /// Increasing `right` moves the element left, so horizontal deltas
    /// are negated for this anchor.
    pub fn inverted(&self) -> bool {
        matches!(self, AnchorX::Right)
    }
}

/// Vertical position anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorY {
    Top,
    Bottom,
}

impl AnchorY {
    pub fn property(&self) -> &'static str {
        match self {
            AnchorY::Top => "top",
            AnchorY::Bottom => "bottom",
        }
    }

    /// Increasing `bottom` moves the element up, so vertical deltas are
    /// negated for this anchor.
    pub fn inverted(&self) -> bool {
        matches!(self, AnchorY::Bottom)
    }
}

/// An element's inline style as an ordered property list.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct InlineStyle {
    properties: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. Malformed declarations are dropped.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::new();
        for declaration in css_text.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim();
            if !property.is_empty() && !value.is_empty() {
                style.set(property, value);
            }
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing it in place if already present so the
    /// declaration order stays stable.
    pub fn set(&mut self, property: &str, value: &str) {
        if let Some(entry) = self.properties.iter_mut().find(|(p, _)| p == property) {
            entry.1 = value.to_string();
        } else {
            self.properties
                .push((property.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, property: &str) {
        self.properties.retain(|(p, _)| p != property);
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Deterministic serialized form, used both for write-back to the DOM
    /// and for snapshot comparison.
    pub fn css_text(&self) -> String {
        self.properties
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" -3.5px "), Some(-3.5));
        assert_eq!(parse_px("0px"), Some(0.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px("2vw"), None);
        assert_eq!(parse_px(""), None);
    }

    #[test]
    fn test_parse_and_render() {
        let style = InlineStyle::parse("left: 10px; top: 20px;");
        assert_eq!(style.get("left"), Some("10px"));
        assert_eq!(style.get("top"), Some("20px"));
        assert_eq!(style.css_text(), "left: 10px; top: 20px;");
    }

    #[test]
    fn test_parse_drops_malformed() {
        let style = InlineStyle::parse("color: red; nonsense; : bad; width: 5px");
        assert_eq!(style.css_text(), "color: red; width: 5px;");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = InlineStyle::parse("left: 10px; top: 20px;");
        style.set("left", "15px");
        assert_eq!(style.css_text(), "left: 15px; top: 20px;");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let text = "position: absolute; left: 1px; top: 2px;";
        let style = InlineStyle::parse(text);
        assert_eq!(InlineStyle::parse(&style.css_text()), style);
    }

    #[test]
    fn test_anchor_properties() {
        assert_eq!(AnchorX::Left.property(), "left");
        assert!(!AnchorX::Left.inverted());
        assert!(AnchorX::Right.inverted());
        assert_eq!(AnchorY::Bottom.property(), "bottom");
        assert!(AnchorY::Bottom.inverted());
    }
}
