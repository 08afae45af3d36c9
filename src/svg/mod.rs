//! SVG document handling.
//!
//! # Modules
//!
//! - [`document`]: owned element tree parsed with quick-xml, plus serialization
//!
//! This module also holds the small geometry helpers shared by the pipeline,
//! the layout engines and the composer: [`ViewBox`], length parsing and
//! number formatting.

pub mod document;

pub use document::{Document, Element, Node, ParseError};

use std::fmt;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// A parsed `viewBox` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parse `"min-x min-y width height"` (whitespace and/or comma separated).
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f64> = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;

        match parts.as_slice() {
            [x, y, width, height] if parts.iter().all(|v| v.is_finite()) => {
                Some(Self::new(*x, *y, *width, *height))
            }
            _ => None,
        }
    }

    /// Format with the given decimal precision.
    pub fn format(&self, precision: usize) -> String {
        format!(
            "{} {} {} {}",
            format_number(self.x, precision),
            format_number(self.y, precision),
            format_number(self.width, precision),
            format_number(self.height, precision)
        )
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(6))
    }
}

/// Parse a length attribute that is either unit-less or in `px`.
///
/// Relative units (`%`, `em`, ...) cannot be resolved without a viewport and
/// yield `None`.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a number with at most `precision` decimals, trimming trailing zeros.
///
/// `format_number(380.0, 2)` -> `"380"`, `format_number(1.0 / 3.0, 2)` -> `"0.33"`.
pub fn format_number(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$}");
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
