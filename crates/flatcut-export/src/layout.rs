//! Left-to-right placement of outlines on one sheet.

use flatcut_outline::Outline;
use serde::{Deserialize, Serialize};

/// How outlines are spread across the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Horizontal gap between neighbouring outlines, in mm.
    pub gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self { gap: 5.0 }
    }
}

/// Where each outline goes, and the overall drawing size.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    /// X offset of each outline, in input order.
    pub offsets: Vec<f64>,
    /// Total drawing width.
    pub width: f64,
    /// Total drawing height (tallest outline).
    pub height: f64,
}

impl Arrangement {
    /// Place `outlines` in a row, bottoms aligned at y = 0.
    pub fn new(outlines: &[Outline], options: &LayoutOptions) -> Self {
        let gap = options.gap.max(0.0);
        let mut offsets = Vec::with_capacity(outlines.len());
        let mut cursor = 0.0;
        let mut height = 0.0_f64;
        for outline in outlines {
            offsets.push(cursor);
            cursor += outline.width() as f64 + gap;
            height = height.max(outline.height() as f64);
        }
        let width = if outlines.is_empty() { 0.0 } else { cursor - gap };
        Self {
            offsets,
            width,
            height,
        }
    }
}
