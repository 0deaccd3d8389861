//! SVG export for laser cutting.
//!
//! Units are millimetres: the `viewBox` matches the `width`/`height` given
//! in `mm`, so one user unit is one millimetre. Outline coordinates are
//! y-up; they are flipped here into SVG's y-down space.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flatcut_outline::{Outline, Polygon2D};
use serde::{Deserialize, Serialize};

use crate::layout::{Arrangement, LayoutOptions};

/// Stroke colours and width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgStyle {
    /// Stroke colour of outer boundaries.
    pub outer_color: String,
    /// Stroke colour of holes.
    pub hole_color: String,
    /// Stroke width in mm. Most cutters treat hairlines as cut paths.
    pub stroke_width: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            outer_color: "#ff0000".to_string(),
            hole_color: "#0000ff".to_string(),
            stroke_width: 0.1,
        }
    }
}

/// SVG document builder.
///
/// Accumulates outlines and writes them side by side, one `<g>` per part.
pub struct SvgDocument {
    outlines: Vec<Outline>,
    style: SvgStyle,
    layout: LayoutOptions,
}

impl SvgDocument {
    /// Create an empty document.
    pub fn new(style: SvgStyle, layout: LayoutOptions) -> Self {
        Self {
            outlines: Vec::new(),
            style,
            layout,
        }
    }

    /// Add one part.
    pub fn add_outline(&mut self, outline: Outline) {
        self.outlines.push(outline);
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    /// Whether no parts were added.
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    /// Write to a file.
    pub fn export(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    /// Write to any byte sink.
    pub fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let arrangement = Arrangement::new(&self.outlines, &self.layout);
        let (w, h) = (arrangement.width, arrangement.height);

        writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            writer,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">"#
        )?;

        let mut ids = IdRegistry::default();
        for (outline, &dx) in self.outlines.iter().zip(&arrangement.offsets) {
            let id = ids.claim(&outline.name);
            writeln!(writer, r#"  <g id="{id}">"#)?;
            self.write_path(writer, &outline.outer, "outer", &self.style.outer_color, dx, h)?;
            for hole in &outline.holes {
                self.write_path(writer, hole, "hole", &self.style.hole_color, dx, h)?;
            }
            writeln!(writer, "  </g>")?;
        }

        writeln!(writer, "</svg>")?;
        Ok(())
    }

    fn write_path(
        &self,
        writer: &mut impl Write,
        polygon: &Polygon2D,
        class: &str,
        color: &str,
        dx: f64,
        page_height: f64,
    ) -> std::io::Result<()> {
        let mut d = String::new();
        for (i, p) in polygon.points().iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let x = p.x as f64 + dx;
            let y = page_height - p.y as f64;
            if !d.is_empty() {
                d.push(' ');
            }
            d.push_str(&format!("{cmd}{x} {y}"));
        }
        d.push_str(" Z");
        writeln!(
            writer,
            r#"    <path class="{class}" d="{d}" fill="none" stroke="{color}" stroke-width="{}"/>"#,
            self.style.stroke_width
        )
    }
}

/// Hands out unique, XML-safe element ids.
#[derive(Debug, Default)]
struct IdRegistry {
    used: Vec<String>,
}

impl IdRegistry {
    fn claim(&mut self, name: &str) -> String {
        let mut base: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if !base.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            base.insert(0, '_');
        }

        let mut id = base.clone();
        let mut n = 2;
        while self.used.contains(&id) {
            id = format!("{base}_{n}");
            n += 1;
        }
        self.used.push(id.clone());
        id
    }
}

/// Render outlines to an SVG string.
pub fn to_svg_string(outlines: &[Outline], style: &SvgStyle, layout: &LayoutOptions) -> String {
    let mut doc = SvgDocument::new(style.clone(), *layout);
    for outline in outlines {
        doc.add_outline(outline.clone());
    }
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = doc.write_to(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
