//! DXF export for laser cutting.
//!
//! Writes DXF R12 (AC1009), the lowest common denominator accepted by cutting
//! services. Every boundary becomes a closed `POLYLINE` with its `VERTEX`
//! records and a `SEQEND`; outer boundaries go on layer `OUTER`, holes on
//! `HOLES`. Outlines are laid out in a row like the SVG writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flatcut_outline::Outline;

use crate::layout::{Arrangement, LayoutOptions};

/// Layer for outer boundaries.
pub const OUTER_LAYER: &str = "OUTER";
/// Layer for holes.
pub const HOLE_LAYER: &str = "HOLES";

/// A closed polyline on one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Layer name.
    pub layer: &'static str,
    /// Vertices in drawing units.
    pub points: Vec<(f64, f64)>,
}

/// DXF document builder.
///
/// Accumulates closed polylines and exports them as DXF R12.
#[derive(Debug, Default)]
pub struct DxfDocument {
    polylines: Vec<Polyline>,
}

impl DxfDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document with `outlines` placed left to right.
    pub fn from_outlines(outlines: &[Outline], layout: &LayoutOptions) -> Self {
        let arrangement = Arrangement::new(outlines, layout);
        let mut doc = Self::new();
        for (outline, &dx) in outlines.iter().zip(&arrangement.offsets) {
            doc.add_outline(outline, dx);
        }
        doc
    }

    /// Add one outline shifted right by `dx`.
    pub fn add_outline(&mut self, outline: &Outline, dx: f64) {
        let shifted = |polygon: &flatcut_outline::Polygon2D| -> Vec<(f64, f64)> {
            polygon
                .points()
                .iter()
                .map(|p| (p.x as f64 + dx, p.y as f64))
                .collect()
        };
        self.add_polyline(OUTER_LAYER, shifted(&outline.outer));
        for hole in &outline.holes {
            self.add_polyline(HOLE_LAYER, shifted(hole));
        }
    }

    /// Add a closed polyline.
    pub fn add_polyline(&mut self, layer: &'static str, points: Vec<(f64, f64)>) {
        self.polylines.push(Polyline { layer, points });
    }

    /// Number of polylines.
    pub fn num_polylines(&self) -> usize {
        self.polylines.len()
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
        self.write_header(writer)?;
        self.write_tables(writer)?;

        writeln!(writer, "0")?;
        writeln!(writer, "SECTION")?;
        writeln!(writer, "2")?;
        writeln!(writer, "ENTITIES")?;
        for polyline in &self.polylines {
            self.write_polyline(writer, polyline)?;
        }
        writeln!(writer, "0")?;
        writeln!(writer, "ENDSEC")?;

        writeln!(writer, "0")?;
        writeln!(writer, "EOF")?;
        Ok(())
    }

    fn write_header(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "0")?;
        writeln!(writer, "SECTION")?;
        writeln!(writer, "2")?;
        writeln!(writer, "HEADER")?;
        writeln!(writer, "9")?;
        writeln!(writer, "$ACADVER")?;
        writeln!(writer, "1")?;
        writeln!(writer, "AC1009")?;
        writeln!(writer, "9")?;
        writeln!(writer, "$INSUNITS")?;
        writeln!(writer, "70")?;
        writeln!(writer, "4")?; // millimetres
        writeln!(writer, "0")?;
        writeln!(writer, "ENDSEC")?;
        Ok(())
    }

    fn write_tables(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "0")?;
        writeln!(writer, "SECTION")?;
        writeln!(writer, "2")?;
        writeln!(writer, "TABLES")?;
        writeln!(writer, "0")?;
        writeln!(writer, "TABLE")?;
        writeln!(writer, "2")?;
        writeln!(writer, "LAYER")?;
        writeln!(writer, "70")?;
        writeln!(writer, "2")?;

        // (name, ACI colour): red for cuts around the part, blue for holes
        for (name, color) in [(OUTER_LAYER, 1), (HOLE_LAYER, 5)] {
            writeln!(writer, "0")?;
            writeln!(writer, "LAYER")?;
            writeln!(writer, "2")?;
            writeln!(writer, "{name}")?;
            writeln!(writer, "70")?;
            writeln!(writer, "0")?;
            writeln!(writer, "62")?;
            writeln!(writer, "{color}")?;
            writeln!(writer, "6")?;
            writeln!(writer, "CONTINUOUS")?;
        }

        writeln!(writer, "0")?;
        writeln!(writer, "ENDTAB")?;
        writeln!(writer, "0")?;
        writeln!(writer, "ENDSEC")?;
        Ok(())
    }

    fn write_polyline(&self, writer: &mut impl Write, polyline: &Polyline) -> std::io::Result<()> {
        writeln!(writer, "0")?;
        writeln!(writer, "POLYLINE")?;
        writeln!(writer, "8")?;
        writeln!(writer, "{}", polyline.layer)?;
        writeln!(writer, "66")?;
        writeln!(writer, "1")?; // vertices follow
        writeln!(writer, "10")?;
        writeln!(writer, "0.0")?;
        writeln!(writer, "20")?;
        writeln!(writer, "0.0")?;
        writeln!(writer, "30")?;
        writeln!(writer, "0.0")?;
        writeln!(writer, "70")?;
        writeln!(writer, "1")?; // closed

        for &(x, y) in &polyline.points {
            writeln!(writer, "0")?;
            writeln!(writer, "VERTEX")?;
            writeln!(writer, "8")?;
            writeln!(writer, "{}", polyline.layer)?;
            writeln!(writer, "10")?;
            writeln!(writer, "{x:.6}")?;
            writeln!(writer, "20")?;
            writeln!(writer, "{y:.6}")?;
            writeln!(writer, "30")?;
            writeln!(writer, "0.0")?;
        }

        writeln!(writer, "0")?;
        writeln!(writer, "SEQEND")?;
        writeln!(writer, "8")?;
        writeln!(writer, "{}", polyline.layer)?;
        Ok(())
    }
}
