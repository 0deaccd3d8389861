#![warn(missing_docs)]

//! Writers turning flatcut outlines into files a laser cutter accepts.
//!
//! SVG is the primary format; DXF R12 is offered for CAM software that
//! prefers it. Both lay parts out in a single row.

pub mod dxf;
mod layout;
pub mod svg;

pub use dxf::DxfDocument;
pub use layout::{Arrangement, LayoutOptions};
pub use svg::{to_svg_string, SvgDocument, SvgStyle};
