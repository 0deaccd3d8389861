#![warn(missing_docs)]

//! Flat 2D cut outlines from thin B-rep solids.
//!
//! A sheet part modelled in 3D is a prism: two large parallel faces a sheet
//! thickness apart, joined by narrow side faces. This crate finds that
//! thickness axis, rotates the part to lie flat and square on the XY plane,
//! picks the flat face, walks its boundaries in topological order and
//! returns integer polygons ready for a laser cutter.
//!
//! # Example
//!
//! ```
//! use flatcut_math::Point2;
//! use flatcut_outline::{extract_outline, ExtractSettings};
//! use flatcut_topo::make_prism;
//!
//! let outer = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(40.0, 0.0),
//!     Point2::new(40.0, 50.0),
//!     Point2::new(0.0, 50.0),
//! ];
//! let solid = make_prism("plate", &outer, &[], 3.0);
//! let report = extract_outline(&solid, &ExtractSettings::default());
//! let outline = report.outline().unwrap();
//! assert_eq!((outline.width(), outline.height()), (40, 50));
//! ```

pub mod align;
mod diagnostics;
pub mod face;
pub mod loops;
pub mod normalize;
mod outline;
mod pipeline;
mod polygon;
pub mod project;
mod settings;
pub mod thickness;

pub use align::AlignmentTransform;
pub use diagnostics::{LoopError, SkipReason, Warning};
pub use outline::{assemble, Outline};
pub use pipeline::{extract_outline, extract_outlines, SolidReport};
pub use polygon::{IPoint2, Polygon2D, PolygonError};
pub use project::ProjectionPlane;
pub use settings::{ExtractSettings, SettingsError};
pub use thickness::ThicknessEstimate;
