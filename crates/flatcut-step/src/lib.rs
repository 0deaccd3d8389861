#![warn(missing_docs)]

//! STEP file reading for flatcut.
//!
//! Reads the B-rep solids of an ISO 10303-21 file (AP203/AP214/AP242) into
//! [`flatcut_topo::Solid`]s. Only topology, vertex positions, face surfaces
//! and edge curve kinds are decoded; that is all the outline extractor needs.
//!
//! # Example
//!
//! ```no_run
//! use flatcut_step::read_step;
//!
//! let solids = read_step("panel.step").unwrap();
//! for solid in &solids {
//!     println!("{}: {} faces", solid.name, solid.faces.len());
//! }
//! ```

mod entities;
mod error;
mod lexer;
mod parser;
mod reader;

pub use error::StepError;
pub use reader::{read_step, read_step_from_buffer};
