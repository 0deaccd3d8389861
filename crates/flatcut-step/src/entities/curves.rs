//! Edge geometry classification.
//!
//! Edges are walked vertex to vertex, so the reader only needs to know what
//! kind of curve an edge follows, not its parameters.

use flatcut_topo::CurveKind;

use super::EntityArgs;
use crate::error::StepError;
use crate::parser::StepFile;

/// Wrapper curves whose first real argument is another curve.
const WRAPPERS: &[&str] = &["SURFACE_CURVE", "SEAM_CURVE", "INTERSECTION_CURVE", "TRIMMED_CURVE"];

/// Nesting bound for wrapper curves.
const MAX_DEPTH: usize = 8;

/// Classify the curve entity referenced by an EDGE_CURVE.
///
/// Wrapper curves are resolved to the curve they carry. Complex instances
/// (common for rational B-splines) are classified by the first partial type
/// that names a known curve.
pub fn curve_kind(file: &StepFile, id: u64) -> Result<CurveKind, StepError> {
    let mut current = id;
    for _ in 0..MAX_DEPTH {
        let entity = file.require(current)?;
        if WRAPPERS.contains(&entity.type_name.as_str()) {
            current = entity.entity_ref(1)?;
            continue;
        }

        let kind = entity
            .type_names()
            .map(CurveKind::from_entity_name)
            .find(|k| !matches!(k, CurveKind::Other(_)))
            .unwrap_or_else(|| CurveKind::Other(entity.type_name.clone()));
        return Ok(kind);
    }
    Err(StepError::parser(Some(id), "curve wrappers nested too deeply"))
}
