//! Topology entities: vertex, edge, loop, face, shell, and solid.

use flatcut_math::Point3;

use super::{parse_cartesian_point, EntityArgs};
use crate::error::StepError;
use crate::parser::{StepEntity, StepFile};

/// Parsed EDGE_CURVE entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEdge {
    /// Start vertex entity ID.
    pub start_vertex_id: u64,
    /// End vertex entity ID.
    pub end_vertex_id: u64,
    /// Edge geometry (curve) entity ID.
    pub curve_id: u64,
}

/// Parsed ORIENTED_EDGE entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOrientedEdge {
    /// The underlying EDGE_CURVE entity ID.
    pub edge_id: u64,
    /// `true` if the loop runs along the edge from its start vertex.
    pub orientation: bool,
}

/// Parsed FACE_BOUND / FACE_OUTER_BOUND entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFaceBound {
    /// The EDGE_LOOP entity ID.
    pub loop_id: u64,
    /// Whether this was written as FACE_OUTER_BOUND.
    pub is_outer: bool,
}

/// Parsed ADVANCED_FACE / FACE_SURFACE entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFace {
    /// Face bounds (outer and inner loops) in file order.
    pub bounds: Vec<StepFaceBound>,
    /// Surface geometry entity ID.
    pub surface_id: u64,
}

/// Parsed MANIFOLD_SOLID_BREP / BREP_WITH_VOIDS entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSolid {
    /// The solid's name string (may be empty).
    pub name: String,
    /// The outer shell entity ID.
    pub outer_shell_id: u64,
}

/// Entity types that denote a B-rep solid.
pub const SOLID_TYPES: &[&str] = &["MANIFOLD_SOLID_BREP", "BREP_WITH_VOIDS"];

fn expect_type<'a>(
    file: &'a StepFile,
    id: u64,
    accepted: &[&str],
) -> Result<&'a StepEntity, StepError> {
    let entity = file.require(id)?;
    if accepted.contains(&entity.type_name.as_str()) {
        Ok(entity)
    } else {
        Err(StepError::type_mismatch(id, accepted.join(" | "), &entity.type_name))
    }
}

/// Parse a VERTEX_POINT entity into its position.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = expect_type(file, id, &["VERTEX_POINT"])?;
    parse_cartesian_point(file, entity.entity_ref(1)?)
}

/// Parse an EDGE_CURVE entity.
///
/// STEP syntax: `EDGE_CURVE(name, start, end, curve, same_sense)`. The
/// `same_sense` flag relates the curve parameterization to the edge and does
/// not change which vertex the edge starts at.
pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<StepEdge, StepError> {
    let entity = expect_type(file, id, &["EDGE_CURVE"])?;
    Ok(StepEdge {
        start_vertex_id: entity.entity_ref(1)?,
        end_vertex_id: entity.entity_ref(2)?,
        curve_id: entity.entity_ref(3)?,
    })
}

/// Parse an ORIENTED_EDGE entity.
///
/// STEP syntax: `ORIENTED_EDGE(name, *, *, edge_element, orientation)`.
pub fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<StepOrientedEdge, StepError> {
    let entity = expect_type(file, id, &["ORIENTED_EDGE"])?;
    Ok(StepOrientedEdge {
        edge_id: entity.entity_ref(3)?,
        orientation: entity.boolean(4)?,
    })
}

/// Parse an EDGE_LOOP entity into its ORIENTED_EDGE IDs.
pub fn parse_edge_loop(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    let entity = expect_type(file, id, &["EDGE_LOOP"])?;
    entity.entity_ref_list(1)
}

/// Parse a FACE_BOUND or FACE_OUTER_BOUND entity.
pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<StepFaceBound, StepError> {
    let entity = expect_type(file, id, &["FACE_BOUND", "FACE_OUTER_BOUND"])?;
    Ok(StepFaceBound {
        loop_id: entity.entity_ref(1)?,
        is_outer: entity.type_name == "FACE_OUTER_BOUND",
    })
}

/// Parse an ADVANCED_FACE or FACE_SURFACE entity.
///
/// STEP syntax: `ADVANCED_FACE(name, (bounds...), surface, same_sense)`.
pub fn parse_face(file: &StepFile, id: u64) -> Result<StepFace, StepError> {
    let entity = expect_type(file, id, &["ADVANCED_FACE", "FACE_SURFACE"])?;
    let bounds = entity
        .entity_ref_list(1)?
        .into_iter()
        .map(|bid| parse_face_bound(file, bid))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StepFace {
        bounds,
        surface_id: entity.entity_ref(2)?,
    })
}

/// Parse a CLOSED_SHELL or OPEN_SHELL entity into its face IDs.
pub fn parse_shell(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    let entity = expect_type(file, id, &["CLOSED_SHELL", "OPEN_SHELL"])?;
    entity.entity_ref_list(1)
}

/// Parse a MANIFOLD_SOLID_BREP or BREP_WITH_VOIDS entity.
///
/// Voids of a BREP_WITH_VOIDS are interior cavities and never reach the
/// cutting outline, so only the outer shell is kept.
pub fn parse_solid(file: &StepFile, id: u64) -> Result<StepSolid, StepError> {
    let entity = expect_type(file, id, SOLID_TYPES)?;
    Ok(StepSolid {
        name: entity.string(0)?.to_string(),
        outer_shell_id: entity.entity_ref(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse_step(data: &str) -> StepFile {
        let input = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n");
        Parser::parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_vertex_point() {
        let file = parse_step("#1 = CARTESIAN_POINT('', (1.0, 2.0, 3.0));\n#2 = VERTEX_POINT('', #1);");
        let p = parse_vertex_point(&file, 2).unwrap();
        assert!((p.x - 1.0).abs() < 1e-10);
        assert!((p.z - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_parse_edges() {
        let file = parse_step(
            "#5 = EDGE_CURVE('', #1, #2, #3, .F.);\n#6 = ORIENTED_EDGE('', *, *, #5, .F.);",
        );
        let edge = parse_edge_curve(&file, 5).unwrap();
        assert_eq!(edge.start_vertex_id, 1);
        assert_eq!(edge.end_vertex_id, 2);
        assert_eq!(edge.curve_id, 3);
        let oe = parse_oriented_edge(&file, 6).unwrap();
        assert_eq!(oe.edge_id, 5);
        assert!(!oe.orientation);
    }

    #[test]
    fn test_parse_edge_loop() {
        let file = parse_step("#1 = EDGE_LOOP('', (#10, #11, #12, #13));");
        assert_eq!(parse_edge_loop(&file, 1).unwrap(), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_parse_face() {
        let file = parse_step(
            "#6 = EDGE_LOOP('', (#10, #11, #12, #13));\n\
             #7 = FACE_OUTER_BOUND('', #6, .T.);\n\
             #8 = FACE_BOUND('', #6, .F.);\n\
             #9 = ADVANCED_FACE('', (#8, #7), #5, .T.);\n\
             #10 = FACE_SURFACE('', (#7), #5);",
        );
        let face = parse_face(&file, 9).unwrap();
        assert_eq!(face.surface_id, 5);
        assert_eq!(face.bounds.len(), 2);
        assert!(!face.bounds[0].is_outer);
        assert!(face.bounds[1].is_outer);
        assert_eq!(parse_face(&file, 10).unwrap().bounds.len(), 1);
    }

    #[test]
    fn test_parse_solid_variants() {
        let file = parse_step(
            "#1 = CLOSED_SHELL('', (#10, #11));\n\
             #2 = MANIFOLD_SOLID_BREP('bracket', #1);\n\
             #3 = BREP_WITH_VOIDS('', #1, (#4));",
        );
        assert_eq!(parse_shell(&file, 1).unwrap(), vec![10, 11]);
        let solid = parse_solid(&file, 2).unwrap();
        assert_eq!(solid.name, "bracket");
        assert_eq!(solid.outer_shell_id, 1);
        assert_eq!(parse_solid(&file, 3).unwrap().name, "");
    }

    #[test]
    fn test_wrong_type_reports_expected() {
        let file = parse_step("#1 = POLY_LOOP('', (#2, #3, #4));");
        let err = parse_edge_loop(&file, 1).unwrap_err();
        assert_eq!(err.to_string(), "entity #1: expected EDGE_LOOP, got POLY_LOOP");
    }
}
