//! Ordered boundary extraction and outer/hole classification.
//!
//! Vertex order comes from topology alone: each oriented edge contributes its
//! effective start vertex, in stored order. Nothing here sorts points
//! geometrically; hulls, angle sorts and nearest-neighbour walks all lose
//! concave corners.

use flatcut_math::{Bounds3, Point3, Tolerance};
use flatcut_topo::{CurveKind, Loop, Solid, TopoError, VertexId};

use crate::diagnostics::LoopError;

/// A boundary reduced to its cyclic vertex sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLoop {
    /// Vertex IDs, one per edge, in traversal order.
    pub vertices: Vec<VertexId>,
    /// Curve kinds of edges that are not straight lines, in traversal order.
    pub curved: Vec<CurveKind>,
}

impl ExtractedLoop {
    /// Number of boundary vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Positions of the vertices in `solid`, which must share this loop's
    /// vertex keys (the source solid or a transformed copy).
    pub fn positions(&self, solid: &Solid) -> Vec<Point3> {
        self.vertices
            .iter()
            .filter_map(|&v| solid.vertex(v).copied())
            .collect()
    }

    /// Distinct non-straight curve kinds, comma separated.
    pub fn curve_summary(&self) -> String {
        let mut names: Vec<String> = Vec::new();
        for kind in &self.curved {
            let name = match kind {
                CurveKind::Other(name) => name.to_lowercase(),
                other => format!("{other:?}").to_lowercase(),
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.join(", ")
    }
}

/// Walk a loop's oriented edges and collect the effective start vertex of
/// each.
///
/// Fails if the loop is empty, references missing topology, or is not a
/// closed chain (edge `i` must end where edge `i + 1` starts, cyclically,
/// either at the same vertex or within [`Tolerance::VERTEX`]).
pub fn extract_loop(solid: &Solid, lp: &Loop) -> Result<ExtractedLoop, LoopError> {
    if lp.is_empty() {
        return Err(LoopError::Empty);
    }

    let mut ends = Vec::with_capacity(lp.len());
    let mut out = ExtractedLoop {
        vertices: Vec::with_capacity(lp.len()),
        curved: Vec::new(),
    };

    for oe in &lp.edges {
        let (start, end) = solid.oriented_endpoints(oe)?;
        for v in [start, end] {
            if solid.vertex(v).is_none() {
                return Err(TopoError::MissingVertex(v).into());
            }
        }
        if let Some(edge) = solid.edge(oe.edge) {
            if !edge.curve.is_straight() {
                out.curved.push(edge.curve.clone());
            }
        }
        out.vertices.push(start);
        ends.push(end);
    }

    let n = out.vertices.len();
    for (index, &end) in ends.iter().enumerate() {
        let next = (index + 1) % n;
        if !meets(solid, end, out.vertices[next]) {
            return Err(LoopError::Gap { index, next });
        }
    }

    Ok(out)
}

fn meets(solid: &Solid, a: VertexId, b: VertexId) -> bool {
    if a == b {
        return true;
    }
    match (solid.vertex(a), solid.vertex(b)) {
        (Some(pa), Some(pb)) => Tolerance::VERTEX.points_equal(pa, pb),
        _ => false,
    }
}

/// Outer/hole split of a face's boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Index of the outer boundary.
    pub outer: usize,
    /// Indices of the holes, in input order.
    pub holes: Vec<usize>,
    /// Index of a boundary that tied with the outer one, if any.
    pub tie: Option<usize>,
}

/// Pick the boundary with the largest bounding-box surface proxy as outer.
///
/// Ties go to the first in input order and are reported. Returns `None` for
/// an empty input.
pub fn classify(loops: &[Vec<Point3>]) -> Option<Classification> {
    let areas: Vec<f64> = loops
        .iter()
        .map(|pts| Bounds3::from_points(pts.iter()).map_or(0.0, |b| b.area_proxy()))
        .collect();

    let mut outer = 0;
    for (i, &area) in areas.iter().enumerate().skip(1) {
        if area > areas[outer] && !nearly_equal(area, areas[outer]) {
            outer = i;
        }
    }
    let best = *areas.get(outer)?;

    let tie = areas
        .iter()
        .enumerate()
        .find(|&(i, &a)| i != outer && nearly_equal(a, best))
        .map(|(i, _)| i);

    Some(Classification {
        outer,
        holes: (0..loops.len()).filter(|&i| i != outer).collect(),
        tie,
    })
}

fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
