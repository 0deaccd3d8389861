#![warn(missing_docs)]

//! B-rep topology for the flatcut outline extractor.
//!
//! A [`Solid`] owns two arenas (vertices and edges) keyed by slotmap ids and a
//! list of [`Face`]s. Each face is bounded by one or more [`Loop`]s, and each
//! loop is an ordered chain of [`OrientedEdge`]s that reference the shared
//! edges. The structure is built once by a reader (or by [`make_prism`]) and
//! is treated as immutable afterwards; [`Solid::transformed`] produces a
//! moved copy with identical keys.

mod primitives;

pub use primitives::make_prism;

use flatcut_math::{Point3, Rotation, Vec3};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Unique identifier for a vertex in a solid.
    pub struct VertexId;
    /// Unique identifier for an edge in a solid.
    pub struct EdgeId;
}

/// Errors raised while walking topology.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopoError {
    /// A loop references an edge that is not in the solid.
    #[error("edge {0:?} not found")]
    MissingEdge(EdgeId),

    /// An edge references a vertex that is not in the solid.
    #[error("vertex {0:?} not found")]
    MissingVertex(VertexId),
}

/// Geometric type of the curve underlying an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveKind {
    /// Straight line segment.
    Line,
    /// Circular arc or full circle.
    Circle,
    /// Elliptical arc.
    Ellipse,
    /// B-spline curve of any flavour.
    BSpline,
    /// Anything else, by entity name.
    Other(String),
}

impl CurveKind {
    /// Classify a curve by its STEP entity type name.
    pub fn from_entity_name(name: &str) -> Self {
        match name {
            "LINE" | "POLYLINE" => CurveKind::Line,
            "CIRCLE" => CurveKind::Circle,
            "ELLIPSE" => CurveKind::Ellipse,
            n if n.starts_with("B_SPLINE_CURVE") || n.starts_with("RATIONAL_B_SPLINE") => {
                CurveKind::BSpline
            }
            other => CurveKind::Other(other.to_string()),
        }
    }

    /// Whether walking the edge endpoint-to-endpoint reproduces the curve.
    pub fn is_straight(&self) -> bool {
        matches!(self, CurveKind::Line)
    }
}

/// An edge between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Stored start vertex.
    pub start: VertexId,
    /// Stored end vertex.
    pub end: VertexId,
    /// Underlying curve type.
    pub curve: CurveKind,
}

/// A use of an edge inside a loop, with traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdge {
    /// The referenced edge.
    pub edge: EdgeId,
    /// `true` if the loop traverses the edge from its start to its end.
    pub forward: bool,
}

impl OrientedEdge {
    /// Create a new oriented edge reference.
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        Self { edge, forward }
    }
}

/// A closed chain of oriented edges bounding a region of a face.
///
/// Consecutive edges are expected to share an endpoint (the effective end of
/// edge `i` is the effective start of edge `i + 1`, cyclically). Readers do
/// not enforce this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    /// Oriented edges in stored order.
    pub edges: Vec<OrientedEdge>,
    /// Whether the source file tagged this loop as the face's outer bound.
    /// Informational only.
    pub declared_outer: bool,
}

impl Loop {
    /// Create a loop from oriented edges.
    pub fn new(edges: Vec<OrientedEdge>, declared_outer: bool) -> Self {
        Self {
            edges,
            declared_outer,
        }
    }

    /// Number of edges in the loop.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the loop has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Surface supporting a face.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// A plane through `origin` with the given normal.
    Plane {
        /// A point on the plane.
        origin: Point3,
        /// Plane normal (not necessarily unit length).
        normal: Vec3,
    },
    /// Any non-planar surface, by entity name.
    Other(String),
}

/// A bounded region of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Boundary loops in file order. Loop 0 is not necessarily the outer one.
    pub loops: Vec<Loop>,
    /// Supporting surface.
    pub surface: Surface,
}

impl Face {
    /// Create a face from its loops and surface.
    pub fn new(loops: Vec<Loop>, surface: Surface) -> Self {
        Self { loops, surface }
    }
}

/// A named B-rep solid.
#[derive(Debug, Clone)]
pub struct Solid {
    /// Name used as the group identifier in output.
    pub name: String,
    /// Vertex positions.
    pub vertices: SlotMap<VertexId, Point3>,
    /// Edges between vertices.
    pub edges: SlotMap<EdgeId, Edge>,
    /// Faces in file order.
    pub faces: Vec<Face>,
}

impl Solid {
    /// Create an empty solid.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces: Vec::new(),
        }
    }

    /// Add a vertex.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(point)
    }

    /// Add an edge between two existing vertices.
    pub fn add_edge(&mut self, start: VertexId, end: VertexId, curve: CurveKind) -> EdgeId {
        self.edges.insert(Edge { start, end, curve })
    }

    /// Add a face, returning its index.
    pub fn add_face(&mut self, face: Face) -> usize {
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Position of a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&Point3> {
        self.vertices.get(id)
    }

    /// Edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Effective `(start, end)` vertices of an oriented edge.
    pub fn oriented_endpoints(&self, oe: &OrientedEdge) -> Result<(VertexId, VertexId), TopoError> {
        let edge = self.edge(oe.edge).ok_or(TopoError::MissingEdge(oe.edge))?;
        if oe.forward {
            Ok((edge.start, edge.end))
        } else {
            Ok((edge.end, edge.start))
        }
    }

    /// Unique vertex positions referenced by a face's loops, in first-use order.
    ///
    /// Dangling references are ignored here; loop walking reports them.
    pub fn face_points(&self, face: &Face) -> Vec<Point3> {
        let mut seen = Vec::new();
        let mut points = Vec::new();
        for lp in &face.loops {
            for oe in &lp.edges {
                let Some(edge) = self.edge(oe.edge) else {
                    continue;
                };
                for vid in [edge.start, edge.end] {
                    if seen.contains(&vid) {
                        continue;
                    }
                    seen.push(vid);
                    if let Some(p) = self.vertex(vid) {
                        points.push(*p);
                    }
                }
            }
        }
        points
    }

    /// Total number of loops over all faces.
    pub fn num_loops(&self) -> usize {
        self.faces.iter().map(|f| f.loops.len()).sum()
    }

    /// Copy of this solid with every vertex mapped through `f`.
    ///
    /// Keys, edges and faces are preserved exactly.
    pub fn map_points(&self, f: impl Fn(&Point3) -> Point3) -> Self {
        let mut out = self.clone();
        for (_, p) in out.vertices.iter_mut() {
            *p = f(p);
        }
        for face in &mut out.faces {
            if let Surface::Plane { origin, normal } = &mut face.surface {
                let moved = f(origin);
                let tip = f(&(*origin + *normal));
                *normal = tip - moved;
                *origin = moved;
            }
        }
        out
    }

    /// Copy of this solid rotated about the origin.
    pub fn transformed(&self, rotation: &Rotation) -> Self {
        self.map_points(|p| rotation.apply_point(p))
    }
}
