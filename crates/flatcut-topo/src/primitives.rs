//! Prism construction: a planar profile (with holes) extruded along +Z.

use flatcut_math::{Point2, Point3, Vec3};

use crate::{CurveKind, EdgeId, Face, Loop, OrientedEdge, Solid, Surface, VertexId};

/// Build a B-rep prism by extruding a polygonal profile from `z = 0` to
/// `z = thickness`.
///
/// The outer ring is wound counter-clockwise and holes clockwise (seen from
/// +Z) regardless of the input winding. Faces are emitted bottom, top, then
/// one side face per profile segment; all edges are shared between their two
/// faces with opposite orientation, as a STEP exporter would write them.
///
/// ```text
///   t_i ---- t_i+1      top ring    (z = thickness)
///    |         |
///   b_i ---- b_i+1      bottom ring (z = 0)
/// ```
pub fn make_prism(
    name: impl Into<String>,
    outer: &[Point2],
    holes: &[Vec<Point2>],
    thickness: f64,
) -> Solid {
    let mut solid = Solid::new(name);
    let mut bottom_loops = Vec::new();
    let mut top_loops = Vec::new();
    let mut sides = Vec::new();

    let rings = std::iter::once((outer.to_vec(), true))
        .chain(holes.iter().map(|h| (h.clone(), false)));

    for (mut ring, is_outer) in rings {
        let ccw = signed_area(&ring) > 0.0;
        if ccw != is_outer {
            ring.reverse();
        }
        let n = ring.len();

        let bottom: Vec<VertexId> = ring
            .iter()
            .map(|p| solid.add_vertex(Point3::new(p.x, p.y, 0.0)))
            .collect();
        let top: Vec<VertexId> = ring
            .iter()
            .map(|p| solid.add_vertex(Point3::new(p.x, p.y, thickness)))
            .collect();

        let ring_edges = |solid: &mut Solid, vs: &[VertexId]| -> Vec<EdgeId> {
            (0..n)
                .map(|i| solid.add_edge(vs[i], vs[(i + 1) % n], CurveKind::Line))
                .collect()
        };
        let bottom_edges = ring_edges(&mut solid, &bottom);
        let top_edges = ring_edges(&mut solid, &top);
        let verticals: Vec<EdgeId> = (0..n)
            .map(|i| solid.add_edge(bottom[i], top[i], CurveKind::Line))
            .collect();

        // Top face walks the ring as given; the bottom face walks it backwards.
        top_loops.push(Loop::new(
            top_edges.iter().map(|&e| OrientedEdge::new(e, true)).collect(),
            is_outer,
        ));
        bottom_loops.push(Loop::new(
            bottom_edges
                .iter()
                .rev()
                .map(|&e| OrientedEdge::new(e, false))
                .collect(),
            is_outer,
        ));

        for i in 0..n {
            let j = (i + 1) % n;
            let a = ring[i];
            let b = ring[j];
            let along = Vec3::new(b.x - a.x, b.y - a.y, 0.0);
            sides.push(Face::new(
                vec![Loop::new(
                    vec![
                        OrientedEdge::new(bottom_edges[i], true),
                        OrientedEdge::new(verticals[j], true),
                        OrientedEdge::new(top_edges[i], false),
                        OrientedEdge::new(verticals[i], false),
                    ],
                    true,
                )],
                Surface::Plane {
                    origin: Point3::new(a.x, a.y, 0.0),
                    normal: along.cross(&Vec3::z()),
                },
            ));
        }
    }

    solid.add_face(Face::new(
        bottom_loops,
        Surface::Plane {
            origin: Point3::origin(),
            normal: -Vec3::z(),
        },
    ));
    solid.add_face(Face::new(
        top_loops,
        Surface::Plane {
            origin: Point3::new(0.0, 0.0, thickness),
            normal: Vec3::z(),
        },
    ));
    for face in sides {
        solid.add_face(face);
    }
    solid
}

fn signed_area(ring: &[Point2]) -> f64 {
    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
    }
    area / 2.0
}
