//! Choosing the face that carries the sheet outline.
//!
//! After the thin axis is on Z, the sheet's two flat faces have normals
//! along Z. Those are the candidates; among them the one with the most
//! boundary vertices wins, then the one with the larger extent, then the
//! earlier one. If no face passes the normal test every face is ranked.

use flatcut_math::{Bounds3, Point3, Vec3};

/// Ranking inputs for one face, measured after the thin axis is on Z.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceScore {
    /// Face index in the solid.
    pub index: usize,
    /// Boundary vertices over all usable loops (one per edge).
    pub vertex_count: usize,
    /// Bounding-box surface proxy of the face's vertices.
    pub area: f64,
    /// `|n̂·Z|` of the face's Newell normal; 0 if the normal is undefined.
    pub normal_dot: f64,
}

impl FaceScore {
    /// Score a face from its ordered loops and its vertex cloud.
    pub fn measure(index: usize, loops: &[Vec<Point3>], points: &[Point3]) -> Self {
        let normal = loops
            .iter()
            .fold(Vec3::zeros(), |acc, lp| acc + newell_normal(lp));
        let normal_dot = normal.try_normalize(1e-12).map_or(0.0, |n| n.z.abs());
        Self {
            index,
            vertex_count: loops.iter().map(Vec::len).sum(),
            area: Bounds3::from_points(points.iter()).map_or(0.0, |b| b.area_proxy()),
            normal_dot,
        }
    }

    fn outranks(&self, other: &FaceScore) -> bool {
        if self.vertex_count != other.vertex_count {
            return self.vertex_count > other.vertex_count;
        }
        let scale = self.area.abs().max(other.area.abs()).max(1.0);
        self.area - other.area > 1e-9 * scale
    }
}

/// Newell's method: area-weighted normal of a closed polygon, robust to
/// collinear and slightly non-planar vertices. Length is twice the area.
pub fn newell_normal(points: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

/// Outcome of face selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Chosen face index.
    pub index: usize,
    /// Whether no face passed the normal test.
    pub fallback: bool,
}

/// Choose the outline face. `None` only when there are no faces.
pub fn select_face(scores: &[FaceScore], min_normal_dot: f64) -> Option<Selection> {
    let best_of = |flat_only: bool| {
        scores
            .iter()
            .filter(|s| !flat_only || s.normal_dot >= min_normal_dot)
            .fold(None, |best: Option<&FaceScore>, s| match best {
                Some(b) if !s.outranks(b) => Some(b),
                _ => Some(s),
            })
    };

    match best_of(true) {
        Some(s) => Some(Selection {
            index: s.index,
            fallback: false,
        }),
        None => best_of(false).map(|s| Selection {
            index: s.index,
            fallback: true,
        }),
    }
}
