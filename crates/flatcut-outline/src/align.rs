//! Alignment: lay the solid flat and square it up.
//!
//! Two rotations are composed. The first takes the thin axis onto +Z. The
//! second spins about Z so a reference edge of the chosen outer boundary
//! lies along X. Both are about the origin; translation is removed later by
//! normalization.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use flatcut_math::{Point3, Rotation, Tolerance, Vec3};
use flatcut_topo::Solid;

/// The rigid rotation applied to every vertex of a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentTransform {
    /// Composed rotation (thin axis first, then in-plane spin).
    pub rotation: Rotation,
    /// Thickness that produced the first rotation.
    pub thickness: f64,
    /// In-plane spin angle in radians, if the reference edge was usable.
    pub spin: Option<f64>,
}

impl AlignmentTransform {
    /// Compose the thin-axis rotation with an optional spin about Z by `-angle`.
    pub fn new(tilt: Rotation, spin: Option<f64>, thickness: f64) -> Self {
        let rotation = match spin {
            Some(angle) => tilt.then(&Rotation::about_z(-angle)),
            None => tilt,
        };
        Self {
            rotation,
            thickness,
            spin,
        }
    }

    /// Whether the in-plane step was applied.
    pub fn in_plane(&self) -> bool {
        self.spin.is_some()
    }

    /// Rotate a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.rotation.apply_point(p)
    }

    /// Rotated copy of a whole solid (outer and hole vertices alike).
    pub fn apply(&self, solid: &Solid) -> Solid {
        solid.transformed(&self.rotation)
    }
}

/// Rotation taking the thin-axis `direction` onto +Z.
///
/// Parallel input gives the identity; antiparallel input a half turn about X.
pub fn thickness_rotation(direction: &Vec3) -> Rotation {
    Rotation::aligning(direction, &Vec3::z()).unwrap_or_default()
}

/// In-plane angle of the reference edge of a boundary already lying in a
/// plane of constant Z.
///
/// `boundary` must be in loop order. The reference edge starts at the first
/// vertex after sorting by X then Y and runs to its successor in the loop,
/// so it is always a real edge of the boundary. Its angle is folded into
/// (-45°, 45°] by quarter turns so an already square outline is left as is.
/// Returns `None` if the edge is shorter than [`Tolerance::VERTEX`] or there
/// are fewer than two vertices.
pub fn reference_angle(boundary: &[Point3]) -> Option<f64> {
    let n = boundary.len();
    if n < 2 {
        return None;
    }
    let (start, a) = boundary
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))?;
    let b = &boundary[(start + 1) % n];

    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if dx.hypot(dy) < Tolerance::VERTEX.linear {
        return None;
    }
    Some(fold_quarter_turns(dy.atan2(dx)))
}

fn fold_quarter_turns(mut angle: f64) -> f64 {
    while angle > FRAC_PI_4 {
        angle -= FRAC_PI_2;
    }
    while angle <= -FRAC_PI_4 {
        angle += FRAC_PI_2;
    }
    angle
}
