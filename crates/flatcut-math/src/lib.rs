#![warn(missing_docs)]

//! Math types for the flatcut outline extractor.
//!
//! Thin wrappers around nalgebra providing the handful of domain types the
//! pipeline needs: points and vectors, a pure 3×3 rotation with the
//! alignment constructors used to lay a thin solid flat, axis-aligned
//! bounds, and tolerance constants.

use nalgebra::{Matrix3, Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the 2D projection plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A rigid rotation about the origin, stored as a 3x3 orthonormal matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// The underlying 3x3 matrix.
    pub matrix: Matrix3<f64>,
}

impl Rotation {
    /// Identity rotation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn about_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn about_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix3::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Shortest rotation taking direction `from` onto direction `to`.
    ///
    /// Rotates about `from × to` by the angle between them. The parallel case
    /// is the identity and the antiparallel case is a half turn about an axis
    /// perpendicular to `from`. Returns `None` if either vector has zero length.
    pub fn aligning(from: &Vec3, to: &Vec3) -> Option<Self> {
        let a = from.try_normalize(1e-12)?;
        let b = to.try_normalize(1e-12)?;
        let cos = a.dot(&b).clamp(-1.0, 1.0);
        let axis = a.cross(&b);
        let sin = axis.norm();

        if sin < 1e-12 {
            if cos > 0.0 {
                return Some(Self::identity());
            }
            // Antiparallel: any axis perpendicular to `a` works.
            let seed = if a.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
            let perp = Dir3::new_normalize(seed - seed.dot(&a) * a);
            return Some(Self::about_axis(&perp, std::f64::consts::PI));
        }

        let angle = sin.atan2(cos);
        Some(Self::about_axis(&Dir3::new_normalize(axis), angle))
    }

    /// Compose: `self` then `other` (`other * self`).
    ///
    /// `a.then(&b).apply_point(p) == b.apply_point(&a.apply_point(p))`.
    pub fn then(&self, other: &Rotation) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Rotate a point about the origin.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.matrix * p.coords)
    }

    /// Rotate a vector.
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix * v
    }

    /// Inverse rotation (the transpose).
    pub fn inverse(&self) -> Self {
        Self {
            matrix: self.matrix.transpose(),
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounds of a point set in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Bounds3 {
    /// Bounds of the given points, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    /// Extent along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Orientation-agnostic surface proxy `wx·wy + wy·wz + wz·wx`.
    ///
    /// For a flat, axis-aligned region this is its area; it stays meaningful
    /// when the region is not yet lying in a coordinate plane.
    pub fn area_proxy(&self) -> f64 {
        let e = self.extent();
        e.x * e.y + e.y * e.z + e.z * e.x
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units (mm).
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Tight numeric tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Tolerance used to decide that two B-rep vertices are the same point.
    pub const VERTEX: Self = Self {
        linear: 0.01,
        angular: 1e-6,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
