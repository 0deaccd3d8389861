//! Dropping the thin axis.

use flatcut_math::{Bounds3, Point2, Point3};
use serde::{Deserialize, Serialize};

/// The coordinate plane an aligned solid is flattened onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionPlane {
    /// Keep x and y (drop z).
    XY,
    /// Keep x and z (drop y).
    XZ,
    /// Keep y and z (drop x).
    YZ,
}

impl ProjectionPlane {
    /// Drop the axis with the smallest extent over `points`.
    ///
    /// Ties drop z before y before x. An empty input gives [`ProjectionPlane::XY`].
    pub fn fit(points: &[Point3]) -> Self {
        let Some(bounds) = Bounds3::from_points(points.iter()) else {
            return Self::XY;
        };
        let e = bounds.extent();
        if e.z <= e.x && e.z <= e.y {
            Self::XY
        } else if e.y <= e.x {
            Self::XZ
        } else {
            Self::YZ
        }
    }

    /// Project one point, keeping the two remaining axes in ascending order.
    pub fn project(&self, p: &Point3) -> Point2 {
        match self {
            Self::XY => Point2::new(p.x, p.y),
            Self::XZ => Point2::new(p.x, p.z),
            Self::YZ => Point2::new(p.y, p.z),
        }
    }

    /// Project a sequence, preserving order.
    pub fn project_all(&self, points: &[Point3]) -> Vec<Point2> {
        points.iter().map(|p| self.project(p)).collect()
    }
}
