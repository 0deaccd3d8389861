//! Integer polygons in the cutting plane.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rounded 2D point, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IPoint2 {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
}

impl IPoint2 {
    /// Create a point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for IPoint2 {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Invariant violations rejected by [`Polygon2D::new`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolygonError {
    /// Fewer than three points.
    #[error("polygon needs at least 3 points, got {count}")]
    TooFewPoints {
        /// Points supplied.
        count: usize,
    },

    /// Point `index` equals the next point (cyclically).
    #[error("point {index} equals its successor")]
    ConsecutiveDuplicate {
        /// Index of the first of the two.
        index: usize,
    },
}

/// A closed polygon: at least three points, no two cyclically consecutive
/// points equal. The closing edge is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<IPoint2>", into = "Vec<IPoint2>")]
pub struct Polygon2D {
    points: Vec<IPoint2>,
}

impl Polygon2D {
    /// Validate and wrap a point sequence.
    pub fn new(points: Vec<IPoint2>) -> Result<Self, PolygonError> {
        if points.len() < 3 {
            return Err(PolygonError::TooFewPoints {
                count: points.len(),
            });
        }
        let n = points.len();
        if let Some(index) = (0..n).find(|&i| points[i] == points[(i + 1) % n]) {
            return Err(PolygonError::ConsecutiveDuplicate { index });
        }
        Ok(Self { points })
    }

    /// The vertices in order.
    pub fn points(&self) -> &[IPoint2] {
        &self.points
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points. Never true for a constructed polygon.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Twice the signed area (shoelace). Positive for counter-clockwise.
    pub fn twice_signed_area(&self) -> i128 {
        self.edges()
            .map(|(a, b)| i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y))
            .sum()
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        self.twice_signed_area().unsigned_abs() as f64 / 2.0
    }

    /// Minimum and maximum corners.
    pub fn bbox(&self) -> (IPoint2, IPoint2) {
        let mut min = self.points[0];
        let mut max = self.points[0];
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Bounding-box width.
    pub fn width(&self) -> i64 {
        let (min, max) = self.bbox();
        max.x - min.x
    }

    /// Bounding-box height.
    pub fn height(&self) -> i64 {
        let (min, max) = self.bbox();
        max.y - min.y
    }

    /// Edges as point pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (IPoint2, IPoint2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

impl TryFrom<Vec<IPoint2>> for Polygon2D {
    type Error = PolygonError;

    fn try_from(points: Vec<IPoint2>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Polygon2D> for Vec<IPoint2> {
    fn from(polygon: Polygon2D) -> Self {
        polygon.points
    }
}
