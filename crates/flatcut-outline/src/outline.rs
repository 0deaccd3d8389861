//! The cut-ready result for one solid.

use flatcut_math::Point2;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{SkipReason, Warning};
use crate::normalize::{normalize, origin_of};
use crate::polygon::Polygon2D;

/// Outer boundary and holes of one part, in integer millimetres.
///
/// All polygons share one frame: the outer boundary's minimum corner before
/// rounding is the origin, and y points up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Name of the source solid.
    pub name: String,
    /// Outer boundary.
    pub outer: Polygon2D,
    /// Interior holes, in face order.
    pub holes: Vec<Polygon2D>,
}

impl Outline {
    /// Outer bounding-box width.
    pub fn width(&self) -> i64 {
        self.outer.width()
    }

    /// Outer bounding-box height.
    pub fn height(&self) -> i64 {
        self.outer.height()
    }

    /// Outer polygon followed by the holes.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon2D> {
        std::iter::once(&self.outer).chain(&self.holes)
    }
}

/// Normalize projected boundaries into an [`Outline`].
///
/// The outer boundary must survive with non-zero area or the solid is
/// skipped. A hole that collapses is dropped with a warning.
pub fn assemble(
    name: &str,
    outer: &[Point2],
    holes: &[Vec<Point2>],
    warnings: &mut Vec<Warning>,
) -> Result<Outline, SkipReason> {
    let origin = origin_of(outer);
    let outer = normalize(outer, &origin).map_err(|points| SkipReason::DegenerateOuter { points })?;
    if outer.twice_signed_area() == 0 {
        return Err(SkipReason::DegenerateOuter { points: outer.len() });
    }

    let mut kept = Vec::with_capacity(holes.len());
    for (index, hole) in holes.iter().enumerate() {
        match normalize(hole, &origin) {
            Ok(polygon) => kept.push(polygon),
            Err(points) => warnings.push(Warning::HoleDropped { index, points }),
        }
    }

    Ok(Outline {
        name: name.to_string(),
        outer,
        holes: kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::IPoint2;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ]
    }

    #[test]
    fn test_holes_share_outer_origin() {
        let mut warnings = Vec::new();
        let outline = assemble(
            "plate",
            &rect(-20.0, 7.0, 40.0, 50.0),
            &[rect(-15.0, 12.0, 10.0, 10.0)],
            &mut warnings,
        )
        .unwrap();
        assert_eq!((outline.width(), outline.height()), (40, 50));
        assert_eq!(
            outline.holes[0].bbox(),
            (IPoint2::new(5, 5), IPoint2::new(15, 15))
        );
        assert!(warnings.is_empty());
        assert_eq!(outline.polygons().count(), 2);
    }

    #[test]
    fn test_collapsed_hole_dropped() {
        let mut warnings = Vec::new();
        let outline = assemble(
            "plate",
            &rect(0.0, 0.0, 40.0, 50.0),
            &[rect(5.0, 5.0, 0.2, 0.2), rect(20.0, 20.0, 5.0, 5.0)],
            &mut warnings,
        )
        .unwrap();
        assert_eq!(outline.holes.len(), 1);
        assert_eq!(warnings, vec![Warning::HoleDropped { index: 0, points: 1 }]);
    }

    #[test]
    fn test_degenerate_outer() {
        let mut warnings = Vec::new();
        let err = assemble("x", &rect(0.0, 0.0, 0.3, 0.3), &[], &mut warnings).unwrap_err();
        assert_eq!(err, SkipReason::DegenerateOuter { points: 1 });

        // three distinct but collinear points have no area
        let line = vec![Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(10.0, 0.0)];
        let err = assemble("x", &line, &[], &mut warnings).unwrap_err();
        assert_eq!(err, SkipReason::DegenerateOuter { points: 3 });
    }
}
