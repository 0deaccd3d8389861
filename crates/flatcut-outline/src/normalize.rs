//! Shift, round and de-duplicate projected boundaries.

use flatcut_math::Point2;

use crate::polygon::{IPoint2, Polygon2D};

/// Minimum x and y of a point set; the origin every boundary of an outline
/// is shifted by. Empty input gives (0, 0).
pub fn origin_of(points: &[Point2]) -> Point2 {
    match points.split_first() {
        None => Point2::origin(),
        Some((first, rest)) => rest.iter().fold(*first, |acc, p| {
            Point2::new(acc.x.min(p.x), acc.y.min(p.y))
        }),
    }
}

/// Shift by `origin`, round half away from zero, and drop repeats.
///
/// A point equal to its predecessor is dropped, then trailing points equal
/// to the first. Order is never changed and non-consecutive repeats stay.
pub fn normalize_points(points: &[Point2], origin: &Point2) -> Vec<IPoint2> {
    let mut out: Vec<IPoint2> = Vec::with_capacity(points.len());
    for p in points {
        let q = IPoint2::new(round(p.x - origin.x), round(p.y - origin.y));
        if out.last() != Some(&q) {
            out.push(q);
        }
    }
    while out.len() > 1 && out.last() == out.first() {
        out.pop();
    }
    out
}

/// [`normalize_points`] followed by the polygon invariants. Fails with the
/// number of surviving points when fewer than three are left.
pub fn normalize(points: &[Point2], origin: &Point2) -> Result<Polygon2D, usize> {
    let pts = normalize_points(points, origin);
    let count = pts.len();
    Polygon2D::new(pts).map_err(|_| count)
}

fn round(v: f64) -> i64 {
    // f64::round is half away from zero; `as` saturates on overflow
    v.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2(raw: &[(f64, f64)]) -> Vec<Point2> {
        raw.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn ip(raw: &[(i64, i64)]) -> Vec<IPoint2> {
        raw.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn test_origin() {
        let pts = p2(&[(3.0, -1.0), (-2.5, 4.0), (7.0, 0.5)]);
        assert_eq!(origin_of(&pts), Point2::new(-2.5, -1.0));
        assert_eq!(origin_of(&[]), Point2::origin());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let pts = p2(&[(0.5, -0.5), (1.49, 2.5), (-2.5, 0.0)]);
        let out = normalize_points(&pts, &Point2::origin());
        assert_eq!(out, ip(&[(1, -1), (1, 3), (-3, 0)]));
    }

    #[test]
    fn test_consecutive_and_trailing_duplicates() {
        let pts = p2(&[
            (0.0, 0.0),
            (0.2, 0.1),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.1, -0.2),
            (-0.3, 0.0),
        ]);
        let out = normalize_points(&pts, &Point2::origin());
        assert_eq!(out, ip(&[(0, 0), (10, 0), (10, 10), (0, 10)]));
    }

    #[test]
    fn test_non_consecutive_duplicates_kept() {
        let pts = p2(&[(0.0, 0.0), (2.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 2.0), (1.0, 1.0)]);
        assert_eq!(normalize_points(&pts, &Point2::origin()).len(), 6);
    }

    #[test]
    fn test_origin_shift() {
        let pts = p2(&[(100.4, 200.0), (140.4, 200.0), (140.4, 250.0)]);
        let origin = origin_of(&pts);
        let poly = normalize(&pts, &origin).unwrap();
        assert_eq!(poly.points(), ip(&[(0, 0), (40, 0), (40, 50)]).as_slice());
    }

    #[test]
    fn test_collapse_reports_count() {
        let sliver = p2(&[(0.0, 0.0), (0.3, 0.0), (0.3, 0.2), (10.0, 0.0)]);
        assert_eq!(normalize(&sliver, &Point2::origin()).unwrap_err(), 2);
        assert_eq!(normalize(&[], &Point2::origin()).unwrap_err(), 0);
    }
}
