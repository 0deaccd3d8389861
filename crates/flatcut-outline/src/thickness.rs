//! Thin-axis detection.
//!
//! The sheet thickness shows up as the smallest vertex-to-vertex distance
//! between two different faces that falls inside the configured band. The
//! vector realizing that distance is the thin axis.

use flatcut_math::{Bounds3, Point3, Vec3};
use flatcut_topo::Solid;
use tracing::debug;

use crate::diagnostics::{SkipReason, Warning};
use crate::settings::ExtractSettings;

/// Result of thickness detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThicknessEstimate {
    /// Measured separation.
    pub thickness: f64,
    /// Unit thin-axis direction, with its dominant component positive.
    pub direction: Vec3,
    /// Face indices realizing the separation, if it came from the face-pair
    /// scan.
    pub faces: Option<(usize, usize)>,
}

/// A measured separation between two points.
#[derive(Debug, Clone, Copy)]
struct Separation {
    distance: f64,
    vector: Vec3,
    faces: Option<(usize, usize)>,
}

impl Separation {
    fn between(a: &Point3, b: &Point3, faces: Option<(usize, usize)>) -> Self {
        let vector = b - a;
        Self {
            distance: vector.norm(),
            vector,
            faces,
        }
    }

    fn is_axis_aligned(&self, ratio: f64) -> bool {
        self.distance > 0.0 && self.vector.amax() / self.distance > ratio
    }

    fn into_estimate(self) -> ThicknessEstimate {
        ThicknessEstimate {
            thickness: self.distance,
            direction: canonical_direction(&self.vector),
            faces: self.faces,
        }
    }
}

/// Normalize `v` and flip it so its largest-magnitude component is positive.
fn canonical_direction(v: &Vec3) -> Vec3 {
    let unit = v.normalize();
    if unit[unit.iamax()] < 0.0 {
        -unit
    } else {
        unit
    }
}

/// Closest non-coincident pair between two point sets.
fn closest_between(
    a: &[Point3],
    b: &[Point3],
    epsilon: f64,
    faces: (usize, usize),
) -> Option<Separation> {
    let mut best: Option<Separation> = None;
    for p in a {
        for q in b {
            let s = Separation::between(p, q, Some(faces));
            if s.distance < epsilon {
                continue;
            }
            if best.map_or(true, |cur| s.distance < cur.distance) {
                best = Some(s);
            }
        }
    }
    best
}

/// Running minima over in-band separations, first one wins ties.
///
/// Tracks the axis-aligned pass and the relaxed pass side by side; the
/// relaxed minimum is used only if no axis-aligned separation was offered.
#[derive(Debug, Clone, Copy)]
struct BandMinimum<'a> {
    settings: &'a ExtractSettings,
    aligned: Option<Separation>,
    any: Option<Separation>,
}

impl<'a> BandMinimum<'a> {
    fn new(settings: &'a ExtractSettings) -> Self {
        Self {
            settings,
            aligned: None,
            any: None,
        }
    }

    fn offer(&mut self, s: Separation) {
        if !self.settings.in_band(s.distance) {
            return;
        }
        let closer = |best: &Option<Separation>| best.map_or(true, |b| s.distance < b.distance);
        if s.is_axis_aligned(self.settings.axis_alignment_ratio) && closer(&self.aligned) {
            self.aligned = Some(s);
        }
        if closer(&self.any) {
            self.any = Some(s);
        }
    }

    fn best(self) -> Option<Separation> {
        self.aligned.or(self.any)
    }
}

/// Unique vertex positions of every face, in face order.
pub fn face_vertex_sets(solid: &Solid) -> Vec<Vec<Point3>> {
    solid.faces.iter().map(|f| solid.face_points(f)).collect()
}

/// Scan every pair of distinct faces.
pub fn scan_face_pairs(sets: &[Vec<Point3>], settings: &ExtractSettings) -> Option<ThicknessEstimate> {
    let mut minimum = BandMinimum::new(settings);
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            if let Some(s) = closest_between(&sets[i], &sets[j], settings.coincident_epsilon, (i, j)) {
                minimum.offer(s);
            }
        }
    }
    minimum.best().map(Separation::into_estimate)
}

/// Scan every pair of vertices regardless of face membership.
pub fn scan_all_vertices(points: &[Point3], settings: &ExtractSettings) -> Option<ThicknessEstimate> {
    let mut minimum = BandMinimum::new(settings);
    for (i, p) in points.iter().enumerate() {
        for q in &points[i + 1..] {
            let s = Separation::between(p, q, None);
            if s.distance >= settings.coincident_epsilon {
                minimum.offer(s);
            }
        }
    }
    minimum.best().map(Separation::into_estimate)
}

/// Detect the thin axis of a solid.
///
/// Face pairs are scanned first. When the solid's Z extent dwarfs the
/// detected separation, the whole vertex set is rescanned without grouping;
/// a hit from the rescan replaces the face-pair result.
pub fn detect_thickness(
    solid: &Solid,
    settings: &ExtractSettings,
    warnings: &mut Vec<Warning>,
) -> Result<ThicknessEstimate, SkipReason> {
    let sets = face_vertex_sets(solid);
    let (band_min, band_max) = settings.band();
    let estimate =
        scan_face_pairs(&sets, settings).ok_or(SkipReason::NoThicknessMatch { band_min, band_max })?;

    let all_points: Vec<Point3> = solid.vertices.values().copied().collect();
    let extent = Bounds3::from_points(all_points.iter())
        .map(|b| b.extent().z)
        .unwrap_or_default();

    if extent - estimate.thickness <= settings.wrong_pair_extent {
        debug!(
            solid = %solid.name,
            thickness = estimate.thickness,
            faces = ?estimate.faces,
            "thickness detected"
        );
        return Ok(estimate);
    }

    let rescan = scan_all_vertices(&all_points, settings);
    warnings.push(Warning::SuspectFacePair {
        extent,
        separation: estimate.thickness,
        replaced: rescan.is_some(),
    });
    debug!(
        solid = %solid.name,
        extent,
        face_pair = estimate.thickness,
        rescan = ?rescan.map(|r| r.thickness),
        "thickness rescanned over all vertices"
    );
    Ok(rescan.unwrap_or(estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flatcut_math::{Point2, Rotation};
    use flatcut_topo::make_prism;

    fn rect(w: f64, h: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    #[test]
    fn test_flat_plate() {
        let solid = make_prism("plate", &rect(170.0, 150.0), &[], 3.0);
        let mut warnings = Vec::new();
        let est = detect_thickness(&solid, &ExtractSettings::default(), &mut warnings).unwrap();
        assert_relative_eq!(est.thickness, 3.0);
        assert_relative_eq!(est.direction, Vec3::z());
        // bottom and top are the first two faces
        assert_eq!(est.faces, Some((0, 1)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_direction_is_canonical() {
        let solid = make_prism("plate", &rect(40.0, 50.0), &[], 3.0)
            .transformed(&Rotation::about_x(std::f64::consts::PI));
        let mut warnings = Vec::new();
        let est = detect_thickness(&solid, &ExtractSettings::default(), &mut warnings).unwrap();
        assert_relative_eq!(est.direction, Vec3::z(), epsilon = 1e-9);
    }

    #[test]
    fn test_tilted_plate_uses_relaxed_pass() {
        let axis = flatcut_math::Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let tilt = Rotation::about_axis(&axis, 1.0);
        let solid = make_prism("plate", &rect(40.0, 50.0), &[], 3.0).transformed(&tilt);
        let mut warnings = Vec::new();
        let est = detect_thickness(&solid, &ExtractSettings::default(), &mut warnings).unwrap();
        assert_relative_eq!(est.thickness, 3.0, epsilon = 1e-9);
        let expected = tilt.apply_vec(&Vec3::z());
        assert_relative_eq!(est.direction.dot(&expected).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_match_is_skip() {
        let solid = make_prism("block", &rect(40.0, 50.0), &[], 10.0);
        let mut warnings = Vec::new();
        let err = detect_thickness(&solid, &ExtractSettings::default(), &mut warnings).unwrap_err();
        assert_eq!(
            err,
            SkipReason::NoThicknessMatch {
                band_min: 2.5,
                band_max: 3.5
            }
        );
    }

    #[test]
    fn test_standing_plate_triggers_rescan() {
        // 120 mm tall in Z, 3 mm thin along Y
        let solid = make_prism("fin", &rect(80.0, 3.0), &[], 120.0);
        let mut warnings = Vec::new();
        let est = detect_thickness(&solid, &ExtractSettings::default(), &mut warnings).unwrap();
        assert_relative_eq!(est.thickness, 3.0);
        assert_relative_eq!(est.direction, Vec3::y());
        assert_eq!(est.faces, None);
        assert!(matches!(
            warnings.as_slice(),
            [Warning::SuspectFacePair { replaced: true, .. }]
        ));
    }

    #[test]
    fn test_coincident_points_ignored() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 3.0)];
        let b = [Point3::new(0.05, 0.0, 0.0)];
        let s = closest_between(&a, &b, 0.1, (0, 1)).unwrap();
        assert!(s.distance > 2.9);
    }

    #[test]
    fn test_band_minimum_prefers_aligned() {
        let settings = ExtractSettings::default();
        let mut minimum = BandMinimum::new(&settings);
        assert!(minimum.best().is_none());

        let o = Point3::origin();
        // out of band, then an oblique 2.6 and an aligned 3.2
        minimum.offer(Separation::between(&o, &Point3::new(0.0, 0.0, 9.0), None));
        minimum.offer(Separation::between(&o, &Point3::new(1.84, 1.84, 0.0), None));
        minimum.offer(Separation::between(&o, &Point3::new(0.0, 0.0, 3.2), None));
        minimum.offer(Separation::between(&o, &Point3::new(3.2, 0.0, 0.0), None));
        let best = minimum.best().unwrap();
        assert_relative_eq!(best.distance, 3.2);
        assert_relative_eq!(best.vector, Vec3::new(0.0, 0.0, 3.2));
    }

    #[test]
    fn test_band_minimum_relaxed_fallback() {
        let settings = ExtractSettings::default();
        let mut minimum = BandMinimum::new(&settings);
        minimum.offer(Separation::between(&Point3::origin(), &Point3::new(2.0, 2.0, 0.0), None));
        assert_relative_eq!(minimum.best().unwrap().distance, 8_f64.sqrt());
    }

    #[test]
    fn test_standing_grid_rescan() {
        // standing plate with a subdivided bottom edge; only the two 3 mm
        // end pairs are in band
        let mut outer: Vec<Point2> = (0..=25).map(|i| Point2::new(f64::from(i) * 4.0, 0.0)).collect();
        outer.push(Point2::new(100.0, 3.0));
        outer.push(Point2::new(0.0, 3.0));
        let solid = make_prism("fin", &outer, &[], 150.0);
        let est = scan_all_vertices(
            &solid.vertices.values().copied().collect::<Vec<_>>(),
            &ExtractSettings::default(),
        )
        .unwrap();
        assert_relative_eq!(est.thickness, 3.0);
        assert_relative_eq!(est.direction, Vec3::y());
    }

    #[test]
    fn test_axis_alignment_ratio() {
        let s = Separation::between(&Point3::origin(), &Point3::new(1.0, 1.0, 0.0), None);
        assert!(!s.is_axis_aligned(0.8));
        let s = Separation::between(&Point3::origin(), &Point3::new(0.1, 0.0, 3.0), None);
        assert!(s.is_axis_aligned(0.8));
    }
}
