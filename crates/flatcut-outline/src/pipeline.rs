//! End-to-end extraction for one solid, and a parallel batch driver.

use flatcut_math::{Point2, Point3};
use flatcut_topo::Solid;
use rayon::prelude::*;
use tracing::debug;

use crate::align::{reference_angle, thickness_rotation, AlignmentTransform};
use crate::diagnostics::{LoopError, SkipReason, Warning};
use crate::face::{select_face, FaceScore};
use crate::loops::{classify, extract_loop, ExtractedLoop};
use crate::outline::{assemble, Outline};
use crate::project::ProjectionPlane;
use crate::settings::ExtractSettings;
use crate::thickness::detect_thickness;

/// Everything known about one solid after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidReport {
    /// Name of the solid.
    pub name: String,
    /// The outline, or why the solid was skipped.
    pub outcome: Result<Outline, SkipReason>,
    /// Recoverable problems, in the order they were noticed.
    pub warnings: Vec<Warning>,
    /// The rotation applied, once it was determined.
    pub alignment: Option<AlignmentTransform>,
}

impl SolidReport {
    /// The outline, if one was produced.
    pub fn outline(&self) -> Option<&Outline> {
        self.outcome.as_ref().ok()
    }

    /// Why the solid was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        self.outcome.as_ref().err()
    }

    /// Whether the solid produced no outline.
    pub fn is_skipped(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Extract the cut outline of one solid.
pub fn extract_outline(solid: &Solid, settings: &ExtractSettings) -> SolidReport {
    let mut warnings = Vec::new();
    let mut alignment = None;
    let outcome = run(solid, settings, &mut warnings, &mut alignment);

    match &outcome {
        Ok(outline) => debug!(
            solid = %solid.name,
            vertices = outline.outer.len(),
            holes = outline.holes.len(),
            warnings = warnings.len(),
            "outline extracted"
        ),
        Err(reason) => debug!(solid = %solid.name, %reason, "solid skipped"),
    }

    SolidReport {
        name: solid.name.clone(),
        outcome,
        warnings,
        alignment,
    }
}

/// Extract every solid in parallel. Reports come back in input order.
pub fn extract_outlines(solids: &[Solid], settings: &ExtractSettings) -> Vec<SolidReport> {
    solids
        .par_iter()
        .map(|solid| extract_outline(solid, settings))
        .collect()
}

fn run(
    solid: &Solid,
    settings: &ExtractSettings,
    warnings: &mut Vec<Warning>,
    alignment: &mut Option<AlignmentTransform>,
) -> Result<Outline, SkipReason> {
    if solid.faces.is_empty() {
        return Err(SkipReason::NoFaces);
    }

    let estimate = detect_thickness(solid, settings, warnings)?;
    let tilt = thickness_rotation(&estimate.direction);
    let tilted = solid.transformed(&tilt);

    // Vertex order is topological, so one walk serves every frame.
    let walked: Vec<Vec<Result<ExtractedLoop, LoopError>>> = solid
        .faces
        .iter()
        .map(|face| face.loops.iter().map(|lp| extract_loop(solid, lp)).collect())
        .collect();

    let scores: Vec<FaceScore> = tilted
        .faces
        .iter()
        .zip(&walked)
        .enumerate()
        .map(|(index, (face, loops))| {
            let positions: Vec<Vec<Point3>> =
                loops.iter().flatten().map(|lp| lp.positions(&tilted)).collect();
            FaceScore::measure(index, &positions, &tilted.face_points(face))
        })
        .collect();
    let selection = select_face(&scores, settings.face_normal_dot).ok_or(SkipReason::NoFaces)?;
    if selection.fallback {
        warnings.push(Warning::FaceNormalFallback);
    }
    debug!(
        solid = %solid.name,
        face = selection.index,
        vertices = scores[selection.index].vertex_count,
        fallback = selection.fallback,
        "face selected"
    );

    let mut usable: Vec<(usize, &ExtractedLoop)> = Vec::new();
    for (index, walk) in walked[selection.index].iter().enumerate() {
        match walk {
            Ok(lp) => {
                if !lp.curved.is_empty() {
                    warnings.push(Warning::CurvedEdge {
                        index,
                        count: lp.curved.len(),
                        kinds: lp.curve_summary(),
                    });
                }
                usable.push((index, lp));
            }
            Err(reason) => warnings.push(Warning::BrokenLoop {
                index,
                reason: reason.clone(),
            }),
        }
    }

    let flat: Vec<Vec<Point3>> = usable.iter().map(|(_, lp)| lp.positions(&tilted)).collect();
    let split = classify(&flat).ok_or(SkipReason::NoUsableLoops)?;
    if let Some(tie) = split.tie {
        warnings.push(Warning::AmbiguousOuterLoop {
            first: usable[split.outer].0,
            second: usable[tie].0,
        });
    }

    let spin = reference_angle(&flat[split.outer]);
    if spin.is_none() {
        warnings.push(Warning::DegenerateReferenceEdge);
    }
    let transform = AlignmentTransform::new(tilt, spin, estimate.thickness);
    *alignment = Some(transform);
    let aligned = transform.apply(solid);

    let outer3 = usable[split.outer].1.positions(&aligned);
    let plane = ProjectionPlane::fit(&outer3);
    let outer = plane.project_all(&outer3);
    let holes: Vec<Vec<Point2>> = split
        .holes
        .iter()
        .map(|&i| plane.project_all(&usable[i].1.positions(&aligned)))
        .collect();
    debug!(
        solid = %solid.name,
        thickness = estimate.thickness,
        spin = ?spin,
        plane = ?plane,
        holes = holes.len(),
        "solid aligned and projected"
    );

    assemble(&solid.name, &outer, &holes, warnings)
}
