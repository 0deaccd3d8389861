//! Fundamental geometry entities: points, directions, placements, and the
//! surface a face lies on.

use flatcut_math::{Dir3, Point3, Vec3};
use flatcut_topo::Surface;

use super::EntityArgs;
use crate::error::StepError;
use crate::parser::StepFile;

/// Parse a CARTESIAN_POINT entity.
///
/// STEP syntax: `CARTESIAN_POINT(name, (x, y, z))`
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = file.require(id)?;
    if entity.type_name != "CARTESIAN_POINT" {
        return Err(StepError::type_mismatch(id, "CARTESIAN_POINT", &entity.type_name));
    }

    match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
        // 2D points appear in some AP203 files; they lie in z = 0.
        [x, y] => Ok(Point3::new(*x, *y, 0.0)),
        coords => Err(StepError::parser(
            Some(id),
            format!("CARTESIAN_POINT needs 3 coordinates, got {}", coords.len()),
        )),
    }
}

/// Parse a DIRECTION entity.
///
/// STEP syntax: `DIRECTION(name, (x, y, z))`
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Dir3, StepError> {
    let entity = file.require(id)?;
    if entity.type_name != "DIRECTION" {
        return Err(StepError::type_mismatch(id, "DIRECTION", &entity.type_name));
    }

    let v = match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Vec3::new(*x, *y, *z),
        coords => {
            return Err(StepError::parser(
                Some(id),
                format!("DIRECTION needs 3 components, got {}", coords.len()),
            ))
        }
    };
    Dir3::try_new(v, 1e-15).ok_or_else(|| StepError::invalid_geometry(id, "zero-length direction"))
}

/// Axis placement data (origin + optional directions).
#[derive(Debug, Clone)]
pub struct AxisPlacement {
    /// Location point.
    pub location: Point3,
    /// Z-axis direction (normal).
    pub axis: Option<Dir3>,
    /// X-axis direction (reference).
    pub ref_direction: Option<Dir3>,
}

impl AxisPlacement {
    /// Z-axis direction, defaulting to +Z if not specified.
    pub fn z_axis(&self) -> Dir3 {
        self.axis.unwrap_or_else(|| Dir3::new_normalize(Vec3::z()))
    }
}

/// Parse an AXIS2_PLACEMENT_3D entity (point + two directions).
///
/// STEP syntax: `AXIS2_PLACEMENT_3D(name, location, axis, ref_direction)`
pub fn parse_axis2_placement_3d(file: &StepFile, id: u64) -> Result<AxisPlacement, StepError> {
    let entity = file.require(id)?;
    if entity.type_name != "AXIS2_PLACEMENT_3D" {
        return Err(StepError::type_mismatch(id, "AXIS2_PLACEMENT_3D", &entity.type_name));
    }

    let location = parse_cartesian_point(file, entity.entity_ref(1)?)?;
    let optional_dir = |idx: usize| -> Result<Option<Dir3>, StepError> {
        if entity.is_null(idx) {
            return Ok(None);
        }
        parse_direction(file, entity.entity_ref(idx)?).map(Some)
    };

    Ok(AxisPlacement {
        location,
        axis: optional_dir(2)?,
        ref_direction: optional_dir(3)?,
    })
}

/// Decode the surface under a face.
///
/// Only planes are decoded geometrically; everything else is kept by name so
/// callers can report it.
pub fn parse_surface(file: &StepFile, id: u64) -> Result<Surface, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "PLANE" => {
            let placement = parse_axis2_placement_3d(file, entity.entity_ref(1)?)?;
            Ok(Surface::Plane {
                origin: placement.location,
                normal: placement.z_axis().into_inner(),
            })
        }
        other => Ok(Surface::Other(other.to_string())),
    }
}
