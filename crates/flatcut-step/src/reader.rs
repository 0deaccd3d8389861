//! STEP file reader: converts parsed STEP data into flatcut solids.

use std::collections::HashMap;
use std::path::Path;

use flatcut_topo::{CurveKind, EdgeId, Face, Loop, OrientedEdge, Solid, VertexId};
use tracing::debug;

use crate::entities::{
    curve_kind, parse_edge_curve, parse_edge_loop, parse_face, parse_oriented_edge,
    parse_shell, parse_solid, parse_surface, parse_vertex_point, SOLID_TYPES,
};
use crate::error::StepError;
use crate::parser::{Parser, StepFile};

/// Read a STEP file from a path.
///
/// # Returns
///
/// Every B-rep solid in the file, in ascending entity-ID order.
pub fn read_step(path: impl AsRef<Path>) -> Result<Vec<Solid>, StepError> {
    let data = std::fs::read(path)?;
    read_step_from_buffer(&data)
}

/// Read a STEP file from a byte buffer.
///
/// # Returns
///
/// Every B-rep solid in the file, in ascending entity-ID order.
pub fn read_step_from_buffer(data: &[u8]) -> Result<Vec<Solid>, StepError> {
    let step_file = Parser::parse(data)?;
    debug!(
        entities = step_file.entities.len(),
        schemas = ?step_file.schemas(),
        "parsed STEP file"
    );
    StepReader::new(&step_file).read_all_solids()
}

/// Per-file reading context.
///
/// The ID maps are per solid: two solids never share vertices or edges even
/// if the file reuses entities between them.
struct StepReader<'a> {
    file: &'a StepFile,
    vertex_map: HashMap<u64, VertexId>,
    edge_map: HashMap<u64, EdgeId>,
    curve_cache: HashMap<u64, CurveKind>,
}

impl<'a> StepReader<'a> {
    fn new(file: &'a StepFile) -> Self {
        Self {
            file,
            vertex_map: HashMap::new(),
            edge_map: HashMap::new(),
            curve_cache: HashMap::new(),
        }
    }

    fn read_all_solids(&mut self) -> Result<Vec<Solid>, StepError> {
        let solid_ids: Vec<u64> = self
            .file
            .entities
            .values()
            .filter(|e| SOLID_TYPES.contains(&e.type_name.as_str()))
            .map(|e| e.id)
            .collect();
        if solid_ids.is_empty() {
            return Err(StepError::NoSolids);
        }

        let mut names = NameRegistry::default();
        let mut solids = Vec::with_capacity(solid_ids.len());
        for id in solid_ids {
            self.vertex_map.clear();
            self.edge_map.clear();

            let mut solid = self.read_solid(id)?;
            solid.name = names.claim(&solid.name, id);
            debug!(
                solid = %solid.name,
                entity = id,
                faces = solid.faces.len(),
                loops = solid.num_loops(),
                vertices = solid.vertices.len(),
                edges = solid.edges.len(),
                "read solid"
            );
            solids.push(solid);
        }

        Ok(solids)
    }

    fn read_solid(&mut self, solid_id: u64) -> Result<Solid, StepError> {
        let step_solid = parse_solid(self.file, solid_id)?;
        let mut solid = Solid::new(step_solid.name);

        for face_id in parse_shell(self.file, step_solid.outer_shell_id)? {
            let step_face = parse_face(self.file, face_id)?;
            let surface = parse_surface(self.file, step_face.surface_id)?;

            let mut loops = Vec::with_capacity(step_face.bounds.len());
            for bound in &step_face.bounds {
                let mut edges = Vec::new();
                for oe_id in parse_edge_loop(self.file, bound.loop_id)? {
                    let oe = parse_oriented_edge(self.file, oe_id)?;
                    let edge = self.edge(&mut solid, oe.edge_id)?;
                    edges.push(OrientedEdge::new(edge, oe.orientation));
                }
                loops.push(Loop::new(edges, bound.is_outer));
            }

            solid.add_face(Face::new(loops, surface));
        }

        Ok(solid)
    }

    fn vertex(&mut self, solid: &mut Solid, step_id: u64) -> Result<VertexId, StepError> {
        if let Some(&vid) = self.vertex_map.get(&step_id) {
            return Ok(vid);
        }
        let point = parse_vertex_point(self.file, step_id)?;
        let vid = solid.add_vertex(point);
        self.vertex_map.insert(step_id, vid);
        Ok(vid)
    }

    fn edge(&mut self, solid: &mut Solid, step_id: u64) -> Result<EdgeId, StepError> {
        if let Some(&eid) = self.edge_map.get(&step_id) {
            return Ok(eid);
        }
        let step_edge = parse_edge_curve(self.file, step_id)?;
        let start = self.vertex(solid, step_edge.start_vertex_id)?;
        let end = self.vertex(solid, step_edge.end_vertex_id)?;
        let curve = match self.curve_cache.get(&step_edge.curve_id) {
            Some(kind) => kind.clone(),
            None => {
                let kind = curve_kind(self.file, step_edge.curve_id)?;
                self.curve_cache.insert(step_edge.curve_id, kind.clone());
                kind
            }
        };
        let eid = solid.add_edge(start, end, curve);
        self.edge_map.insert(step_id, eid);
        Ok(eid)
    }
}

/// Hands out unique solid names.
#[derive(Default)]
struct NameRegistry {
    taken: HashMap<String, usize>,
}

impl NameRegistry {
    /// Blank names become `solid_<id>`; repeats get `_2`, `_3`, ...
    fn claim(&mut self, raw: &str, id: u64) -> String {
        let base = match raw.trim() {
            "" => format!("solid_{id}"),
            name => name.to_string(),
        };
        let count = self.taken.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return base;
        }
        let mut n = *count;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.taken.contains_key(&candidate) {
                self.taken.insert(candidate.clone(), 1);
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flatcut_topo::Surface;

    /// A 10 x 20 x 3 box written the way CAD exporters lay it out: shared
    /// EDGE_CURVEs referenced by two faces with opposite orientation.
    const BOX_STEP: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('flatcut test box'),'2;1');
FILE_NAME('box.step','2024-01-01T00:00:00',(''),(''),'','','');
FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('',(0.,0.,0.));
#2 = CARTESIAN_POINT('',(10.,0.,0.));
#3 = CARTESIAN_POINT('',(10.,20.,0.));
#4 = CARTESIAN_POINT('',(0.,20.,0.));
#5 = CARTESIAN_POINT('',(0.,0.,3.));
#6 = CARTESIAN_POINT('',(10.,0.,3.));
#7 = CARTESIAN_POINT('',(10.,20.,3.));
#8 = CARTESIAN_POINT('',(0.,20.,3.));
#11 = VERTEX_POINT('',#1);
#12 = VERTEX_POINT('',#2);
#13 = VERTEX_POINT('',#3);
#14 = VERTEX_POINT('',#4);
#15 = VERTEX_POINT('',#5);
#16 = VERTEX_POINT('',#6);
#17 = VERTEX_POINT('',#7);
#18 = VERTEX_POINT('',#8);
#20 = DIRECTION('',(1.,0.,0.));
#21 = VECTOR('',#20,1.);
#22 = LINE('',#1,#21);
#31 = EDGE_CURVE('',#11,#12,#22,.T.);
#32 = EDGE_CURVE('',#12,#13,#22,.T.);
#33 = EDGE_CURVE('',#13,#14,#22,.T.);
#34 = EDGE_CURVE('',#14,#11,#22,.T.);
#35 = EDGE_CURVE('',#15,#16,#22,.T.);
#36 = EDGE_CURVE('',#16,#17,#22,.T.);
#37 = EDGE_CURVE('',#17,#18,#22,.T.);
#38 = EDGE_CURVE('',#18,#15,#22,.T.);
#39 = EDGE_CURVE('',#11,#15,#22,.T.);
#40 = EDGE_CURVE('',#12,#16,#22,.T.);
#41 = EDGE_CURVE('',#13,#17,#22,.T.);
#42 = EDGE_CURVE('',#14,#18,#22,.T.);
#50 = DIRECTION('',(0.,0.,1.));
#51 = DIRECTION('',(0.,0.,-1.));
#52 = DIRECTION('',(0.,-1.,0.));
#53 = DIRECTION('',(1.,0.,0.));
#54 = DIRECTION('',(0.,1.,0.));
#55 = DIRECTION('',(-1.,0.,0.));
#60 = AXIS2_PLACEMENT_3D('',#1,#51,#20);
#61 = AXIS2_PLACEMENT_3D('',#5,#50,#20);
#62 = AXIS2_PLACEMENT_3D('',#1,#52,#20);
#63 = AXIS2_PLACEMENT_3D('',#2,#53,#20);
#64 = AXIS2_PLACEMENT_3D('',#3,#54,#20);
#65 = AXIS2_PLACEMENT_3D('',#4,#55,#20);
#70 = PLANE('',#60);
#71 = PLANE('',#61);
#72 = PLANE('',#62);
#73 = PLANE('',#63);
#74 = PLANE('',#64);
#75 = PLANE('',#65);
#100 = ORIENTED_EDGE('',*,*,#34,.F.);
#101 = ORIENTED_EDGE('',*,*,#33,.F.);
#102 = ORIENTED_EDGE('',*,*,#32,.F.);
#103 = ORIENTED_EDGE('',*,*,#31,.F.);
#104 = EDGE_LOOP('',(#100,#101,#102,#103));
#105 = FACE_OUTER_BOUND('',#104,.T.);
#106 = ADVANCED_FACE('',(#105),#70,.T.);
#110 = ORIENTED_EDGE('',*,*,#35,.T.);
#111 = ORIENTED_EDGE('',*,*,#36,.T.);
#112 = ORIENTED_EDGE('',*,*,#37,.T.);
#113 = ORIENTED_EDGE('',*,*,#38,.T.);
#114 = EDGE_LOOP('',(#110,#111,#112,#113));
#115 = FACE_OUTER_BOUND('',#114,.T.);
#116 = ADVANCED_FACE('',(#115),#71,.T.);
#120 = ORIENTED_EDGE('',*,*,#31,.T.);
#121 = ORIENTED_EDGE('',*,*,#40,.T.);
#122 = ORIENTED_EDGE('',*,*,#35,.F.);
#123 = ORIENTED_EDGE('',*,*,#39,.F.);
#124 = EDGE_LOOP('',(#120,#121,#122,#123));
#125 = FACE_OUTER_BOUND('',#124,.T.);
#126 = ADVANCED_FACE('',(#125),#72,.T.);
#130 = ORIENTED_EDGE('',*,*,#32,.T.);
#131 = ORIENTED_EDGE('',*,*,#41,.T.);
#132 = ORIENTED_EDGE('',*,*,#36,.F.);
#133 = ORIENTED_EDGE('',*,*,#40,.F.);
#134 = EDGE_LOOP('',(#130,#131,#132,#133));
#135 = FACE_OUTER_BOUND('',#134,.T.);
#136 = ADVANCED_FACE('',(#135),#73,.T.);
#140 = ORIENTED_EDGE('',*,*,#33,.T.);
#141 = ORIENTED_EDGE('',*,*,#42,.T.);
#142 = ORIENTED_EDGE('',*,*,#37,.F.);
#143 = ORIENTED_EDGE('',*,*,#41,.F.);
#144 = EDGE_LOOP('',(#140,#141,#142,#143));
#145 = FACE_OUTER_BOUND('',#144,.T.);
#146 = ADVANCED_FACE('',(#145),#74,.T.);
#150 = ORIENTED_EDGE('',*,*,#34,.T.);
#151 = ORIENTED_EDGE('',*,*,#39,.T.);
#152 = ORIENTED_EDGE('',*,*,#38,.F.);
#153 = ORIENTED_EDGE('',*,*,#42,.F.);
#154 = EDGE_LOOP('',(#150,#151,#152,#153));
#155 = FACE_OUTER_BOUND('',#154,.T.);
#156 = ADVANCED_FACE('',(#155),#75,.T.);
#160 = CLOSED_SHELL('',(#106,#116,#126,#136,#146,#156));
#161 = MANIFOLD_SOLID_BREP('plate',#160);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_read_box() {
        let solids = read_step_from_buffer(BOX_STEP.as_bytes()).unwrap();
        assert_eq!(solids.len(), 1);
        let solid = &solids[0];
        assert_eq!(solid.name, "plate");
        assert_eq!(solid.vertices.len(), 8);
        assert_eq!(solid.edges.len(), 12);
        assert_eq!(solid.faces.len(), 6);
        assert!(solid.edges.values().all(|e| e.curve == CurveKind::Line));

        match &solid.faces[1].surface {
            Surface::Plane { origin, normal } => {
                assert_relative_eq!(origin.z, 3.0);
                assert_relative_eq!(normal.z, 1.0);
            }
            other => panic!("expected plane, got {other:?}"),
        }
    }

    #[test]
    fn test_loops_close_through_shared_edges() {
        let solids = read_step_from_buffer(BOX_STEP.as_bytes()).unwrap();
        let solid = &solids[0];
        for face in &solid.faces {
            let lp = &face.loops[0];
            assert!(lp.declared_outer);
            for i in 0..lp.len() {
                let (_, end) = solid.oriented_endpoints(&lp.edges[i]).unwrap();
                let (next, _) = solid
                    .oriented_endpoints(&lp.edges[(i + 1) % lp.len()])
                    .unwrap();
                assert_eq!(end, next);
            }
        }
    }

    #[test]
    fn test_no_solids() {
        let input = "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n#1 = CARTESIAN_POINT('',(0.,0.,0.));\nENDSEC;\nEND-ISO-10303-21;\n";
        assert!(matches!(
            read_step_from_buffer(input.as_bytes()),
            Err(StepError::NoSolids)
        ));
    }

    #[test]
    fn test_dangling_reference_is_fatal() {
        let broken = BOX_STEP.replace("#34 = EDGE_CURVE('',#14,#11,#22,.T.);", "");
        assert!(matches!(
            read_step_from_buffer(broken.as_bytes()),
            Err(StepError::MissingEntity(34))
        ));
    }

    #[test]
    fn test_names_fallback_and_dedup() {
        let extra = "#162 = MANIFOLD_SOLID_BREP('',#160);\n\
                     #163 = MANIFOLD_SOLID_BREP('plate',#160);\n\
                     #164 = BREP_WITH_VOIDS('plate',#160,());\n\
                     ENDSEC;";
        let input = BOX_STEP.replacen("ENDSEC;\nEND-ISO", &format!("{extra}\nEND-ISO"), 1);
        let solids = read_step_from_buffer(input.as_bytes()).unwrap();
        let names: Vec<&str> = solids.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["plate", "solid_162", "plate_2", "plate_3"]);
        // Solids never share arenas.
        assert!(solids.iter().all(|s| s.vertices.len() == 8));
    }

    #[test]
    fn test_name_registry_avoids_collisions() {
        let mut names = NameRegistry::default();
        assert_eq!(names.claim("a_2", 1), "a_2");
        assert_eq!(names.claim("a", 2), "a");
        assert_eq!(names.claim("a", 3), "a_3");
        assert_eq!(names.claim("  ", 4), "solid_4");
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_step("/nonexistent/flatcut/box.step"),
            Err(StepError::Io(_))
        ));
    }
}
