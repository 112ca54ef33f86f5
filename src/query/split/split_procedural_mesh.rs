use super::cap::{build_cap, Cap};
use super::{split_convex_hull, SplitResult};
use crate::math::{Point, Real, Vector};
use crate::mesh::{
    MaterialId, MeshProvenance, MeshSection, MeshVertex, ProceduralMesh, ProvenanceMap, VertexId,
};
use crate::shape::{Plane, PlaneSide};
use arrayvec::ArrayVec;

/// Where the cap sealing a cut is stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum CapOption {
    /// Leave the cut open.
    NoCap,
    /// Store the cap in a new section, using [`SliceOptions::cap_material`].
    #[default]
    CreateNewSectionForCap,
    /// Append the cap to the last section of each fragment.
    UseLastSectionForCap,
}

/// Configuration of [`slice_procedural_mesh`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SliceOptions {
    /// Build the fragment lying on the negative side of the plane.
    pub create_other_half: bool,
    /// How the cut is sealed.
    pub cap: CapOption,
    /// Material of the cap sections created with [`CapOption::CreateNewSectionForCap`].
    pub cap_material: Option<MaterialId>,
    /// Clip edge endpoints closer than this are merged when building the cap.
    pub weld_tolerance: Real,
    /// Cap texture coordinates repeat every `cap_uv_scale` units.
    pub cap_uv_scale: Real,
}

impl Default for SliceOptions {
    fn default() -> Self {
        SliceOptions {
            create_other_half: true,
            cap: CapOption::CreateNewSectionForCap,
            cap_material: None,
            weld_tolerance: 1.0e-4,
            cap_uv_scale: 64.0,
        }
    }
}

/// Errors raised by [`slice_procedural_mesh`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SliceError {
    /// No triangle crosses the plane. The mesh is left unchanged.
    #[error("the plane does not cross any triangle of the mesh")]
    NoIntersection,
    /// The plane normal is zero.
    #[error("the plane normal cannot be normalized")]
    InvalidPlaneNormal,
}

/// The fragment lying on the negative side of a cut.
#[derive(Clone, Debug, PartialEq)]
pub struct OtherHalf {
    /// The fragment mesh, placed like the mesh it was cut from.
    pub mesh: ProceduralMesh,
    /// Maps every vertex of `mesh` to the vertex of the mesh before the cut it was copied from.
    pub provenance: MeshProvenance<VertexId>,
}

/// The outcome of a successful [`slice_procedural_mesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct SliceOutcome {
    /// Maps every vertex of the kept mesh (after the cut) to the vertex it was copied from.
    pub kept_provenance: MeshProvenance<VertexId>,
    /// The other half, if requested.
    pub other_half: Option<OtherHalf>,
    /// One segment per clipped triangle, in the local space of the mesh.
    pub clip_edges: Vec<[Point; 2]>,
    /// Number of cap polygons triangulated.
    pub cap_polygons: usize,
    /// Number of cap polygons left open because they could not be triangulated.
    pub dropped_cap_polygons: usize,
}

/// Cuts a mesh with a plane given in world-space.
///
/// The plane is expressed in the local space of the mesh using its transform, then the mesh is
/// cut with [`slice_procedural_mesh_local`].
pub fn slice_procedural_mesh(
    mesh: &mut ProceduralMesh,
    plane_position: &Point,
    plane_normal: &Vector,
    options: &SliceOptions,
) -> Result<SliceOutcome, SliceError> {
    let world_plane =
        Plane::from_point_normal(plane_position, plane_normal).ok_or(SliceError::InvalidPlaneNormal)?;
    let plane = world_plane.inverse_transform_by(&mesh.transform);
    slice_procedural_mesh_local(mesh, &plane, options)
}

/// The two parts of a straddling section.
struct SectionSplit {
    kept: MeshSection,
    kept_provenance: ProvenanceMap<VertexId>,
    other: MeshSection,
    other_provenance: ProvenanceMap<VertexId>,
}

fn identity_provenance(section: u32, num_vertices: usize) -> ProvenanceMap<VertexId> {
    ProvenanceMap::from_sources(
        (0..num_vertices as u32)
            .map(|v| Some(VertexId::new(section, v)))
            .collect(),
    )
}

/// Triangulates a convex polygon as a fan around its first vertex.
fn push_fan(section: &mut MeshSection, polygon: &[u32]) {
    for k in 2..polygon.len() {
        section.push_triangle([polygon[0], polygon[k - 1], polygon[k]]);
    }
}

/// Splits the triangles of a section crossed by the plane.
fn split_section(
    section_id: u32,
    section: &MeshSection,
    plane: &Plane,
    create_other_half: bool,
    clip_edges: &mut Vec<[Point; 2]>,
) -> SectionSplit {
    let vertices = section.vertices();
    let dists: Vec<Real> = vertices
        .iter()
        .map(|v| plane.signed_distance(&v.position))
        .collect();

    let mut split = SectionSplit {
        kept: MeshSection::default(),
        kept_provenance: ProvenanceMap::new(),
        other: MeshSection::default(),
        other_provenance: ProvenanceMap::new(),
    };

    // Index of each vertex in the buffer of its own side.
    let mut side_index = vec![u32::MAX; vertices.len()];
    for (i, vertex) in vertices.iter().enumerate() {
        let source = Some(VertexId::new(section_id, i as u32));
        if dists[i] > 0.0 {
            side_index[i] = split.kept.push_vertex(*vertex);
            split.kept_provenance.push(source);
        } else if create_other_half {
            side_index[i] = split.other.push_vertex(*vertex);
            split.other_provenance.push(source);
        }
    }

    for tri in section.indices() {
        if tri.iter().any(|i| *i as usize >= vertices.len()) {
            log::error!("Skipping a triangle referencing a vertex out of its section.");
            continue;
        }

        let is_kept = tri.map(|i| dists[i as usize] > 0.0);
        match is_kept {
            [true, true, true] => split.kept.push_triangle(tri.map(|i| side_index[i as usize])),
            [false, false, false] => {
                if create_other_half {
                    split.other.push_triangle(tri.map(|i| side_index[i as usize]));
                }
            }
            _ => {
                let mut kept_poly = ArrayVec::<u32, 4>::new();
                let mut other_poly = ArrayVec::<u32, 4>::new();
                let mut clipped = ArrayVec::<Point, 3>::new();

                for k in 0..3 {
                    let (i0, i1) = (tri[k] as usize, tri[(k + 1) % 3] as usize);

                    if is_kept[k] {
                        kept_poly.push(side_index[i0]);
                    } else if create_other_half {
                        other_poly.push(side_index[i0]);
                    }

                    if is_kept[k] != is_kept[(k + 1) % 3] {
                        let t = (-dists[i0] / (dists[i1] - dists[i0])).clamp(0.0, 1.0);
                        let vertex = vertices[i0].interpolate(&vertices[i1], t);

                        kept_poly.push(split.kept.push_vertex(vertex));
                        split.kept_provenance.push(None);
                        if create_other_half {
                            other_poly.push(split.other.push_vertex(vertex));
                            split.other_provenance.push(None);
                        }
                        clipped.push(vertex.position);
                    }
                }

                debug_assert_eq!(clipped.len(), 2, "a triangle must have 0 or 2 clipped edges");
                if let &[a, b] = clipped.as_slice() {
                    clip_edges.push([a, b]);
                }

                push_fan(&mut split.kept, &kept_poly);
                push_fan(&mut split.other, &other_poly);
            }
        }
    }

    split
}

/// Cuts a mesh with a plane expressed in its local space.
///
/// Geometry on the positive side of the plane is kept in `mesh`; geometry on the negative
/// side goes to the other half, built if `options.create_other_half` is set. Sections keep
/// their index in `mesh` (emptied if nothing remains on the kept side), while the sections of
/// the other half are compacted. Convex collision hulls are cut the same way with
/// [`split_convex_hull`].
///
/// Fails with [`SliceError::NoIntersection`] if no triangle crosses the plane, in which case
/// `mesh` is left unchanged.
pub fn slice_procedural_mesh_local(
    mesh: &mut ProceduralMesh,
    plane: &Plane,
    options: &SliceOptions,
) -> Result<SliceOutcome, SliceError> {
    let create_other_half = options.create_other_half;
    let mut replacements: Vec<(usize, MeshSection)> = Vec::new();
    let mut kept_provenance = MeshProvenance::new();
    let mut other_sections: Vec<(MeshSection, Option<MaterialId>, ProvenanceMap<VertexId>)> =
        Vec::new();
    let mut clip_edges = Vec::new();

    // Nothing is written to `mesh` until we know the plane crosses it.
    for (section_id, section) in mesh.sections().iter().enumerate() {
        let id = section_id as u32;

        if section.is_empty() {
            kept_provenance.push_section(identity_provenance(id, section.vertices().len()));
            continue;
        }

        match plane.aabb_side(section.local_aabb()) {
            PlaneSide::Positive => {
                kept_provenance.push_section(identity_provenance(id, section.vertices().len()));
            }
            PlaneSide::Negative => {
                if create_other_half {
                    other_sections.push((
                        section.clone(),
                        mesh.material(section_id),
                        identity_provenance(id, section.vertices().len()),
                    ));
                }
                replacements.push((section_id, MeshSection::default()));
                kept_provenance.push_section(ProvenanceMap::new());
            }
            PlaneSide::Straddling => {
                let split = split_section(id, section, plane, create_other_half, &mut clip_edges);

                if create_other_half && !split.other.indices().is_empty() {
                    other_sections.push((split.other, mesh.material(section_id), split.other_provenance));
                }

                if split.kept.indices().is_empty() {
                    replacements.push((section_id, MeshSection::default()));
                    kept_provenance.push_section(ProvenanceMap::new());
                } else {
                    replacements.push((section_id, split.kept));
                    kept_provenance.push_section(split.kept_provenance);
                }
            }
        }
    }

    if clip_edges.is_empty() {
        log::debug!("The cutting plane does not cross any of the {} sections.", mesh.num_sections());
        return Err(SliceError::NoIntersection);
    }

    for (section_id, section) in replacements {
        mesh.set_section(section_id, section);
    }

    let cap = if options.cap != CapOption::NoCap {
        build_cap(plane, &clip_edges, options.weld_tolerance, options.cap_uv_scale)
    } else {
        Cap::default()
    };

    if !cap.triangles.is_empty() {
        add_cap(mesh, &mut kept_provenance, &cap.vertices, &cap.triangles, options);
    }

    let mut kept_hulls = Vec::new();
    let mut other_hulls = Vec::new();
    for hull in mesh.collision() {
        match split_convex_hull(hull, plane) {
            SplitResult::Positive => kept_hulls.push(hull.clone()),
            SplitResult::Negative => other_hulls.push(hull.clone()),
            SplitResult::Pair(negative, positive) => {
                kept_hulls.extend(positive);
                other_hulls.extend(negative);
            }
        }
    }
    mesh.set_collision(kept_hulls);

    let other_half = if create_other_half {
        let mut other = ProceduralMesh::new();
        other.transform = mesh.transform;
        other.collision_settings = mesh.collision_settings.clone();
        other.set_collision(other_hulls);

        let mut provenance = MeshProvenance::new();
        for (section, material, map) in other_sections {
            let _ = other.push_section(section, material);
            provenance.push_section(map);
        }

        if !cap.triangles.is_empty() {
            let (vertices, triangles) = cap.flipped();
            add_cap(&mut other, &mut provenance, &vertices, &triangles, options);
        }

        Some(OtherHalf {
            mesh: other,
            provenance,
        })
    } else {
        None
    };

    log::debug!(
        "Sliced a mesh: {} clip edges, {} cap polygons ({} dropped), other half: {}.",
        clip_edges.len(),
        cap.polygons,
        cap.dropped,
        other_half.is_some()
    );

    Ok(SliceOutcome {
        kept_provenance,
        other_half,
        clip_edges,
        cap_polygons: cap.polygons,
        dropped_cap_polygons: cap.dropped,
    })
}

/// Stores cap geometry in `mesh` according to `options.cap`.
fn add_cap(
    mesh: &mut ProceduralMesh,
    provenance: &mut MeshProvenance<VertexId>,
    vertices: &[MeshVertex],
    triangles: &[[u32; 3]],
    options: &SliceOptions,
) {
    let last = mesh.num_sections().checked_sub(1);

    match (options.cap, last) {
        (CapOption::UseLastSectionForCap, Some(last)) => {
            if let Some(section) = mesh.section_mut(last) {
                section.append(vertices, triangles);
            }
            if let Some(map) = provenance.section_mut(last as u32) {
                for _ in vertices {
                    map.push(None);
                }
            }
        }
        _ => {
            let section = MeshSection::new(vertices.to_vec(), triangles.to_vec());
            let index = mesh.push_section(section, options.cap_material);
            provenance.set_section(index as u32, ProvenanceMap::from_sources(vec![None; vertices.len()]));
        }
    }
}
