use super::fixtures::{assert_indices_valid, cube_mesh, cube_section, mesh_area, triangle_area};
use skinslice::math::{Point, Real, Vector};
use skinslice::mesh::{MeshProvenance, MeshSection, ProceduralMesh, ProvenanceMap, VertexId};
use skinslice::query::clip::clip_halfspace_polygon;
use skinslice::query::split::{slice_procedural_mesh, CapOption, SliceOptions};
use skinslice::shape::Plane;

fn polygon_area(polygon: &[Point]) -> Real {
    (2..polygon.len())
        .map(|k| triangle_area(&polygon[0], &polygon[k - 1], &polygon[k]))
        .sum()
}

/// Area of the part of `section` on the positive side of `plane`.
fn positive_area(section: &MeshSection, plane: &Plane) -> Real {
    let mut clipped = Vec::new();
    let v = section.vertices();
    section
        .indices()
        .iter()
        .map(|t| {
            let tri = t.map(|i| v[i as usize].position);
            clip_halfspace_polygon(&plane.flipped(), &tri, 0.0, &mut clipped);
            polygon_area(&clipped)
        })
        .sum()
}

#[test]
fn random_planes_partition_the_surface() {
    let mut rng = oorandom::Rand32::new(42);
    let options = SliceOptions {
        cap: CapOption::NoCap,
        ..SliceOptions::default()
    };
    let source = cube_section();
    let total = mesh_area(&cube_mesh());
    let mut num_cuts = 0;

    for _ in 0..200 {
        let position = Point::new(
            0.1 + 0.8 * rng.rand_float(),
            0.1 + 0.8 * rng.rand_float(),
            0.1 + 0.8 * rng.rand_float(),
        );
        let normal = Vector::new(
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
        );
        let Some(plane) = Plane::from_point_normal(&position, &normal) else {
            continue;
        };

        let mut mesh = cube_mesh();
        let Ok(outcome) = slice_procedural_mesh(&mut mesh, &position, &normal, &options) else {
            continue;
        };
        num_cuts += 1;
        let other = outcome.other_half.unwrap();

        assert_indices_valid(&mesh);
        assert_indices_valid(&other.mesh);

        let straddling = source
            .indices()
            .iter()
            .filter(|t| {
                let d = t.map(|i| plane.signed_distance(&source.vertices()[i as usize].position));
                d.iter().any(|d| *d > 0.0) && d.iter().any(|d| *d <= 0.0)
            })
            .count();
        assert_eq!(outcome.clip_edges.len(), straddling);

        let kept_area = mesh_area(&mesh);
        let other_area = mesh_area(&other.mesh);
        assert_relative_eq!(kept_area + other_area, total, epsilon = 1.0e-3);
        assert_relative_eq!(kept_area, positive_area(&source, &plane), epsilon = 1.0e-3);
    }

    assert!(num_cuts > 100);
}

#[test]
fn untouched_sections_keep_identity_provenance() {
    let mut mesh = ProceduralMesh::new();
    let _ = mesh.push_section(cube_section(), None);
    let mut far = cube_section();
    for v in far.vertices_mut() {
        v.position.y += 5.0;
    }
    far.recompute_aabb();
    let _ = mesh.push_section(far, None);

    let pre_slice = MeshProvenance::from_sections(vec![
        ProvenanceMap::from_sources((0..8).map(Some).collect()),
        ProvenanceMap::from_sources((8..16).map(Some).collect()),
    ]);

    let outcome = slice_procedural_mesh(
        &mut mesh,
        &Point::new(0.0, 0.5, 0.0),
        &Vector::y(),
        &SliceOptions::default(),
    )
    .unwrap();

    let original = outcome.kept_provenance.compose(&pre_slice);
    for i in 0..8 {
        assert_eq!(outcome.kept_provenance.get(VertexId::new(1, i)), Some(VertexId::new(1, i)));
        assert_eq!(original.get(VertexId::new(1, i)), Some(8 + i));
    }
    assert_eq!(mesh.sections()[1].vertices().len(), 8);
    assert_eq!(mesh.sections()[1].indices().len(), 12);
}
