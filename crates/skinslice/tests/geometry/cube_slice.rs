use super::fixtures::{assert_indices_valid, cube_mesh, cube_section, mesh_area, section_area};
use skinslice::math::{Point, Vector};
use skinslice::mesh::{MaterialId, MeshSection, ProceduralMesh, VertexId};
use skinslice::query::split::{slice_procedural_mesh, CapOption, SliceError, SliceOptions};

fn mid_plane() -> (Point, Vector) {
    (Point::new(0.0, 0.5, 0.0), Vector::y())
}

#[test]
fn cube_mid_cut_yields_two_capped_halves() {
    let mut mesh = cube_mesh();
    let (position, normal) = mid_plane();
    let options = SliceOptions {
        cap_material: Some(MaterialId(7)),
        ..SliceOptions::default()
    };
    let outcome = slice_procedural_mesh(&mut mesh, &position, &normal, &options).unwrap();

    // Two clip edges per side face, chained into a single quad.
    assert_eq!(outcome.clip_edges.len(), 8);
    assert_eq!(outcome.cap_polygons, 1);
    assert_eq!(outcome.dropped_cap_polygons, 0);
    for [a, b] in &outcome.clip_edges {
        assert_relative_eq!(a.y, 0.5, epsilon = 1.0e-6);
        assert_relative_eq!(b.y, 0.5, epsilon = 1.0e-6);
    }

    // The four top corners come first, followed by the seam vertices.
    assert_eq!(mesh.num_sections(), 2);
    let kept = &mesh.sections()[0];
    assert_eq!(kept.vertices().len(), 4 + 16);
    assert!(kept.vertices()[..4].iter().all(|v| v.position.y == 1.0));
    assert!(kept.vertices()[4..].iter().all(|v| relative_eq!(v.position.y, 0.5, epsilon = 1.0e-6)));
    for i in 0..4 {
        assert_eq!(outcome.kept_provenance.get(VertexId::new(0, i)).map(|v| v.section), Some(0));
    }
    assert_eq!(outcome.kept_provenance.get(VertexId::new(0, 4)), None);

    let cap = &mesh.sections()[1];
    assert_eq!(cap.vertices().len(), 4);
    assert_eq!(cap.indices().len(), 2);
    assert_eq!(mesh.material(1), Some(MaterialId(7)));
    assert_relative_eq!(section_area(cap), 1.0, epsilon = 1.0e-5);
    for v in cap.vertices() {
        assert_relative_eq!(v.normal, -Vector::y());
    }

    let other = outcome.other_half.unwrap();
    assert_eq!(other.mesh.num_sections(), 2);
    assert_eq!(other.mesh.sections()[0].vertices().len(), 4 + 16);
    assert!(other.mesh.sections()[0].vertices()[..4].iter().all(|v| v.position.y == 0.0));
    for v in other.mesh.sections()[1].vertices() {
        assert_relative_eq!(v.normal, Vector::y());
    }

    assert_indices_valid(&mesh);
    assert_indices_valid(&other.mesh);
    // Four half side faces, a whole face and the cap on each side.
    assert_relative_eq!(mesh_area(&mesh), 4.0, epsilon = 1.0e-4);
    assert_relative_eq!(mesh_area(&other.mesh), 4.0, epsilon = 1.0e-4);
}

#[test]
fn cut_without_other_half_still_caps_the_kept_part() {
    let mut mesh = cube_mesh();
    let (position, normal) = mid_plane();
    let options = SliceOptions {
        create_other_half: false,
        ..SliceOptions::default()
    };
    let outcome = slice_procedural_mesh(&mut mesh, &position, &normal, &options).unwrap();

    assert!(outcome.other_half.is_none());
    assert_eq!(outcome.clip_edges.len(), 8);
    assert_eq!(mesh.num_sections(), 2);
    assert_eq!(mesh.sections()[1].indices().len(), 2);
}

#[test]
fn open_cut() {
    let mut mesh = cube_mesh();
    let (position, normal) = mid_plane();
    let options = SliceOptions {
        cap: CapOption::NoCap,
        ..SliceOptions::default()
    };
    let outcome = slice_procedural_mesh(&mut mesh, &position, &normal, &options).unwrap();

    assert_eq!(mesh.num_sections(), 1);
    assert_eq!(outcome.other_half.unwrap().mesh.num_sections(), 1);
    assert_relative_eq!(mesh_area(&mesh), 3.0, epsilon = 1.0e-4);
}

#[test]
fn plane_missing_the_cube_leaves_it_untouched() {
    let mut mesh = cube_mesh();
    let before = mesh.clone();
    let result = slice_procedural_mesh(
        &mut mesh,
        &Point::new(0.0, 3.0, 0.0),
        &Vector::y(),
        &SliceOptions::default(),
    );
    assert_eq!(result, Err(SliceError::NoIntersection));
    assert_eq!(mesh, before);
}

#[test]
fn open_boundary_is_left_uncapped() {
    // Without its `z = 1` face, the cube is cut along an open chain of clip edges.
    let cube = cube_section();
    let open_box = MeshSection::new(cube.vertices().to_vec(), cube.indices()[..10].to_vec());
    let mut mesh = ProceduralMesh::new();
    let _ = mesh.push_section(open_box, None);
    let area_before = mesh_area(&mesh);

    let (position, normal) = mid_plane();
    let outcome = slice_procedural_mesh(&mut mesh, &position, &normal, &SliceOptions::default())
        .expect("the plane crosses the open box");

    assert_eq!(outcome.clip_edges.len(), 6);
    assert_eq!(outcome.cap_polygons, 0);
    assert!(outcome.dropped_cap_polygons > 0);

    // The side triangles are still split between both halves.
    let other = outcome.other_half.unwrap();
    assert_eq!(mesh.num_sections(), 1);
    assert_eq!(other.mesh.num_sections(), 1);
    assert_indices_valid(&mesh);
    assert_indices_valid(&other.mesh);
    assert_relative_eq!(mesh_area(&mesh), 2.5, epsilon = 1.0e-4);
    assert_relative_eq!(mesh_area(&other.mesh), 2.5, epsilon = 1.0e-4);
    assert_relative_eq!(mesh_area(&mesh) + mesh_area(&other.mesh), area_before, epsilon = 1.0e-4);
}
