use super::fixtures::{assert_indices_valid, limb, LOWER, UPPER};
use skinslice::math::{Point, Transform, Vector};
use skinslice::mesh::{ProceduralMesh, VertexId};
use skinslice::pipeline::{CutError, CutRequest, SkeletalMeshCutter};
use skinslice::query::split::SliceError;
use skinslice::skinning::{bone_weight, extract_filtered_mesh, ExtractError, FilterOptions};

fn assert_moved(posed: &ProceduralMesh, rest: &ProceduralMesh, offset: Vector) {
    for (posed, rest) in posed.sections().iter().zip(rest.sections()) {
        for (p, r) in posed.vertices().iter().zip(rest.vertices()) {
            assert_relative_eq!(p.position, r.position + offset, epsilon = 1.0e-5);
            assert_eq!(p.uv, r.uv);
        }
    }
}

fn cutter() -> SkeletalMeshCutter {
    let (mesh, skeleton) = limb();
    SkeletalMeshCutter::new(mesh, skeleton)
}

fn request() -> CutRequest {
    CutRequest::new(Point::new(0.0, 1.5, 0.0), Vector::y(), "upper")
}

#[test]
fn cut_limb_fragments() {
    let cutter = cutter();
    let result = cutter.cut(&request()).unwrap();

    assert_eq!(result.cut_bone, UPPER);
    assert_eq!(result.parent_bone, Some(LOWER));
    assert_eq!(result.num_clip_edges, 8);

    let kept = &result.kept;
    assert_eq!(kept.mesh.num_sections(), 2);
    assert_eq!(kept.mesh.sections()[0].vertices().len(), 20);
    assert_eq!(kept.mesh.sections()[0].indices().len(), 12 + 2);
    assert_eq!(kept.mesh.sections()[1].vertices().len(), 4);
    assert_indices_valid(&kept.mesh);

    // The top ring keeps its source vertices, seam and cap vertices have none.
    for i in 0..4 {
        assert_eq!(kept.original_vertices.get(VertexId::new(0, i)), Some(8 + i));
        let weights = kept.weights.get(VertexId::new(0, i)).unwrap();
        assert_eq!(&weights.bones[..], &[UPPER as u32]);
    }
    assert_eq!(kept.original_vertices.get(VertexId::new(0, 4)), None);
    assert!(kept.weights.get(VertexId::new(1, 0)).unwrap().is_empty());

    let other = result.other_half.as_ref().unwrap();
    assert_eq!(other.mesh.sections()[0].vertices().len(), 20);
    assert_eq!(other.mesh.sections()[0].indices().len(), 12);
    assert_eq!(other.skinner.anchor_bone(), LOWER);
    for i in 0..4 {
        assert_eq!(other.original_vertices.get(VertexId::new(0, i)), Some(4 + i));
        // Half of the weight goes to the upper bone, on the other side of the cut.
        let retained = other.skinner.vertex_weights(VertexId::new(0, i)).unwrap();
        assert_eq!(&retained.weights.bones[..], &[LOWER as u32]);
        assert_relative_eq!(retained.weights.total_weight(), 1.0, epsilon = 1.0e-4);
        assert_relative_eq!(retained.correction, 0.5, epsilon = 1.0e-4);
    }
}

#[test]
fn fragments_follow_their_bones() {
    let cutter = cutter();
    let skeleton = cutter.skeleton();
    let mut result = cutter.cut(&request()).unwrap();
    let mut other = result.other_half.take().unwrap();
    let kept_rest = result.kept.mesh.clone();
    let other_rest = other.mesh.clone();

    let mut pose = skeleton.rest_pose().to_vec();
    pose[UPPER] = Transform::new_translation(&Vector::new(3.0, 1.0, 0.0));

    let report = result.kept.update(skeleton, &pose);
    assert_eq!(report.vertices, 24);
    assert_eq!(report.blended, 4);
    assert_eq!(report.rigid, 20);
    assert_eq!(report.degenerate, 0);

    assert_moved(&result.kept.mesh, &kept_rest, Vector::new(3.0, 0.0, 0.0));
    assert_relative_eq!(result.kept.mesh.local_aabb().mins.x, 3.0, epsilon = 1.0e-5);

    // The other half only follows the lower bone.
    let report = other.update(skeleton, &pose);
    assert_eq!(report.blended, 4);
    assert_eq!(report.degenerate, 0);
    assert_moved(&other.mesh, &other_rest, Vector::zeros());

    pose[LOWER] = Transform::new_translation(&Vector::new(0.0, 0.0, 2.0));
    let _ = other.update(skeleton, &pose);
    assert_moved(&other.mesh, &other_rest, Vector::new(0.0, 0.0, 2.0));
}

#[test]
fn filtered_vertices_pass_the_threshold() {
    let (mesh, skeleton) = limb();
    let lod = mesh.lod(0).unwrap();

    for threshold in [0.01, 0.6] {
        let options = FilterOptions {
            target_bone: Some("upper".to_string()),
            weight_threshold: threshold,
            ..FilterOptions::default()
        };
        let filtered = extract_filtered_mesh(&mesh, &skeleton, 0, &options).unwrap();
        let kept: Vec<u32> = filtered.provenance.iter().filter_map(|(_, v)| v).collect();

        for v in 0..12 {
            let weight = bone_weight(lod, &lod.sections[0], v, UPPER as u32);
            assert_eq!(kept.contains(&v), weight.is_some_and(|w| w > threshold), "vertex {}", v);
        }

        let n = filtered.vertices.len() as u32;
        assert!(filtered.sections.iter().flat_map(|s| s.indices.iter().flatten()).all(|i| *i < n));
    }
}

#[test]
fn cut_failures() {
    let cutter = cutter();

    let mut req = request();
    req.target_bone = "tail".to_string();
    assert_eq!(cutter.cut(&req), Err(CutError::UnknownBone("tail".to_string())));

    let req = CutRequest::new(Point::new(0.0, 0.5, 0.0), Vector::y(), "root");
    assert_eq!(cutter.cut(&req), Err(CutError::RootBone("root".to_string())));

    // No vertex is weighted to the root bone.
    let mut req = req;
    req.slice.create_other_half = false;
    assert!(matches!(
        cutter.cut(&req),
        Err(CutError::Extract(ExtractError::NoVerticesPassedFilter { .. }))
    ));

    let mut req = request();
    req.plane_position = Point::new(0.0, 10.0, 0.0);
    assert_eq!(cutter.cut(&req), Err(CutError::Slice(SliceError::NoIntersection)));

    let mut req = request();
    req.lod_index = 1;
    assert_eq!(cutter.cut(&req), Err(CutError::Extract(ExtractError::InvalidLod(1))));
}

#[test]
fn cut_placed_mesh() {
    let mut cutter = cutter();
    cutter.transform = skinslice::math::Isometry::translation(0.0, 10.0, 0.0);

    // The plane is given in world-space.
    let req = CutRequest::new(Point::new(0.0, 11.5, 0.0), Vector::y(), "upper");
    let result = cutter.cut(&req).unwrap();
    assert_eq!(result.num_clip_edges, 8);
    assert_eq!(result.kept.mesh.transform, cutter.transform);
    assert_eq!(result.other_half.unwrap().mesh.transform, cutter.transform);
}
