use crate::math::Transform;

/// Errors raised while building a [`Skeleton`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum SkeletonError {
    /// The number of bind poses does not match the number of bones.
    #[error("the skeleton has {bones} bones but {poses} bind poses")]
    BindPoseCountMismatch {
        /// Number of bones.
        bones: usize,
        /// Number of bind poses.
        poses: usize,
    },
    /// A bone references a parent that does not exist, or the hierarchy has a cycle.
    #[error("bone {0} has an invalid parent")]
    InvalidParent(usize),
    /// A bind pose cannot be inverted.
    #[error("the bind pose of bone {0} is not invertible")]
    SingularBindPose(usize),
}

/// A bone of a [`Skeleton`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Bone {
    /// The bone name, unique within its skeleton.
    pub name: String,
    /// The index of the parent bone, `None` for a root.
    pub parent: Option<usize>,
}

impl Bone {
    /// Builds a bone.
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Bone {
            name: name.into(),
            parent,
        }
    }
}

/// A bone hierarchy together with its bind pose.
///
/// The bind pose of a bone is its component-space transform when the mesh was bound to the
/// skeleton. Skinning a vertex with bone `b` applies `pose[b] * inverse_bind_pose[b]` to it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Skeleton {
    bones: Vec<Bone>,
    bind_pose: Vec<Transform>,
    inverse_bind_pose: Vec<Transform>,
}

impl Skeleton {
    /// Builds a skeleton and precomputes the inverse of every bind pose.
    pub fn new(bones: Vec<Bone>, bind_pose: Vec<Transform>) -> Result<Self, SkeletonError> {
        if bones.len() != bind_pose.len() {
            return Err(SkeletonError::BindPoseCountMismatch {
                bones: bones.len(),
                poses: bind_pose.len(),
            });
        }

        for (i, bone) in bones.iter().enumerate() {
            // Walking up more than `bones.len()` parents means there is a cycle.
            let mut curr = bone.parent;
            let mut depth = 0;
            while let Some(parent) = curr {
                if parent >= bones.len() || depth > bones.len() {
                    return Err(SkeletonError::InvalidParent(i));
                }
                curr = bones[parent].parent;
                depth += 1;
            }
        }

        let inverse_bind_pose = bind_pose
            .iter()
            .enumerate()
            .map(|(i, m)| m.try_inverse().ok_or(SkeletonError::SingularBindPose(i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Skeleton {
            bones,
            bind_pose,
            inverse_bind_pose,
        })
    }

    /// The number of bones.
    #[inline]
    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    /// All the bones, indexed by bone index.
    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// The bone at `index`.
    #[inline]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// The index of the bone named `name`.
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// The parent of the bone at `index`.
    #[inline]
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.bones.get(index)?.parent
    }

    /// Is `bone` equal to `ancestor`, or one of its descendants?
    pub fn is_self_or_descendant(&self, bone: usize, ancestor: usize) -> bool {
        let mut curr = Some(bone);
        // The hierarchy is acyclic, so this terminates after at most `num_bones` steps.
        while let Some(b) = curr {
            if b == ancestor {
                return true;
            }
            curr = self.parent(b);
        }
        false
    }

    /// The component-space bind pose of a bone.
    #[inline]
    pub fn bind_pose(&self, index: usize) -> Option<&Transform> {
        self.bind_pose.get(index)
    }

    /// The inverse of the component-space bind pose of a bone.
    #[inline]
    pub fn inverse_bind_pose(&self, index: usize) -> Option<&Transform> {
        self.inverse_bind_pose.get(index)
    }

    /// The matrix moving a bind-pose vertex to the current pose of `bone`.
    ///
    /// `pose` holds the current component-space transform of every bone. Returns `None` if
    /// `bone` is out of range of either the skeleton or `pose`.
    pub fn skinning_matrix(&self, pose: &[Transform], bone: usize) -> Option<Transform> {
        Some(pose.get(bone)? * self.inverse_bind_pose.get(bone)?)
    }

    /// The bind pose itself, usable as a rest `pose` argument.
    #[inline]
    pub fn rest_pose(&self) -> &[Transform] {
        &self.bind_pose
    }
}

#[cfg(test)]
mod test {
    use super::{Bone, Skeleton, SkeletonError};
    use crate::math::{Point, Transform, Vector};

    fn chain() -> Skeleton {
        let bones = vec![
            Bone::new("root", None),
            Bone::new("spine", Some(0)),
            Bone::new("neck", Some(1)),
            Bone::new("head", Some(2)),
            Bone::new("arm", Some(1)),
        ];
        let poses = (0..5)
            .map(|i| Transform::new_translation(&Vector::new(0.0, i as f32, 0.0)))
            .collect();
        Skeleton::new(bones, poses).unwrap()
    }

    #[test]
    fn hierarchy_queries() {
        let skel = chain();
        assert_eq!(skel.find_bone("neck"), Some(2));
        assert_eq!(skel.find_bone("tail"), None);
        assert_eq!(skel.parent(2), Some(1));
        assert_eq!(skel.parent(0), None);
        assert!(skel.is_self_or_descendant(3, 2));
        assert!(skel.is_self_or_descendant(2, 2));
        assert!(!skel.is_self_or_descendant(4, 2));
        assert!(!skel.is_self_or_descendant(1, 2));
    }

    #[test]
    fn skinning_matrix_is_identity_in_bind_pose() {
        let skel = chain();
        let m = skel.skinning_matrix(skel.rest_pose(), 3).unwrap();
        let p = Point::new(1.0, 2.0, 3.0);
        assert_relative_eq!(m.transform_point(&p), p, epsilon = 1.0e-6);
        assert!(skel.skinning_matrix(&[], 3).is_none());
    }

    #[test]
    fn invalid_skeletons() {
        let cyclic = vec![Bone::new("a", Some(1)), Bone::new("b", Some(0))];
        let poses = vec![Transform::identity(); 2];
        assert_eq!(
            Skeleton::new(cyclic, poses.clone()),
            Err(SkeletonError::InvalidParent(0))
        );
        assert_eq!(
            Skeleton::new(vec![Bone::new("a", None)], poses),
            Err(SkeletonError::BindPoseCountMismatch { bones: 1, poses: 2 })
        );
        assert_eq!(
            Skeleton::new(vec![Bone::new("a", None)], vec![Transform::zeros()]),
            Err(SkeletonError::SingularBindPose(0))
        );
    }
}
