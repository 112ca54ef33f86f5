//! Editable sectioned meshes and vertex provenance.

pub use self::procedural_mesh::{MaterialId, ProceduralMesh};
pub use self::provenance::{MeshProvenance, ProvenanceMap, VertexId};
pub use self::section::MeshSection;
pub use self::vertex::{Color, MeshVertex, Tangent};

mod procedural_mesh;
mod provenance;
mod section;
mod vertex;
