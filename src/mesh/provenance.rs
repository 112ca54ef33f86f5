//! Vertex provenance: where each vertex of a derived mesh came from.

use core::ops::Index;

/// Identifies a vertex of a sectioned mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VertexId {
    /// Index of the section containing the vertex.
    pub section: u32,
    /// Index of the vertex inside of its section's vertex buffer.
    pub vertex: u32,
}

impl VertexId {
    /// Builds a vertex identifier.
    #[inline]
    pub const fn new(section: u32, vertex: u32) -> Self {
        VertexId { section, vertex }
    }
}

/// Maps the vertices of a derived vertex buffer to the vertices they were copied from.
///
/// Entry `i` describes vertex `i` of the derived buffer. Vertices synthesized by an
/// operation (interpolated seam vertices, cap vertices) have no source and map to `None`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProvenanceMap<T> {
    sources: Vec<Option<T>>,
}

impl<T: Copy> ProvenanceMap<T> {
    /// An empty map.
    pub fn new() -> Self {
        ProvenanceMap {
            sources: Vec::new(),
        }
    }

    /// An empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        ProvenanceMap {
            sources: Vec::with_capacity(capacity),
        }
    }

    /// Builds a map from its entries.
    pub fn from_sources(sources: Vec<Option<T>>) -> Self {
        ProvenanceMap { sources }
    }

    /// Appends the source of the next derived vertex.
    #[inline]
    pub fn push(&mut self, source: Option<T>) {
        self.sources.push(source);
    }

    /// The source of the derived vertex `derived`, if it has one.
    #[inline]
    pub fn get(&self, derived: u32) -> Option<T> {
        self.sources.get(derived as usize).copied().flatten()
    }

    /// The number of derived vertices this map describes.
    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Does this map describe no vertex at all?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Iterates through `(derived, source)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u32, Option<T>)> + '_ {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, src)| (i as u32, *src))
    }

    /// Maps the source of every entry, chaining this map with another lookup.
    pub fn then<U: Copy>(&self, mut lookup: impl FnMut(T) -> Option<U>) -> ProvenanceMap<U> {
        ProvenanceMap {
            sources: self.sources.iter().map(|src| src.and_then(&mut lookup)).collect(),
        }
    }
}

/// One [`ProvenanceMap`] per section of a sectioned mesh.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MeshProvenance<T> {
    sections: Vec<ProvenanceMap<T>>,
}

impl<T: Copy> MeshProvenance<T> {
    /// An empty provenance, without any section.
    pub fn new() -> Self {
        MeshProvenance {
            sections: Vec::new(),
        }
    }

    /// Builds a provenance from its per-section maps.
    pub fn from_sections(sections: Vec<ProvenanceMap<T>>) -> Self {
        MeshProvenance { sections }
    }

    /// The number of sections described.
    #[inline]
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// The map of the given section, if it exists.
    #[inline]
    pub fn section(&self, section: u32) -> Option<&ProvenanceMap<T>> {
        self.sections.get(section as usize)
    }

    /// All the per-section maps.
    #[inline]
    pub fn sections(&self) -> &[ProvenanceMap<T>] {
        &self.sections
    }

    /// The source of the given derived vertex, if it has one.
    pub fn get(&self, vertex: VertexId) -> Option<T> {
        self.section(vertex.section)?.get(vertex.vertex)
    }

    /// Appends the map of the next section.
    pub fn push_section(&mut self, map: ProvenanceMap<T>) {
        self.sections.push(map);
    }

    /// Replaces the map of an existing section, or appends empty sections up to it.
    pub fn set_section(&mut self, section: u32, map: ProvenanceMap<T>) {
        let section = section as usize;
        if section >= self.sections.len() {
            self.sections.resize_with(section + 1, ProvenanceMap::new);
        }
        self.sections[section] = map;
    }

    /// Mutable access to the map of a section.
    pub fn section_mut(&mut self, section: u32) -> Option<&mut ProvenanceMap<T>> {
        self.sections.get_mut(section as usize)
    }

    /// Composes this provenance (derived → intermediate) with `next` (intermediate → source).
    ///
    /// Derived vertices whose intermediate vertex has no source in `next` map to `None`.
    pub fn compose<U: Copy>(&self, next: &MeshProvenance<U>) -> MeshProvenance<U>
    where
        T: Into<VertexId>,
    {
        MeshProvenance {
            sections: self
                .sections
                .iter()
                .map(|map| map.then(|mid| next.get(mid.into())))
                .collect(),
        }
    }
}

impl<T> Index<u32> for MeshProvenance<T> {
    type Output = ProvenanceMap<T>;

    #[inline]
    fn index(&self, section: u32) -> &ProvenanceMap<T> {
        &self.sections[section as usize]
    }
}
