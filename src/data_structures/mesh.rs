use std::ops::Range;

use crate::data_structures::{
    bounds::Aabb,
    material::{Material, MeshMaterial},
};

/// CPU-side triangle mesh with its material slot and shadow flags.
///
/// Geometry is owned, so cloning a mesh never shares vertex data.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Triangle list. Empty for non-indexed meshes, which are then read as
    /// consecutive position triples.
    pub indices: Vec<u32>,
    /// Ranges into `indices`, one per material of a `Multi` slot, in material
    /// order. Empty when one material covers the whole mesh.
    pub groups: Vec<Range<u32>>,
    pub material: MeshMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        indices: Vec<u32>,
        material: MeshMaterial,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            groups: vec![],
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_groups(mut self, groups: Vec<Range<u32>>) -> Self {
        self.groups = groups;
        self
    }

    /**
     * Each drawn index range with the material it is drawn with.
     *
     * Without groups the whole mesh is one range. Groups keep their ranges
     * while the slot is swapped, so an unowned mesh draws every group with
     * its single material.
     */
    pub fn material_groups(&self) -> impl Iterator<Item = (Range<u32>, &Material)> {
        let whole = if self.indices.is_empty() {
            self.positions.len()
        } else {
            self.indices.len()
        };
        let groups = if self.groups.is_empty() {
            vec![0..whole as u32]
        } else {
            self.groups.clone()
        };
        groups
            .into_iter()
            .enumerate()
            .filter_map(move |(i, range)| self.material.for_group(i).map(|m| (range, m)))
    }

    /// Bounds in the mesh's own space.
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|&p| p.into()))
    }

    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Copy of the mesh with independent material allocations.
    pub fn deep_clone(&self) -> Self {
        Self {
            material: self.material.deep_clone(),
            ..self.clone()
        }
    }
}
