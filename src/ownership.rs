//! Ownership flags and the material swap between owned and unowned blocks.
//!
//! Owned blocks show the materials of the source model. Unowned blocks show
//! an independent clone of one cached "unowned" template. Before a mesh is
//! switched to the template its owned material is saved in a side-table
//! ([`MaterialBackups`]) so that switching back restores it exactly.
//!
//! Backups are only ever captured while a mesh shows its owned material, so
//! the template can never end up being restored as if it were the original.

use std::{
    cell::OnceCell,
    collections::{HashMap, hash_map},
    rc::Rc,
};

use log::{debug, trace};

use crate::{
    building::{BlockGroup, BlockId},
    config::UnownedMaterialSettings,
    data_structures::{
        material::{Material, MeshMaterial},
        mesh::Mesh,
        scene_graph::SceneNode,
    },
};

/// Ownership flag per block. Blocks without an entry count as unowned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnershipTable {
    flags: HashMap<BlockId, bool>,
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_owned(&self, block: &BlockId) -> bool {
        self.flags.get(block).copied().unwrap_or(false)
    }

    /// The stored flag, `None` if the block was never set.
    pub fn get(&self, block: &BlockId) -> Option<bool> {
        self.flags.get(block).copied()
    }

    /// Stores the flag and returns the previous one.
    pub fn set(&mut self, block: impl Into<BlockId>, is_owned: bool) -> Option<bool> {
        self.flags.insert(block.into(), is_owned)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, BlockId, bool> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl From<HashMap<BlockId, bool>> for OwnershipTable {
    fn from(flags: HashMap<BlockId, bool>) -> Self {
        Self { flags }
    }
}

impl<K: Into<BlockId>> FromIterator<(K, bool)> for OwnershipTable {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Identifies a mesh inside a building: global floor index plus the position
/// of the mesh in the depth-first traversal of that floor.
///
/// Keys stay valid because floor trees are structurally frozen once
/// assembled: outside the crate a floor only hands out its materials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshKey {
    pub floor: usize,
    pub mesh: usize,
}

/// Which kind of material a mesh currently shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Appearance {
    #[default]
    Owned,
    Unowned,
}

/// A saved material together with the appearance it was taken from.
#[derive(Clone, Debug)]
pub struct SavedMaterial {
    pub material: MeshMaterial,
    pub captured_from: Appearance,
}

#[derive(Debug, Default)]
struct MeshRecord {
    showing: Appearance,
    saved: Option<SavedMaterial>,
}

/// Per-building side-table of mesh appearances and saved owned materials.
#[derive(Debug, Default)]
pub struct MaterialBackups {
    records: HashMap<MeshKey, MeshRecord>,
}

impl MaterialBackups {
    pub fn appearance(&self, key: MeshKey) -> Option<Appearance> {
        self.records.get(&key).map(|r| r.showing)
    }

    pub fn saved(&self, key: MeshKey) -> Option<&SavedMaterial> {
        self.records.get(&key).and_then(|r| r.saved.as_ref())
    }

    /// Number of meshes with a saved material.
    pub fn saved_count(&self) -> usize {
        self.records.values().filter(|r| r.saved.is_some()).count()
    }

    /// Every mesh that shows the unowned material has a backup, and every
    /// backup was taken from an owned material.
    pub fn is_consistent(&self) -> bool {
        self.records.values().all(|r| {
            let backup_ok = r
                .saved
                .as_ref()
                .is_none_or(|s| s.captured_from == Appearance::Owned);
            let unowned_ok = r.showing == Appearance::Owned || r.saved.is_some();
            backup_ok && unowned_ok
        })
    }

    fn record_mut(&mut self, key: MeshKey) -> &mut MeshRecord {
        self.records.entry(key).or_default()
    }
}

/**
 * Applies owned and unowned materials to meshes.
 *
 * The unowned template is built lazily from [`UnownedMaterialSettings`] on
 * first use and kept until [`MaterialEngine::clear_material_cache`] is called.
 * Meshes only ever receive clones of it.
 */
#[derive(Debug)]
pub struct MaterialEngine {
    settings: UnownedMaterialSettings,
    template: OnceCell<Rc<Material>>,
}

impl MaterialEngine {
    pub fn new(settings: UnownedMaterialSettings) -> Self {
        Self {
            settings,
            template: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &UnownedMaterialSettings {
        &self.settings
    }

    /// A fresh clone of the unowned template.
    pub fn unowned_material(&self) -> MeshMaterial {
        let template = self.template.get_or_init(|| {
            debug!("Creating unowned material template");
            Rc::new(self.settings.to_material())
        });
        MeshMaterial::Single(Rc::new(Material::clone(template)))
    }

    pub fn is_template_cached(&self) -> bool {
        self.template.get().is_some()
    }

    /// Drops the cached template; the next use rebuilds it from the settings.
    pub fn clear_material_cache(&mut self) {
        self.template.take();
    }

    /**
     * First styling pass of a freshly cloned floor.
     *
     * Every mesh gets its own copy of its material(s) and casts and receives
     * shadows. For unowned floors that copy is kept as the backup and the mesh
     * shows a clone of the unowned template instead.
     *
     * Returns the number of meshes styled.
     */
    pub fn style_subtree(
        &self,
        floor_index: usize,
        root: &mut dyn SceneNode,
        is_owned: bool,
        backups: &mut MaterialBackups,
    ) -> usize {
        let mut ordinal = 0;
        root.for_each_mesh_mut(&mut |mesh: &mut Mesh| {
            let key = MeshKey {
                floor: floor_index,
                mesh: ordinal,
            };
            ordinal += 1;

            mesh.material = mesh.material.deep_clone();
            let record = backups.record_mut(key);
            if is_owned {
                record.showing = Appearance::Owned;
                trace!("Keeping original material for owned mesh: {}", mesh.name);
            } else {
                let owned = std::mem::replace(&mut mesh.material, self.unowned_material());
                record.saved = Some(SavedMaterial {
                    material: owned,
                    captured_from: Appearance::Owned,
                });
                record.showing = Appearance::Unowned;
                trace!("Applied unowned material to mesh: {}", mesh.name);
            }

            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        });
        ordinal
    }

    /**
     * Switches every mesh of `block` to its owned or unowned material.
     *
     * Switching to owned restores the saved material handles as they are;
     * meshes without a backup keep what they show. Switching to unowned saves
     * the current material first if the mesh shows its owned look and has no
     * backup yet. Meshes already in the requested state are left alone.
     *
     * Returns the number of meshes whose material changed.
     */
    pub fn apply_ownership(
        &self,
        block: &mut BlockGroup,
        is_owned: bool,
        backups: &mut MaterialBackups,
    ) -> usize {
        let mut changed = 0;
        for floor in block.floors_mut() {
            let floor_index = floor.index();
            let mut ordinal = 0;
            floor.node_mut().for_each_mesh_mut(&mut |mesh: &mut Mesh| {
                let key = MeshKey {
                    floor: floor_index,
                    mesh: ordinal,
                };
                ordinal += 1;
                let record = backups.record_mut(key);

                if is_owned {
                    if let Some(saved) = &record.saved {
                        if !mesh.material.ptr_eq(&saved.material) {
                            mesh.material = saved.material.clone();
                            changed += 1;
                            trace!("Restored original material for owned mesh: {}", mesh.name);
                        }
                        record.showing = Appearance::Owned;
                    }
                    return;
                }

                if record.showing == Appearance::Unowned {
                    return;
                }
                if record.saved.is_none() {
                    record.saved = Some(SavedMaterial {
                        material: mesh.material.deep_clone(),
                        captured_from: Appearance::Owned,
                    });
                }
                mesh.material = self.unowned_material();
                record.showing = Appearance::Unowned;
                changed += 1;
                trace!("Applied unowned material to mesh: {}", mesh.name);
            });
        }
        changed
    }
}

impl Default for MaterialEngine {
    fn default() -> Self {
        Self::new(UnownedMaterialSettings::default())
    }
}
