use std::path::PathBuf;

use log::{info, warn};

use crate::{
    building::{self, BlockId, Building, BuildingError},
    config::{self, BuildingConfig, UnownedMaterialSettings},
    data_structures::{bounds::Aabb, model::SourceModel, scene_graph::SceneNode},
    models::ModelRegistry,
    ownership::{MaterialEngine, OwnershipTable},
    resources::{self, LoadEvent},
};

/// What a call to [`BuildingContext::set_block_ownership`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The block exists and was brought into the requested state.
    Applied { block: BlockId, meshes_changed: usize },
    /// The ownership table was updated but the current building has no such block.
    UnknownBlock(BlockId),
    /// The ownership table was updated but no building is loaded yet.
    NoBuilding,
}

/**
 * Owns everything one building view needs: configuration, the ownership
 * table, the material engine with its template cache, the current building
 * and the original model it was cloned from.
 *
 * Contexts share nothing with each other, so several buildings can live side
 * by side.
 */
#[derive(Debug)]
pub struct BuildingContext {
    config: BuildingConfig,
    ownership: OwnershipTable,
    engine: MaterialEngine,
    registry: ModelRegistry,
    asset_root: PathBuf,
    building: Option<Building>,
    original_model: Option<SourceModel>,
    current_model_index: Option<usize>,
}

impl BuildingContext {
    pub fn new(
        config: BuildingConfig,
        settings: UnownedMaterialSettings,
        ownership: OwnershipTable,
    ) -> Self {
        Self {
            config,
            ownership,
            engine: MaterialEngine::new(settings),
            registry: ModelRegistry::default(),
            asset_root: PathBuf::from("assets"),
            building: None,
            original_model: None,
            current_model_index: None,
        }
    }

    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Directory model paths of the registry are resolved against.
    pub fn with_asset_root(mut self, asset_root: impl Into<PathBuf>) -> Self {
        self.asset_root = asset_root.into();
        self
    }

    pub fn config(&self) -> &BuildingConfig {
        &self.config
    }

    pub fn ownership(&self) -> &OwnershipTable {
        &self.ownership
    }

    pub fn engine(&self) -> &MaterialEngine {
        &self.engine
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn current_model_index(&self) -> Option<usize> {
        self.current_model_index
    }

    /**
     * Builds a new building from `source` and makes it the current one.
     *
     * `source` is kept as the original model; floors are clones of it. On
     * error the previous building and original model stay in place.
     */
    pub fn load_model(&mut self, source: SourceModel) -> Result<&Building, BuildingError> {
        let building = building::assemble(&source, &self.config, &self.ownership, &self.engine)
            .inspect_err(|e| log::error!("Could not construct building: {}", e))?;
        self.original_model = Some(source);
        Ok(&*self.building.insert(building))
    }

    /**
     * Loads the registry model at `index` from the asset root and builds it.
     *
     * Progress and the terminal load state are reported through `progress`.
     * Nothing changes when the index is invalid or loading fails.
     */
    pub async fn select_model(
        &mut self,
        index: usize,
        progress: &mut dyn FnMut(LoadEvent),
    ) -> anyhow::Result<&Building> {
        let entry = self.registry.get(index)?.clone();
        info!("Selecting model {} ({})", entry.name, entry.id);
        let model = resources::load_model_gltf(&self.asset_root, &entry.path, progress).await?;
        self.load_model(model)?;
        self.current_model_index = Some(index);
        self.building
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("building missing after loading {}", entry.id))
    }

    /**
     * Records the ownership of `block` and restyles its meshes.
     *
     * The table is always written, even when there is no building or the
     * block is not part of it, so a later model load picks the flag up.
     */
    pub fn set_block_ownership(
        &mut self,
        block: impl Into<BlockId>,
        is_owned: bool,
    ) -> ToggleOutcome {
        let block = block.into();
        self.ownership.set(block.clone(), is_owned);

        let Some(building) = self.building.as_mut() else {
            warn!(
                "Building not created yet, ownership of {} will be applied when it is constructed",
                block
            );
            return ToggleOutcome::NoBuilding;
        };

        let Some((group, backups)) = building.block_with_backups_mut(&block) else {
            let available = building
                .block_ids()
                .map(BlockId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            warn!(
                "Block group '{}' not found in building. Available children: {}",
                block, available
            );
            return ToggleOutcome::UnknownBlock(block);
        };

        info!(
            "Updating {} ownership to {}",
            block,
            if is_owned { "owned" } else { "unowned" }
        );
        let meshes_changed = self.engine.apply_ownership(group, is_owned, backups);
        ToggleOutcome::Applied {
            block,
            meshes_changed,
        }
    }

    pub fn current_building_root(&self) -> Option<&Building> {
        self.building.as_ref()
    }

    pub fn original_model_root(&self) -> Option<&dyn SceneNode> {
        self.original_model.as_ref().map(SourceModel::root)
    }

    /// Bounds of the current building, for a bounding indicator.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.building.as_ref().map(Building::bounding_box)
    }

    /// Takes the current building out of the scene. Ownership flags are kept.
    pub fn clear(&mut self) -> Option<Building> {
        self.building.take()
    }

    pub fn clear_material_cache(&mut self) {
        self.engine.clear_material_cache();
    }
}

impl Default for BuildingContext {
    fn default() -> Self {
        Self::new(
            BuildingConfig::default(),
            UnownedMaterialSettings::default(),
            OwnershipTable::from(config::default_ownership()),
        )
    }
}
