//! Building assembly.
//!
//! A building is a stack of floors cloned from one source model. Floors are
//! grouped into ownership blocks (`block_1`, `block_2`, ...) of
//! `floors_per_block` consecutive floors each. Every block is one container
//! under the building root; empty blocks are valid.

use std::fmt;

use cgmath::Vector3;
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    config::{BuildingConfig, FloorOverflow},
    data_structures::{
        bounds::Aabb, instance::Instance, material::MeshMaterial, mesh::Mesh,
        model::SourceModel, scene_graph::SceneNode,
    },
    ownership::{MaterialBackups, MaterialEngine, OwnershipTable},
};

#[derive(Debug, Error, PartialEq)]
pub enum BuildingError {
    #[error("invalid building configuration: `{field}` must be at least 1, got {value}")]
    InvalidConfig { field: &'static str, value: usize },
    #[error("source model `{0}` contains no meshes")]
    EmptyModel(String),
    #[error("source model `{name}` has no usable floor height ({height})")]
    DegenerateModel { name: String, height: f32 },
    #[error("floor {floor} does not fit into {block_count} blocks of {floors_per_block} floors")]
    FloorOverflow {
        floor: usize,
        block_count: usize,
        floors_per_block: usize,
    },
}

/// Name of an ownership block, `block_1` for the lowest one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(String);

impl BlockId {
    /// Id of the block with the given 0-based index.
    pub fn from_index(index: usize) -> Self {
        Self(format!("block_{}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&BlockId> for BlockId {
    fn from(value: &BlockId) -> Self {
        value.clone()
    }
}

/// One positioned clone of the source model.
#[derive(Debug)]
pub struct Floor {
    index: usize,
    vertical_offset: f32,
    centering: Vector3<f32>,
    node: Box<dyn SceneNode>,
}

impl Floor {
    /// Global 0-based floor index, counted from the bottom.
    pub fn index(&self) -> usize {
        self.index
    }

    /// `index * model_height`.
    pub fn vertical_offset(&self) -> f32 {
        self.vertical_offset
    }

    /// Offset that moves the model's bounding-box centre onto the origin.
    /// Equal for every floor of a building.
    pub fn centering(&self) -> Vector3<f32> {
        self.centering
    }

    /// Local position of the floor inside its block.
    pub fn position(&self) -> Vector3<f32> {
        self.node.get_local_transform().position
    }

    pub fn node(&self) -> &dyn SceneNode {
        self.node.as_ref()
    }

    pub(crate) fn node_mut(&mut self) -> &mut dyn SceneNode {
        self.node.as_mut()
    }

    /**
     * Visits the material slot of every mesh, in the order backups are keyed
     * by. Materials may be edited or replaced; the tree itself stays as
     * assembled.
     */
    pub fn for_each_material_mut(&mut self, visit: &mut dyn FnMut(&str, &mut MeshMaterial)) {
        self.node
            .for_each_mesh_mut(&mut |mesh: &mut Mesh| visit(&mesh.name, &mut mesh.material));
    }
}

/// Container for the floors of one ownership block.
#[derive(Debug)]
pub struct BlockGroup {
    id: BlockId,
    floors: Vec<Floor>,
}

impl BlockGroup {
    fn new(id: BlockId) -> Self {
        Self { id, floors: vec![] }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Floors in ascending index order.
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floors_mut(&mut self) -> &mut [Floor] {
        &mut self.floors
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}

/// Root of an assembled building.
#[derive(Debug)]
pub struct Building {
    blocks: Vec<BlockGroup>,
    backups: MaterialBackups,
    model_height: f32,
    dropped_floors: usize,
}

impl Building {
    pub fn blocks(&self) -> &[BlockGroup] {
        &self.blocks
    }

    pub fn block(&self, id: &BlockId) -> Option<&BlockGroup> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut BlockGroup> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &BlockId> {
        self.blocks.iter().map(|b| &b.id)
    }

    /// All attached floors, bottom to top.
    pub fn floors(&self) -> impl Iterator<Item = &Floor> {
        self.blocks.iter().flat_map(|b| b.floors.iter())
    }

    pub fn floor(&self, index: usize) -> Option<&Floor> {
        self.floors().find(|f| f.index == index)
    }

    pub fn floor_count(&self) -> usize {
        self.blocks.iter().map(|b| b.floors.len()).sum()
    }

    /// Floors left out because their block is not part of the building.
    pub fn dropped_floors(&self) -> usize {
        self.dropped_floors
    }

    pub fn model_height(&self) -> f32 {
        self.model_height
    }

    pub fn backups(&self) -> &MaterialBackups {
        &self.backups
    }

    /// Bounds of every floor in building space, for a bounding indicator.
    pub fn bounding_box(&self) -> Aabb {
        let root = Instance::default();
        self.floors()
            .fold(Aabb::empty(), |acc, floor| acc.union(&floor.node.bounds(&root)))
    }

    pub fn triangle_count(&self) -> usize {
        let mut count = 0;
        for floor in self.floors() {
            floor
                .node
                .for_each_mesh(&mut |mesh: &Mesh| count += mesh.triangle_count());
        }
        count
    }

    pub(crate) fn block_with_backups_mut(
        &mut self,
        id: &BlockId,
    ) -> Option<(&mut BlockGroup, &mut MaterialBackups)> {
        let backups = &mut self.backups;
        self.blocks
            .iter_mut()
            .find(|b| &b.id == id)
            .map(|block| (block, backups))
    }
}

fn validate(config: &BuildingConfig) -> Result<(), BuildingError> {
    let fields = [
        ("total_floors", config.total_floors),
        ("floors_per_block", config.floors_per_block),
        ("block_count", config.block_count),
    ];
    match fields.into_iter().find(|(_, value)| *value < 1) {
        Some((field, value)) => Err(BuildingError::InvalidConfig { field, value }),
        None => Ok(()),
    }
}

/**
 * Builds the floor stack for `source`.
 *
 * Floor `i` is a deep clone of the source placed at
 * `(-center.x, -center.y + i * height, -center.z)` where `center` and `height`
 * come from the source's bounding box, and it lands in block
 * `block_{i / floors_per_block + 1}`. Each floor is styled according to the
 * ownership flag of its block before it is attached.
 */
pub fn assemble(
    source: &SourceModel,
    config: &BuildingConfig,
    ownership: &OwnershipTable,
    engine: &MaterialEngine,
) -> Result<Building, BuildingError> {
    validate(config)?;
    if source.mesh_count() == 0 {
        return Err(BuildingError::EmptyModel(source.name().to_string()));
    }

    let bounds = source.bounds();
    let center = bounds.center();
    let model_height = bounds.size().y;
    if bounds.is_empty() || !model_height.is_finite() || model_height <= 0.0 {
        return Err(BuildingError::DegenerateModel {
            name: source.name().to_string(),
            height: model_height,
        });
    }
    info!("Model height for stacking: {}", model_height);

    let needed_blocks = config.total_floors.div_ceil(config.floors_per_block);
    let block_total = match config.overflow {
        FloorOverflow::ExtendBlocks => config.block_count.max(needed_blocks),
        FloorOverflow::Reject if config.total_floors > config.capacity() => {
            return Err(BuildingError::FloorOverflow {
                floor: config.capacity(),
                block_count: config.block_count,
                floors_per_block: config.floors_per_block,
            });
        }
        _ => config.block_count,
    };

    let mut blocks: Vec<BlockGroup> = (0..block_total)
        .map(|i| BlockGroup::new(BlockId::from_index(i)))
        .collect();
    let mut backups = MaterialBackups::default();
    let mut dropped_floors = 0;
    let centering = Vector3::new(-center.x, -center.y, -center.z);

    for floor_index in 0..config.total_floors {
        let block_index = floor_index / config.floors_per_block;
        let Some(block) = blocks.get_mut(block_index) else {
            warn!(
                "Floor {} belongs to {} which is not part of the building, dropping it",
                floor_index,
                BlockId::from_index(block_index)
            );
            dropped_floors += 1;
            continue;
        };

        let vertical_offset = floor_index as f32 * model_height;
        let mut node = source.instantiate();
        node.set_local_transform_with(&mut |local: &mut Instance| {
            local.position = centering + Vector3::new(0.0, vertical_offset, 0.0);
        });

        let is_owned = ownership.is_owned(&block.id);
        engine.style_subtree(floor_index, node.as_mut(), is_owned, &mut backups);
        debug!(
            "Added floor {} to {} with {} material",
            floor_index,
            block.id,
            if is_owned { "owned" } else { "unowned" }
        );

        block.floors.push(Floor {
            index: floor_index,
            vertical_offset,
            centering,
            node,
        });
    }

    let building = Building {
        blocks,
        backups,
        model_height,
        dropped_floors,
    };
    info!(
        "Assembled {} floors into {} blocks ({} dropped)",
        building.floor_count(),
        building.blocks.len(),
        dropped_floors
    );
    Ok(building)
}
