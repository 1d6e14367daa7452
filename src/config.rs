//! Static configuration of the building view.
//!
//! The defaults reproduce the stock setup: twelve floors in four blocks of
//! three, every block owned, and a light grey translucent wireframe for
//! unowned blocks.

use std::collections::HashMap;

use crate::{
    building::BlockId,
    data_structures::material::{Color, Material, Side},
};

/// What to do with floors whose block index is past the configured block count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloorOverflow {
    /// Leave them out of the building. Each one is logged and counted.
    #[default]
    Drop,
    /// Fail the assembly.
    Reject,
    /// Grow the building by as many blocks as needed.
    ExtendBlocks,
}

/// Structure of the building.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildingConfig {
    pub total_floors: usize,
    /// Number of consecutive floors that form one ownership block.
    pub floors_per_block: usize,
    /// Number of block groups created under the building root.
    pub block_count: usize,
    pub overflow: FloorOverflow,
}

impl BuildingConfig {
    pub fn new(total_floors: usize, floors_per_block: usize) -> Self {
        Self {
            total_floors,
            floors_per_block,
            ..Default::default()
        }
    }

    pub fn with_block_count(mut self, block_count: usize) -> Self {
        self.block_count = block_count;
        self
    }

    pub fn with_overflow(mut self, overflow: FloorOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Number of floors that fit into the configured blocks.
    pub fn capacity(&self) -> usize {
        self.block_count.saturating_mul(self.floors_per_block)
    }
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            total_floors: 12,
            floors_per_block: 3,
            block_count: 4,
            overflow: FloorOverflow::Drop,
        }
    }
}

/// Look of unowned blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct UnownedMaterialSettings {
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub roughness: f32,
    pub metalness: f32,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub side: Side,
}

impl UnownedMaterialSettings {
    pub fn to_material(&self) -> Material {
        Material {
            name: String::from("unowned"),
            color: Color::from_hex(self.color),
            roughness: self.roughness,
            metalness: self.metalness,
            wireframe: self.wireframe,
            transparent: self.transparent,
            opacity: self.opacity,
            side: self.side,
        }
    }
}

impl Default for UnownedMaterialSettings {
    fn default() -> Self {
        Self {
            color: 0xdddddd,
            roughness: 0.7,
            metalness: 0.1,
            wireframe: true,
            transparent: true,
            opacity: 0.5,
            side: Side::Double,
        }
    }
}

/// Ownership flags known at start-up. Stands in for an external ownership
/// registry; every stock block starts out owned.
pub fn default_ownership() -> HashMap<BlockId, bool> {
    (0..BuildingConfig::default().block_count)
        .map(|index| (BlockId::from_index(index), true))
        .collect()
}
