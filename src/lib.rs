//! shape-blocks
//!
//! Builds a multi-floor building from a single floor model and shows which
//! parts of it are owned. Floors are stacked clones of the model, grouped into
//! ownership blocks; blocks that are not owned swap their materials for a
//! translucent wireframe and can be switched back without losing the original
//! look.
//!
//! High-level modules
//! - `building`: assembly of the floor stack and its block groups
//! - `config`: building structure, unowned material look, ownership seed
//! - `context`: the top-level object the UI and scene composition talk to
//! - `data_structures`: scene graph, meshes, materials, transforms, bounds
//! - `logging`: platform logger set-up
//! - `models`: catalogue of selectable models
//! - `ownership`: ownership table and the owned/unowned material swap
//! - `resources`: glTF loading with progress reporting
//!

pub mod building;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod logging;
pub mod models;
pub mod ownership;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use building::{BlockId, Building, BuildingError};
pub use cgmath::*;
pub use context::{BuildingContext, ToggleOutcome};
