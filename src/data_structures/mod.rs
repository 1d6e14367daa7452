//! Engine data structures: scene graphs, meshes, materials, and transforms.
//!
//! This module contains the core data types for scene representation:
//!
//! - `bounds` has the axis-aligned bounding box used for stacking and indicators
//! - `instance` holds local transformation data of scene nodes
//! - `material` contains material definitions and per-mesh material slots
//! - `mesh` contains CPU-side geometry
//! - `model` wraps a loaded scene graph that serves as a template for cloning
//! - `scene_graph` enables hierarchical scene organization

pub mod bounds;
pub mod instance;
pub mod material;
pub mod mesh;
pub mod model;
pub mod scene_graph;
