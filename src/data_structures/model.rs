use crate::data_structures::{bounds::Aabb, instance::Instance, scene_graph::SceneNode};

/// A loaded asset used as the template every floor is cloned from.
///
/// The model never hands out mutable access to its tree; all clones are
/// deep, so whatever happens to a floor cannot reach back into the template.
#[derive(Debug)]
pub struct SourceModel {
    name: String,
    root: Box<dyn SceneNode>,
}

impl SourceModel {
    pub fn new(name: impl Into<String>, root: Box<dyn SceneNode>) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &dyn SceneNode {
        self.root.as_ref()
    }

    /// Independent copy of the whole tree, materials included.
    pub fn instantiate(&self) -> Box<dyn SceneNode> {
        self.root.clone_node()
    }

    /// Bounds of the model as placed by its own root transform.
    pub fn bounds(&self) -> Aabb {
        self.root.bounds(&Instance::default())
    }

    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }
}

impl Clone for SourceModel {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            root: self.instantiate(),
        }
    }
}
