//! Scene graph and hierarchical scene organization.
//!
//! A scene graph is a tree of nodes, each with a local transform relative to
//! its parent. Container nodes only group children; mesh nodes additionally
//! carry geometry and a material slot. Loaded models, floors and the whole
//! building are all expressed as trees of `SceneNode`s.

use std::fmt;

use crate::data_structures::{
    bounds::Aabb,
    instance::Instance,
    material::{Color, Material, MeshMaterial, Side},
    mesh::Mesh,
};

pub trait SceneNode {
    fn name(&self) -> &str;

    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn set_local_transform_with(&mut self, mutation: &mut dyn FnMut(&mut Instance));

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn mesh(&self) -> Option<&Mesh> {
        None
    }

    fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        None
    }

    /**
     * Deep copy of the whole subtree. Geometry and materials of the copy are
     * fresh allocations, nothing is shared with `self`.
     */
    fn clone_node(&self) -> Box<dyn SceneNode>;

    /// Depth-first, parent before children, children in insertion order.
    fn for_each_mesh(&self, visit: &mut dyn FnMut(&Mesh)) {
        if let Some(mesh) = self.mesh() {
            visit(mesh);
        }
        for child in self.get_children() {
            child.for_each_mesh(visit);
        }
    }

    /// Same order as [`SceneNode::for_each_mesh`].
    fn for_each_mesh_mut(&mut self, visit: &mut dyn FnMut(&mut Mesh)) {
        if let Some(mesh) = self.mesh_mut() {
            visit(mesh);
        }
        for child in self.get_children_mut().iter_mut() {
            child.for_each_mesh_mut(visit);
        }
    }

    fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(&mut |_: &Mesh| count += 1);
        count
    }

    /**
     * Bounds of the subtree in the space of the parent whose world transform is
     * `parent`. Pass `Instance::default()` to get bounds in the parent space of
     * this node.
     */
    fn bounds(&self, parent: &Instance) -> Aabb {
        let world = parent * self.get_local_transform();
        let own = self
            .mesh()
            .map(|mesh| mesh.local_bounds().transformed(&world))
            .unwrap_or_default();
        self.get_children()
            .iter()
            .fold(own, |acc, child| acc.union(&child.bounds(&world)))
    }
}

impl fmt::Debug for dyn SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name())
            .field("local", self.get_local_transform())
            .field("mesh", &self.mesh().map(|m| &m.name))
            .field("children", self.get_children())
            .finish()
    }
}

pub struct ContainerNode {
    pub name: String,
    pub children: Vec<Box<dyn SceneNode>>,
    pub local: Instance,
}

impl ContainerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: vec![],
            local: Instance::default(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn set_local_transform_with(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        mutation(&mut self.local);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(Self {
            name: self.name.clone(),
            children: self.children.iter().map(|c| c.clone_node()).collect(),
            local: self.local.clone(),
        })
    }
}

pub struct MeshNode {
    children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    mesh: Mesh,
}

impl MeshNode {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            children: vec![],
            local: Instance::default(),
            mesh,
        }
    }

    pub fn with_transform(mesh: Mesh, local: Instance) -> Self {
        Self {
            children: vec![],
            local,
            mesh,
        }
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.mesh.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn set_local_transform_with(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        mutation(&mut self.local);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn mesh(&self) -> Option<&Mesh> {
        Some(&self.mesh)
    }

    fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        Some(&mut self.mesh)
    }

    fn clone_node(&self) -> Box<dyn SceneNode> {
        Box::new(Self {
            children: self.children.iter().map(|c| c.clone_node()).collect(),
            local: self.local.clone(),
            mesh: self.mesh.deep_clone(),
        })
    }
}

fn to_material(material: gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    Material {
        name: material.name().unwrap_or("unnamed_material").to_string(),
        color: Color::new(r, g, b),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
        wireframe: false,
        transparent: material.alpha_mode() == gltf::material::AlphaMode::Blend,
        opacity: a,
        side: if material.double_sided() {
            Side::Double
        } else {
            Side::Front
        },
    }
}

/**
 * Converts a glTF node (and its children) into scene nodes.
 *
 * A glTF mesh with several primitives becomes a single mesh with one material
 * per primitive; its geometry is concatenated in primitive order and each
 * primitive's index range is recorded as a group.
 */
pub fn to_scene_node(node: gltf::scene::Node, buf: &[Vec<u8>]) -> Box<dyn SceneNode> {
    let node_name = node.name().unwrap_or("unnamed_node").to_string();
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mut positions: Vec<[f32; 3]> = Vec::new();
            let mut indices: Vec<u32> = Vec::new();
            let mut materials = Vec::new();
            let mut groups = Vec::new();

            mesh.primitives().for_each(|primitive| {
                let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(|b| b.as_slice()));
                let offset = positions.len() as u32;
                let mut primitive_positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .map(|iter| iter.collect())
                    .unwrap_or_default();
                let count = primitive_positions.len() as u32;
                let start = indices.len() as u32;
                match reader.read_indices() {
                    Some(raw) => indices.extend(raw.into_u32().map(|i| i + offset)),
                    None => indices.extend((0..count).map(|i| i + offset)),
                }
                positions.append(&mut primitive_positions);
                groups.push(start..indices.len() as u32);
                materials.push(to_material(primitive.material()));
            });

            let material = if materials.len() == 1 {
                groups.clear();
                MeshMaterial::single(materials.remove(0))
            } else {
                MeshMaterial::Multi(materials.into_iter().map(std::rc::Rc::new).collect())
            };
            let mesh_name = mesh.name().map(str::to_string).unwrap_or(node_name);
            let mesh = Mesh::new(mesh_name, positions, indices, material).with_groups(groups);
            Box::new(MeshNode::new(mesh))
        }
        None => Box::new(ContainerNode::new(node_name)),
    };
    let (position, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Instance {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    });
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buf));
    }

    scene_node
}
