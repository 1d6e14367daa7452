use std::rc::Rc;

use shape_blocks::{
    Vector3,
    building::Building,
    data_structures::{
        instance::Instance,
        material::{Color, Material, MeshMaterial},
        mesh::Mesh,
        model::SourceModel,
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
};

pub(crate) fn material(name: &str, hex: u32) -> Material {
    Material {
        name: name.to_string(),
        color: Color::from_hex(hex),
        roughness: 0.4,
        metalness: 0.6,
        ..Default::default()
    }
}

/// Axis-aligned box between `min` and `max`, 12 triangles.
pub(crate) fn box_mesh(name: &str, min: [f32; 3], max: [f32; 3], material: MeshMaterial) -> Mesh {
    let positions = (0..8)
        .map(|i| {
            [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ]
        })
        .collect();
    let quads: [[u32; 4]; 6] = [
        [0, 1, 3, 2],
        [4, 6, 7, 5],
        [0, 2, 6, 4],
        [1, 5, 7, 3],
        [0, 4, 5, 1],
        [2, 3, 7, 6],
    ];
    let indices = quads
        .iter()
        .flat_map(|[a, b, c, d]| [*a, *b, *c, *a, *c, *d])
        .collect();
    Mesh::new(name, positions, indices, material)
}

/**
 * Floor model spanning (1, 2, 3)..(3, 5, 4): centre (2, 3.5, 3.5), height 3.
 *
 * The tree is a container with a wall mesh and, as the wall's child, a
 * window mesh carrying two materials.
 */
pub(crate) fn floor_model() -> SourceModel {
    let wall = box_mesh(
        "wall",
        [1.0, 2.0, 3.0],
        [3.0, 5.0, 4.0],
        MeshMaterial::single(material("brick", 0x884422)),
    );
    let window = box_mesh(
        "window",
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.1],
        MeshMaterial::Multi(vec![
            Rc::new(material("glass", 0x88ccff)),
            Rc::new(material("frame", 0x222222)),
        ]),
    )
    .with_groups(vec![0..18, 18..36]);
    let mut wall_node = MeshNode::new(wall);
    wall_node.add_child(Box::new(MeshNode::with_transform(
        window,
        Instance::from(Vector3::new(1.5, 3.0, 3.0)),
    )));
    let mut root = ContainerNode::new("floor");
    root.add_child(Box::new(wall_node));
    SourceModel::new("floor", Box::new(root))
}

pub(crate) const MODEL_HEIGHT: f32 = 3.0;

/// Materials of every mesh in every floor of `block`, in traversal order.
pub(crate) fn block_materials(building: &Building, block: &str) -> Vec<MeshMaterial> {
    let mut out = Vec::new();
    let group = building
        .block(&block.into())
        .expect("block should exist");
    for floor in group.floors() {
        floor
            .node()
            .for_each_mesh(&mut |mesh: &Mesh| out.push(mesh.material.clone()));
    }
    out
}

pub(crate) fn model_materials(node: &dyn SceneNode) -> Vec<MeshMaterial> {
    let mut out = Vec::new();
    node.for_each_mesh(&mut |mesh: &Mesh| out.push(mesh.material.clone()));
    out
}

pub(crate) fn is_unowned_look(material: &MeshMaterial) -> bool {
    material
        .materials()
        .all(|m| m.wireframe && m.transparent && m.opacity == 0.5 && m.color.to_hex() == 0xdddddd)
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
