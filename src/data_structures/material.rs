//! Surface materials of meshes.
//!
//! Materials are shared through `Rc` handles. A handle is the identity of a
//! material: two meshes showing "the same material" hold the same `Rc`,
//! while `deep_clone` hands out fresh allocations with equal values. Editing
//! goes through `Rc::make_mut`, so a change through one handle never leaks
//! into another mesh.

use std::rc::Rc;

/// Linear RGB colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Colour from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

/// Which faces of a mesh get rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// PBR metallic-roughness material with the display flags the building view needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub side: Side,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
            side: Side::Front,
        }
    }
}

/// The material slot of a mesh: one material, or one per primitive group.
#[derive(Clone, Debug)]
pub enum MeshMaterial {
    Single(Rc<Material>),
    Multi(Vec<Rc<Material>>),
}

impl MeshMaterial {
    pub fn single(material: Material) -> Self {
        MeshMaterial::Single(Rc::new(material))
    }

    /// New allocations for every material in the slot. `Clone` on the other
    /// hand only copies the handles.
    pub fn deep_clone(&self) -> Self {
        match self {
            MeshMaterial::Single(m) => MeshMaterial::Single(Rc::new(Material::clone(m))),
            MeshMaterial::Multi(ms) => MeshMaterial::Multi(
                ms.iter()
                    .map(|m| Rc::new(Material::clone(m)))
                    .collect(),
            ),
        }
    }

    /// True when both slots hold the very same material handles.
    pub fn ptr_eq(&self, other: &MeshMaterial) -> bool {
        match (self, other) {
            (MeshMaterial::Single(a), MeshMaterial::Single(b)) => Rc::ptr_eq(a, b),
            (MeshMaterial::Multi(a), MeshMaterial::Multi(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Rc::ptr_eq(a, b))
            }
            _ => false,
        }
    }

    /// Value equality, ignoring handle identity.
    pub fn same_values(&self, other: &MeshMaterial) -> bool {
        self.materials().eq(other.materials())
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        let slice: &[Rc<Material>] = match self {
            MeshMaterial::Single(m) => std::slice::from_ref(m),
            MeshMaterial::Multi(ms) => ms,
        };
        slice.iter().map(|m| m.as_ref())
    }

    /// Material drawn for index group `group` of the mesh. A single material
    /// covers every group.
    pub fn for_group(&self, group: usize) -> Option<&Material> {
        match self {
            MeshMaterial::Single(m) => Some(m.as_ref()),
            MeshMaterial::Multi(ms) => ms.get(group).map(|m| m.as_ref()),
        }
    }

    /// Mutable access to every material in the slot. Handles shared with
    /// other slots are copied first.
    pub fn for_each_mut(&mut self, mut mutation: impl FnMut(&mut Material)) {
        match self {
            MeshMaterial::Single(m) => mutation(Rc::make_mut(m)),
            MeshMaterial::Multi(ms) => ms.iter_mut().for_each(|m| mutation(Rc::make_mut(m))),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MeshMaterial::Single(_) => 1,
            MeshMaterial::Multi(ms) => ms.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
