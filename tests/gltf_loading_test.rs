use std::path::{Path, PathBuf};

use shape_blocks::{
    BuildingContext,
    data_structures::mesh::Mesh,
    models::{ModelEntry, ModelRegistry},
    resources::{LoadEvent, load_model_gltf},
};

use crate::common::test_utils::assert_close;

mod common;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fixture_registry() -> ModelRegistry {
    ModelRegistry::new(
        vec![
            ModelEntry::new("slab", "Slab", "floor.gltf", "Single box floor"),
            ModelEntry::new("missing", "Missing", "missing.gltf", "Not on disk"),
        ],
        0,
    )
}

#[tokio::test]
async fn should_load_gltf_and_report_progress() {
    let mut events = Vec::new();
    let model = load_model_gltf(&fixtures(), "floor.gltf", &mut |e: LoadEvent| events.push(e))
        .await
        .unwrap();

    assert_eq!(events.last(), Some(&LoadEvent::Loaded));
    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            LoadEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(model.mesh_count(), 1);
    let slab = &model.root().get_children()[0];
    assert_eq!(slab.name(), "floor_slab");
    assert_close(slab.get_local_transform().position.y, 1.0);

    let bounds = model.bounds();
    assert_close(bounds.min.y, 1.0);
    assert_close(bounds.max.y, 4.0);
    assert_close(bounds.min.x, -2.0);
    assert_close(bounds.max.x, 2.0);

    model.root().for_each_mesh(&mut |mesh: &Mesh| {
        assert_eq!(mesh.triangle_count(), 12);
        let material = mesh.material.materials().next().unwrap();
        assert_eq!(material.name, "concrete");
        assert_close(material.color.r, 0.5);
        assert_close(material.metalness, 0.25);
        assert_close(material.roughness, 0.75);
        assert!(!material.wireframe);
    });
}

#[tokio::test]
async fn should_keep_the_triangles_of_each_primitive_with_its_material() {
    let model = load_model_gltf(&fixtures(), "floor_two_materials.gltf", &mut |_: LoadEvent| {})
        .await
        .unwrap();
    let mut ctx = BuildingContext::default();
    ctx.load_model(model).unwrap();

    let groups_of_first_floor = |ctx: &BuildingContext| {
        let building = ctx.current_building_root().unwrap();
        let mut groups = Vec::new();
        building.floor(0).unwrap().node().for_each_mesh(&mut |mesh: &Mesh| {
            assert_eq!(mesh.indices.len(), 72);
            assert_eq!(mesh.groups, vec![0..36, 36..72]);
            groups.extend(
                mesh.material_groups()
                    .map(|(range, material)| (range, material.name.clone())),
            );
        });
        groups
    };

    assert_eq!(
        groups_of_first_floor(&ctx),
        vec![(0..36, "concrete".to_string()), (36..72, "glass".to_string())]
    );

    ctx.set_block_ownership("block_1", false);
    assert_eq!(
        groups_of_first_floor(&ctx),
        vec![(0..36, "unowned".to_string()), (36..72, "unowned".to_string())]
    );

    ctx.set_block_ownership("block_1", true);
    assert_eq!(
        groups_of_first_floor(&ctx),
        vec![(0..36, "concrete".to_string()), (36..72, "glass".to_string())]
    );
}

#[tokio::test]
async fn should_report_failure_for_missing_files() {
    let mut events = Vec::new();
    let result = load_model_gltf(&fixtures(), "missing.gltf", &mut |e: LoadEvent| events.push(e)).await;

    assert!(result.is_err());
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], LoadEvent::Failed(_)));
}

#[tokio::test]
async fn should_select_a_model_from_the_registry() {
    let mut ctx = BuildingContext::default()
        .with_registry(fixture_registry())
        .with_asset_root(fixtures());
    let mut done = false;

    let building = ctx
        .select_model(0, &mut |e: LoadEvent| done |= e == LoadEvent::Loaded)
        .await
        .unwrap();

    assert_eq!(building.floor_count(), 12);
    assert_close(building.model_height(), 3.0);
    assert_close(building.floor(11).unwrap().vertical_offset(), 33.0);
    assert!(done);
    assert_eq!(ctx.current_model_index(), Some(0));
    assert!(ctx.original_model_root().is_some());
}

#[tokio::test]
async fn should_keep_the_current_building_when_selection_fails() {
    let mut ctx = BuildingContext::default()
        .with_registry(fixture_registry())
        .with_asset_root(fixtures());
    ctx.select_model(0, &mut |_: LoadEvent| {}).await.unwrap();

    assert!(ctx.select_model(7, &mut |_: LoadEvent| {}).await.is_err());
    assert!(ctx.select_model(1, &mut |_: LoadEvent| {}).await.is_err());

    assert_eq!(ctx.current_model_index(), Some(0));
    assert_eq!(ctx.current_building_root().unwrap().floor_count(), 12);
}

#[test]
fn should_list_the_stock_models() {
    let registry = ModelRegistry::default();

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.default_index(), 2);
    assert_eq!(registry.get(2).unwrap().id, "model3");
    assert_eq!(registry.find("model1").map(|(i, _)| i), Some(0));
    assert!(registry.get(3).is_err());
}
