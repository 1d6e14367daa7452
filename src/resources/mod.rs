//! Loading models from external files.
//!
//! Loading reports its state through a [`LoadEvent`] callback: a series of
//! `Progress` percentages followed by exactly one terminal `Loaded` or
//! `Failed`.

use std::path::Path;

use anyhow::{Context as _, anyhow, bail};
use futures::future::join_all;

use crate::data_structures::{
    model::SourceModel,
    scene_graph::{ContainerNode, SceneNode, to_scene_node},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    /// Percentage of the main file read so far, `0..=100`.
    Progress(u8),
    Loaded,
    Failed(String),
}

fn percentage(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (loaded.min(total) as f64 / total as f64 * 100.0).round() as u8
}

#[cfg(target_arch = "wasm32")]
fn format_url(root: &Path, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no browser window available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow!("could not read the page origin"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.display()))?;
    Ok(base.join(file_name)?)
}

/// Reads `file_name` below `root`, reporting progress as it goes.
pub async fn load_binary(
    root: &Path,
    file_name: &str,
    progress: &mut dyn FnMut(LoadEvent),
) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        let data = reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec();
        progress(LoadEvent::Progress(100));
        data
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        use tokio::io::AsyncReadExt;

        const CHUNK_SIZE: usize = 64 * 1024;

        let path = root.join(file_name);
        let mut file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        let total = file.metadata().await?.len();
        let mut data = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut last_reported = None;
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            let percent = percentage(data.len() as u64, total);
            if last_reported != Some(percent) {
                progress(LoadEvent::Progress(percent));
                last_reported = Some(percent);
            }
        }
        if last_reported != Some(100) {
            progress(LoadEvent::Progress(100));
        }
        data
    };

    Ok(data)
}

async fn parse_model_gltf(
    root: &Path,
    file_name: &str,
    progress: &mut dyn FnMut(LoadEvent),
) -> anyhow::Result<SourceModel> {
    let gltf_bytes = load_binary(root, file_name, progress).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)?;
    let base_dir = Path::new(file_name)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    // Buffers in document order; external ones are filled in below
    let mut buffer_data: Vec<Option<Vec<u8>>> = Vec::new();
    let mut external = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(Some(blob.to_vec())),
                None => bail!("{} references a binary chunk it does not contain", file_name),
            },
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("{} embeds a data URI buffer, which is not supported", file_name)
            }
            gltf::buffer::Source::Uri(uri) => {
                external.push((buffer_data.len(), base_dir.join(uri)));
                buffer_data.push(None);
            }
        }
    }
    let loaded = join_all(external.iter().map(|(_, path)| async move {
        let mut ignore = |_: LoadEvent| {};
        let name = path.to_string_lossy().into_owned();
        load_binary(root, &name, &mut ignore).await
    }))
    .await;
    for ((slot, _), data) in external.into_iter().zip(loaded) {
        buffer_data[slot] = Some(data?);
    }
    let buffer_data: Vec<Vec<u8>> = buffer_data
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| anyhow!("{} contains no scene", file_name))?;
    // The root stays a plain container so that placing a floor never
    // overwrites a transform that came with the asset.
    let mut root_node = ContainerNode::new(file_name);
    for node in scene.nodes() {
        root_node.add_child(to_scene_node(node, &buffer_data));
    }

    Ok(SourceModel::new(file_name, Box::new(root_node)))
}

/// Loads a glTF model (`.gltf` with external buffers, or `.glb`).
pub async fn load_model_gltf(
    root: &Path,
    file_name: &str,
    progress: &mut dyn FnMut(LoadEvent),
) -> anyhow::Result<SourceModel> {
    match parse_model_gltf(root, file_name, &mut *progress).await {
        Ok(model) => {
            log::info!("Loaded model {} with {} meshes", file_name, model.mesh_count());
            progress(LoadEvent::Loaded);
            Ok(model)
        }
        Err(e) => {
            log::error!("Error loading model {}: {:#}", file_name, e);
            progress(LoadEvent::Failed(e.to_string()));
            Err(e)
        }
    }
}
