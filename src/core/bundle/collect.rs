// ─── Asset Collection ───
// Turns the resolved jar + selection into the flat download list the
// pipeline feeds through the queue.

use tracing::info;

use crate::core::api::{ProjectVersion, ServerJarInfo};
use crate::core::downloader::{AssetSource, DownloadItem};
use crate::core::error::BuilderResult;
use crate::core::state::Selection;

use super::mrpack::read_pack_index;

const MODS_FOLDER: &str = "mods";
const DATAPACKS_FOLDER: &str = "world/datapacks";
const MRPACK_EXTENSION: &str = ".mrpack";

/// The download list plus the bundle name discovered along the way.
#[derive(Debug, Default)]
pub struct CollectedAssets {
    pub items: Vec<DownloadItem>,
    /// Name from the expanded modpack manifest, if the instance was one.
    pub instance_name: Option<String>,
}

/// Collect every file the bundle needs: the server jar at the root, the
/// instance (expanded when it is an .mrpack manifest), then mods and
/// datapacks into their folders.
pub async fn collect_downloads(
    server_jar: &ServerJarInfo,
    selection: &Selection,
    assets: &dyn AssetSource,
) -> BuilderResult<CollectedAssets> {
    let mut collected = CollectedAssets::default();

    collected.items.push(DownloadItem {
        url: server_jar.jar_url.clone(),
        filename: "server.jar".to_string(),
        folder: String::new(),
        size: server_jar.jar_size,
        sha1: None,
        sha512: None,
    });

    if let Some(instance) = &selection.instance {
        if let Some(primary) = instance.primary_file() {
            if primary.filename.ends_with(MRPACK_EXTENSION) {
                let data = assets.fetch(&primary.url).await?;
                let index = read_pack_index(&data)?;
                info!(
                    "Expanded modpack manifest '{}' into {} file(s)",
                    index.name,
                    index.files.len()
                );
                collected.instance_name = Some(index.name.clone());

                for file in &index.files {
                    let Some(url) = file.downloads.first() else {
                        continue;
                    };
                    let (folder, filename) = split_relative_path(&file.path);
                    collected.items.push(DownloadItem {
                        url: url.clone(),
                        filename,
                        folder,
                        size: Some(file.file_size),
                        sha1: file.hashes.sha1.clone(),
                        sha512: file.hashes.sha512.clone(),
                    });
                }
            } else {
                collected.items.extend(collect_files(
                    std::slice::from_ref(instance),
                    "",
                ));
            }
        }
    }

    collected
        .items
        .extend(collect_files(&selection.mods, MODS_FOLDER));
    collected
        .items
        .extend(collect_files(&selection.datapacks, DATAPACKS_FOLDER));

    Ok(collected)
}

/// One download per version's primary file, all into the same folder.
fn collect_files(versions: &[ProjectVersion], folder: &str) -> Vec<DownloadItem> {
    versions
        .iter()
        .filter_map(|version| version.primary_file())
        .map(|file| DownloadItem {
            url: file.url.clone(),
            filename: file.filename.clone(),
            folder: folder.to_string(),
            size: Some(file.size),
            sha1: file.hashes.get("sha1").cloned(),
            sha512: file.hashes.get("sha512").cloned(),
        })
        .collect()
}

/// Split a manifest path into (folder, filename); top-level paths get an
/// empty folder.
fn split_relative_path(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((folder, filename)) => (folder.to_string(), filename.to_string()),
        None => (String::new(), path.to_string()),
    }
}
