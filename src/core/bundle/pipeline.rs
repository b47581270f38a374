// ─── Build Pipeline ───
// Single-shot state machine: validate, resolve the jar, collect and fetch
// every asset, synthesize config files, compress, write the bundle.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::api::mcjars::{fetch_server_jar, ServerJarInfo};
use crate::core::cancel::CancelToken;
use crate::core::config::properties::generate_properties;
use crate::core::downloader::{AssetSource, DownloadQueue};
use crate::core::error::{BuilderError, BuilderResult};
use crate::core::state::{Selection, ServerConfig};

use super::archive::BundleArchive;
use super::collect::collect_downloads;
use super::datapack::gamerule_datapack;

const EULA_CONTENT: &str = "# Accepted via Minecraft-Server-Builder\neula=true\n";

/// Resolves a concrete server-jar build for a loader + game version.
#[async_trait]
pub trait JarResolver: Send + Sync {
    async fn resolve_jar(&self, loader: &str, version: &str) -> BuilderResult<ServerJarInfo>;
}

/// Production resolver backed by the mcjars build index.
pub struct McJarsResolver {
    client: reqwest::Client,
}

impl McJarsResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JarResolver for McJarsResolver {
    async fn resolve_jar(&self, loader: &str, version: &str) -> BuilderResult<ServerJarInfo> {
        fetch_server_jar(&self.client, loader, version).await
    }
}

/// Where a build run currently is. Terminal states are `Complete` and
/// `Failed`; a re-invocation starts fresh from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Idle,
    Validating,
    ResolvingJar,
    CollectingAssets,
    Downloading,
    Packaging,
    Compressing,
    Emitting,
    Complete,
    Failed,
}

/// Progress event handed to the injected callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProgress {
    pub state: BuildState,
    pub message: String,
    pub percent: u8,
}

/// The finished bundle on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// `{sanitized title}-{version}-{loader}.zip`: anything outside
/// `[A-Za-z0-9_-]` becomes `_`, then everything is lowercased.
pub fn build_file_name(project_title: &str, version: &str, loader_name: &str) -> String {
    let safe_name: String = project_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect::<String>()
        .to_lowercase();
    format!("{}-{}-{}.zip", safe_name, version, loader_name)
}

/// Drives one build from selection + configuration to a zip on disk.
///
/// Collaborators come in through ports so tests can run the whole machine
/// against in-memory fakes. The pipeline itself holds no per-run state;
/// callers must not re-trigger a run while one is in flight.
pub struct BuildPipeline {
    jar_resolver: Arc<dyn JarResolver>,
    assets: Arc<dyn AssetSource>,
    queue: DownloadQueue,
    output_dir: PathBuf,
}

impl BuildPipeline {
    pub fn new(
        jar_resolver: Arc<dyn JarResolver>,
        assets: Arc<dyn AssetSource>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            jar_resolver,
            assets,
            queue: DownloadQueue::new(),
            output_dir,
        }
    }

    /// Raise the download concurrency above the sequential default.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.queue = DownloadQueue::with_concurrency(concurrency);
        self
    }

    /// Run the whole pipeline. Every error ends up here as a single
    /// terminal `Failed` report; nothing partial is written on failure.
    pub async fn run<F>(
        &self,
        selection: &Selection,
        config: &ServerConfig,
        project_title: Option<&str>,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> BuilderResult<BuildArtifact>
    where
        F: FnMut(BuildProgress),
    {
        match self
            .execute(selection, config, project_title, cancel, &mut on_progress)
            .await
        {
            Ok(artifact) => {
                info!("Server build complete: {}", artifact.file_name);
                on_progress(BuildProgress {
                    state: BuildState::Complete,
                    message: format!("Server build complete: {}", artifact.file_name),
                    percent: 100,
                });
                Ok(artifact)
            }
            Err(e) => {
                on_progress(BuildProgress {
                    state: BuildState::Failed,
                    message: format!("Build failed: {}", e),
                    percent: 100,
                });
                Err(e)
            }
        }
    }

    async fn execute<F>(
        &self,
        selection: &Selection,
        config: &ServerConfig,
        project_title: Option<&str>,
        cancel: &CancelToken,
        on_progress: &mut F,
    ) -> BuilderResult<BuildArtifact>
    where
        F: FnMut(BuildProgress),
    {
        on_progress(BuildProgress {
            state: BuildState::Validating,
            message: "Preparing build...".to_string(),
            percent: 0,
        });
        let (version, loader) = validate(selection, config)?;
        ensure_active(cancel)?;

        on_progress(BuildProgress {
            state: BuildState::ResolvingJar,
            message: "Fetching server jar info...".to_string(),
            percent: 2,
        });
        let server_jar = self.jar_resolver.resolve_jar(&loader, &version).await?;
        ensure_active(cancel)?;

        on_progress(BuildProgress {
            state: BuildState::CollectingAssets,
            message: "Collecting files...".to_string(),
            percent: 5,
        });
        let collected = collect_downloads(&server_jar, selection, self.assets.as_ref()).await?;
        ensure_active(cancel)?;

        let mut archive = BundleArchive::new();
        let payloads = self
            .queue
            .run(
                self.assets.as_ref(),
                &collected.items,
                cancel,
                |filename, completed, total| {
                    let percent =
                        5 + (completed as f64 / total.max(1) as f64 * 80.0).round() as u8;
                    on_progress(BuildProgress {
                        state: BuildState::Downloading,
                        message: format!("Downloading: {} ({}/{})", filename, completed, total),
                        percent,
                    });
                },
            )
            .await?;
        for (item, bytes) in collected.items.iter().zip(payloads) {
            archive.add(&item.folder, &item.filename, bytes);
        }
        on_progress(BuildProgress {
            state: BuildState::Downloading,
            message: "Downloads complete.".to_string(),
            percent: 85,
        });
        ensure_active(cancel)?;

        on_progress(BuildProgress {
            state: BuildState::Packaging,
            message: "Adding configuration files...".to_string(),
            percent: 88,
        });
        add_config_files(&mut archive, config)?;
        ensure_active(cancel)?;

        on_progress(BuildProgress {
            state: BuildState::Compressing,
            message: "Compressing files...".to_string(),
            percent: 92,
        });
        let blob = archive.compress(|pct| {
            let percent = 92 + (pct as f64 * 0.07).round() as u8;
            on_progress(BuildProgress {
                state: BuildState::Compressing,
                message: format!("Compressing files... {}%", pct),
                percent,
            });
        })?;
        ensure_active(cancel)?;

        on_progress(BuildProgress {
            state: BuildState::Emitting,
            message: "Saving bundle...".to_string(),
            percent: 99,
        });
        let server_name = collected
            .instance_name
            .as_deref()
            .or(project_title)
            .unwrap_or("minecraft-server");
        let file_name = build_file_name(server_name, &version, &loader);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| BuilderError::Io {
                path: self.output_dir.clone(),
                source,
            })?;
        let path = self.output_dir.join(&file_name);
        let size = blob.len() as u64;
        tokio::fs::write(&path, blob)
            .await
            .map_err(|source| BuilderError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(BuildArtifact {
            file_name,
            path,
            size,
        })
    }
}

/// Fails closed before any network call; each reason has its own message.
fn validate(selection: &Selection, config: &ServerConfig) -> BuilderResult<(String, String)> {
    if !config.eula {
        return Err(BuilderError::EulaNotAccepted);
    }
    if config.chosen_version.is_empty() {
        return Err(BuilderError::NoVersionChosen);
    }
    let loader = selection
        .pinned_loader
        .clone()
        .ok_or(BuilderError::NoLoaderChosen)?;
    Ok((config.chosen_version.clone(), loader))
}

fn ensure_active(cancel: &CancelToken) -> BuilderResult<()> {
    if cancel.is_cancelled() {
        return Err(BuilderError::Cancelled);
    }
    Ok(())
}

/// The fixed config files every bundle carries, plus the gamerule datapack
/// when overrides exist.
fn add_config_files(archive: &mut BundleArchive, config: &ServerConfig) -> BuilderResult<()> {
    archive.add_root("eula.txt", EULA_CONTENT.as_bytes().to_vec());
    archive.add_root(
        "server.properties",
        generate_properties(&config.properties).into_bytes(),
    );

    if !config.start_script.is_empty() {
        archive.add_root("start.sh", config.start_script.clone().into_bytes());
    }

    if !config.gamerules.is_empty() {
        let pack = gamerule_datapack(&config.gamerules)?;
        archive.add("world/datapacks", "gamerules.zip", pack);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::VersionFile;
    use crate::core::state::GameruleEntry;
    use std::collections::HashMap;
    use std::io::Read;

    struct FixedResolver(ServerJarInfo);

    #[async_trait]
    impl JarResolver for FixedResolver {
        async fn resolve_jar(&self, _loader: &str, _version: &str) -> BuilderResult<ServerJarInfo> {
            Ok(self.0.clone())
        }
    }

    /// Resolver that must never be reached.
    struct UnreachableResolver;

    #[async_trait]
    impl JarResolver for UnreachableResolver {
        async fn resolve_jar(&self, _loader: &str, _version: &str) -> BuilderResult<ServerJarInfo> {
            panic!("resolver called before validation passed");
        }
    }

    struct MapSource(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl AssetSource for MapSource {
        async fn fetch(&self, url: &str) -> BuilderResult<Vec<u8>> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| BuilderError::Other(format!("no payload for {}", url)))
        }
    }

    fn with_file(id: &str, filename: &str, url: &str) -> crate::core::api::ProjectVersion {
        crate::core::api::ProjectVersion {
            id: id.to_string(),
            files: vec![VersionFile {
                url: url.to_string(),
                filename: filename.to_string(),
                primary: true,
                size: 10,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn ready_inputs() -> (Selection, ServerConfig) {
        let mut selection = Selection::default();
        selection.pinned_loader = Some("fabric".to_string());
        selection
            .mods
            .push(with_file("m1", "cool.jar", "https://cdn.example/cool.jar"));
        selection
            .datapacks
            .push(with_file("d1", "pack.zip", "https://cdn.example/pack.zip"));

        let mut config = ServerConfig::default();
        config.eula = true;
        config.set_chosen_version("1.20.1");
        config.add_gamerule(GameruleEntry {
            name: "keepInventory".to_string(),
            value: "true".to_string(),
        });

        (selection, config)
    }

    fn test_source() -> Arc<MapSource> {
        Arc::new(MapSource(HashMap::from([
            (
                "https://builds.example/server.jar".to_string(),
                b"jarbytes".to_vec(),
            ),
            ("https://cdn.example/cool.jar".to_string(), b"modbytes".to_vec()),
            ("https://cdn.example/pack.zip".to_string(), b"packbytes".to_vec()),
        ])))
    }

    fn test_pipeline(tag: &str, source: Arc<MapSource>) -> BuildPipeline {
        let out = std::env::temp_dir().join(format!("msb-build-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&out);
        BuildPipeline::new(
            Arc::new(FixedResolver(ServerJarInfo {
                jar_url: "https://builds.example/server.jar".to_string(),
                build_id: 7,
                jar_size: Some(8),
            })),
            source,
            out,
        )
    }

    fn archive_paths(path: &std::path::Path) -> Vec<String> {
        let bytes = std::fs::read(path).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn full_build_reaches_complete_with_expected_layout() {
        let (selection, config) = ready_inputs();
        let pipeline = test_pipeline("full", test_source());

        let mut events: Vec<BuildProgress> = Vec::new();
        let artifact = pipeline
            .run(
                &selection,
                &config,
                Some("My Cool Pack!"),
                &CancelToken::new(),
                |p| events.push(p),
            )
            .await
            .unwrap();

        assert_eq!(artifact.file_name, "my_cool_pack_-1.20.1-fabric.zip");
        assert!(artifact.path.exists());
        assert!(artifact.size > 0);

        // Progress is monotonically non-decreasing and ends at 100.
        assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(events.last().unwrap().percent, 100);
        assert_eq!(events.last().unwrap().state, BuildState::Complete);
        assert!(events.iter().any(|e| e.state == BuildState::Downloading));
        assert!(events.iter().any(|e| e.state == BuildState::Compressing));

        let paths = archive_paths(&artifact.path);
        assert!(paths.contains(&"eula.txt".to_string()));
        assert!(paths.contains(&"server.properties".to_string()));
        assert!(paths.contains(&"start.sh".to_string()));
        assert!(paths.contains(&"server.jar".to_string()));
        assert!(paths.contains(&"mods/cool.jar".to_string()));
        assert!(paths.contains(&"world/datapacks/pack.zip".to_string()));
        assert!(paths.contains(&"world/datapacks/gamerules.zip".to_string()));
    }

    #[tokio::test]
    async fn bundle_carries_the_synthesized_properties() {
        let (selection, config) = ready_inputs();
        let pipeline = test_pipeline("props", test_source());

        let artifact = pipeline
            .run(&selection, &config, None, &CancelToken::new(), |_| {})
            .await
            .unwrap();
        // No instance and no project title: the fallback bundle name.
        assert_eq!(artifact.file_name, "minecraft-server-1.20.1-fabric.zip");

        let bytes = std::fs::read(&artifact.path).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

        let mut eula = String::new();
        archive
            .by_name("eula.txt")
            .unwrap()
            .read_to_string(&mut eula)
            .unwrap();
        assert_eq!(eula, EULA_CONTENT);

        let mut properties = String::new();
        archive
            .by_name("server.properties")
            .unwrap()
            .read_to_string(&mut properties)
            .unwrap();
        assert!(properties.contains("difficulty=easy\n"));
        assert!(properties.contains("max-players=20\n"));
    }

    #[tokio::test]
    async fn validation_failures_abort_before_any_network_call() {
        let source = Arc::new(MapSource(HashMap::new()));
        let out = std::env::temp_dir().join(format!("msb-build-validate-{}", std::process::id()));
        let pipeline = BuildPipeline::new(Arc::new(UnreachableResolver), source, out);

        let (selection, mut config) = ready_inputs();
        config.eula = false;
        let result = pipeline
            .run(&selection, &config, None, &CancelToken::new(), |_| {})
            .await;
        assert!(matches!(result, Err(BuilderError::EulaNotAccepted)));
        assert!(result.unwrap_err().is_validation());

        let (selection, mut config) = ready_inputs();
        config.chosen_version = String::new();
        let result = pipeline
            .run(&selection, &config, None, &CancelToken::new(), |_| {})
            .await;
        assert!(matches!(result, Err(BuilderError::NoVersionChosen)));

        let (mut selection, config) = ready_inputs();
        selection.pinned_loader = None;
        let result = pipeline
            .run(&selection, &config, None, &CancelToken::new(), |_| {})
            .await;
        assert!(matches!(result, Err(BuilderError::NoLoaderChosen)));
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_once_and_writes_nothing() {
        let (selection, config) = ready_inputs();
        // Source is missing the datapack payload.
        let source = Arc::new(MapSource(HashMap::from([
            (
                "https://builds.example/server.jar".to_string(),
                b"jarbytes".to_vec(),
            ),
            ("https://cdn.example/cool.jar".to_string(), b"modbytes".to_vec()),
        ])));
        let pipeline = test_pipeline("failed", source);

        let mut events: Vec<BuildProgress> = Vec::new();
        let result = pipeline
            .run(&selection, &config, None, &CancelToken::new(), |p| {
                events.push(p)
            })
            .await;

        assert!(result.is_err());
        let last = events.last().unwrap();
        assert_eq!(last.state, BuildState::Failed);
        assert!(last.message.starts_with("Build failed: "));

        // No partial artifact was emitted.
        let expected = build_file_name("minecraft-server", "1.20.1", "fabric");
        assert!(!pipeline.output_dir.join(expected).exists());
    }

    #[tokio::test]
    async fn cancelled_run_fails_with_the_cancel_reason() {
        let (selection, config) = ready_inputs();
        let pipeline = test_pipeline("cancel", test_source());

        let cancel = CancelToken::new();
        cancel.cancel();

        let result = pipeline
            .run(&selection, &config, None, &cancel, |_| {})
            .await;
        assert!(matches!(result, Err(BuilderError::Cancelled)));
    }

    #[tokio::test]
    async fn mrpack_instance_names_the_artifact() {
        use std::io::Write;

        let index = r#"{
            "name": "Skyblock Isles",
            "files": [
                { "path": "mods/alpha.jar", "downloads": ["https://cdn.example/alpha.jar"], "fileSize": 3 }
            ]
        }"#;
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("modrinth.index.json", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(index.as_bytes()).unwrap();
        let mrpack = writer.finish().unwrap().into_inner();

        let source = Arc::new(MapSource(HashMap::from([
            (
                "https://builds.example/server.jar".to_string(),
                b"jarbytes".to_vec(),
            ),
            ("https://cdn.example/the.mrpack".to_string(), mrpack),
            ("https://cdn.example/alpha.jar".to_string(), b"alpha".to_vec()),
        ])));
        let pipeline = test_pipeline("mrpack", source);

        let mut selection = Selection::default();
        selection.pinned_loader = Some("fabric".to_string());
        selection.instance = Some(with_file(
            "inst",
            "skyblock.mrpack",
            "https://cdn.example/the.mrpack",
        ));
        let mut config = ServerConfig::default();
        config.eula = true;
        config.set_chosen_version("1.20.1");

        let artifact = pipeline
            .run(&selection, &config, None, &CancelToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(artifact.file_name, "skyblock_isles-1.20.1-fabric.zip");
        let paths = archive_paths(&artifact.path);
        assert!(paths.contains(&"mods/alpha.jar".to_string()));
    }

    #[test]
    fn file_name_sanitizer_replaces_and_lowercases() {
        assert_eq!(
            build_file_name("My Cool Pack!", "1.20.1", "fabric"),
            "my_cool_pack_-1.20.1-fabric.zip"
        );
        assert_eq!(
            build_file_name("plain-name_ok", "1.19", "forge"),
            "plain-name_ok-1.19-forge.zip"
        );
    }
}
