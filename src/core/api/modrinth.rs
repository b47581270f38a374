// ─── Content API ───
// Modrinth v2 client: project search with facets, project/version lookups
// and the tag endpoints that feed the selection UI.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::BuilderResult;

const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";

// Fixed companion projects for Bedrock crossplay support.
const GEYSER_PROJECT_ID: &str = "wKkoqHrH";
const FLOODGATE_PROJECT_ID: &str = "bWrNNfkb";

/// Project types the builder can actually put into a server bundle.
const ALLOWED_PROJECT_TYPES: [&str; 3] = ["modpack", "datapack", "mod"];

/// A project as returned by search / bulk lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub server_side: Option<String>,
    #[serde(default)]
    pub client_side: Option<String>,
}

/// A downloadable file attached to a published version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub hashes: std::collections::BTreeMap<String, String>,
}

/// Reference to another project this version depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionDependency {
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub dependency_type: String,
}

/// A published version of a project: the unit the user selects as an
/// instance, mod or datapack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version_number: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<VersionDependency>,
    #[serde(default)]
    pub files: Vec<VersionFile>,
    #[serde(default)]
    pub date_published: Option<String>,
}

impl ProjectVersion {
    /// The file a bundle should ship for this version: the one flagged
    /// primary, falling back to the first listed.
    pub fn primary_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<Project>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_hits: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub icon: String,
    pub name: String,
    pub project_type: String,
    pub header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameVersionTag {
    pub version: String,
    pub version_type: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderTag {
    pub icon: String,
    pub name: String,
    pub supported_project_types: Vec<String>,
}

/// Search request: free-text query plus facet groups. Facet groups are
/// OR'd internally and AND'd against each other on the server side.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub categories: Vec<String>,
    /// Extra facets keyed by field (e.g. `project_type` -> `["mod"]`).
    pub facets: Vec<(String, Vec<String>)>,
    pub loader: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl SearchParams {
    /// Assemble the facet array-of-arrays the search endpoint expects.
    ///
    /// Unknown `project_type` values are dropped, a loader filter becomes a
    /// `categories:` group, and every search excludes projects that cannot
    /// run server-side.
    pub fn facet_groups(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = Vec::new();

        for (field, values) in &self.facets {
            let group: Vec<String> = values
                .iter()
                .filter(|value| {
                    field != "project_type" || ALLOWED_PROJECT_TYPES.contains(&value.as_str())
                })
                .map(|value| format!("{}:{}", field, value))
                .collect();
            groups.push(group);
        }

        if !self.categories.is_empty() {
            groups.push(
                self.categories
                    .iter()
                    .map(|c| format!("categories:{}", c))
                    .collect(),
            );
        }

        if let Some(loader) = &self.loader {
            groups.push(vec![format!("categories:{}", loader)]);
        }

        groups.push(vec!["server_side!=unsupported".to_string()]);
        groups
    }
}

/// Thin client over the Modrinth v2 endpoints the builder consumes.
pub struct ModrinthClient {
    client: reqwest::Client,
}

impl ModrinthClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// `GET /search` with the assembled facet groups.
    pub async fn search(&self, params: &SearchParams) -> BuilderResult<SearchResults> {
        let facets = serde_json::to_string(&params.facet_groups())?;
        let limit = if params.limit == 0 { 20 } else { params.limit };
        let limit = limit.to_string();
        let offset = params.offset.to_string();

        debug!("Searching projects: query={:?} facets={}", params.query, facets);

        let results = self
            .client
            .get(format!("{}/search", MODRINTH_API_BASE))
            .query(&[
                ("query", params.query.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("facets", facets.as_str()),
            ])
            .send()
            .await?
            .json::<SearchResults>()
            .await?;

        Ok(results)
    }

    /// `GET /projects?ids=[...]` bulk project lookup.
    pub async fn projects(&self, project_ids: &[String]) -> BuilderResult<Vec<Project>> {
        let ids = serde_json::to_string(project_ids)?;
        let projects = self
            .client
            .get(format!("{}/projects", MODRINTH_API_BASE))
            .query(&[("ids", ids.as_str())])
            .send()
            .await?
            .json::<Vec<Project>>()
            .await?;
        Ok(projects)
    }

    /// `GET /project/{id}/version`: all published versions of a project.
    pub async fn project_versions(&self, project_id: &str) -> BuilderResult<Vec<ProjectVersion>> {
        let versions = self
            .client
            .get(format!("{}/project/{}/version", MODRINTH_API_BASE, project_id))
            .send()
            .await?
            .json::<Vec<ProjectVersion>>()
            .await?;
        Ok(versions)
    }

    /// `GET /tag/category`.
    pub async fn categories(&self) -> BuilderResult<Vec<Category>> {
        let categories = self
            .client
            .get(format!("{}/tag/category", MODRINTH_API_BASE))
            .send()
            .await?
            .json::<Vec<Category>>()
            .await?;
        Ok(categories)
    }

    /// `GET /tag/game_version`, filtered by release channel.
    pub async fn game_versions(
        &self,
        include_snapshots: bool,
        include_beta: bool,
        include_alpha: bool,
    ) -> BuilderResult<Vec<String>> {
        let all = self
            .client
            .get(format!("{}/tag/game_version", MODRINTH_API_BASE))
            .send()
            .await?
            .json::<Vec<GameVersionTag>>()
            .await?;

        Ok(all
            .into_iter()
            .filter(|v| match v.version_type.as_str() {
                "release" => true,
                "snapshot" => include_snapshots,
                "beta" => include_beta,
                "alpha" => include_alpha,
                _ => false,
            })
            .map(|v| v.version)
            .collect())
    }

    /// `GET /tag/loader`, keeping only loaders that can host a modpack or
    /// datapack selection.
    pub async fn loaders(&self) -> BuilderResult<Vec<LoaderTag>> {
        let loaders = self
            .client
            .get(format!("{}/tag/loader", MODRINTH_API_BASE))
            .send()
            .await?
            .json::<Vec<LoaderTag>>()
            .await?;

        Ok(loaders
            .into_iter()
            .filter(|l| {
                l.supported_project_types
                    .iter()
                    .any(|t| t == "modpack" || t == "datapack")
            })
            .collect())
    }

    /// Find Geyser + Floodgate versions compatible with the chosen game
    /// version and loader, for optional Bedrock crossplay bundling.
    pub async fn companion_versions(
        &self,
        game_version: &str,
        loader: &str,
    ) -> BuilderResult<Vec<ProjectVersion>> {
        let mut compatible = Vec::new();
        for project_id in [GEYSER_PROJECT_ID, FLOODGATE_PROJECT_ID] {
            let versions = self.project_versions(project_id).await?;
            if let Some(version) = versions.into_iter().find(|v| {
                v.game_versions.iter().any(|g| g == game_version)
                    && v.loaders.iter().any(|l| l == loader)
            }) {
                compatible.push(version);
            }
        }
        info!(
            "Resolved {} companion version(s) for {} / {}",
            compatible.len(),
            game_version,
            loader
        );
        Ok(compatible)
    }
}
