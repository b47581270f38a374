// ─── Build Index ───
// Handles fetching server-jar builds from the mcjars build index.

use serde::Deserialize;
use tracing::info;

use crate::core::error::{BuilderError, BuilderResult};

const MCJARS_API_BASE: &str = "https://versions.mcjars.app/api/v2";

/// Response of `GET /builds/{TYPE}/{version}`.
#[derive(Debug, Deserialize)]
pub struct BuildsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub builds: Vec<BuildRecord>,
}

/// A single published build for a loader + game version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub build_number: Option<i64>,
    #[serde(default)]
    pub experimental: bool,
    pub jar_url: Option<String>,
    pub jar_size: Option<u64>,
}

/// The concrete jar the pipeline will bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerJarInfo {
    pub jar_url: String,
    pub build_id: i64,
    pub jar_size: Option<u64>,
}

/// Resolve the newest build for `loader` + `version`.
///
/// The index keys builds by upper-cased loader name; the first entry is the
/// latest. A missing build list or a null `jarUrl` means there is nothing
/// to serve for this combination.
pub async fn fetch_server_jar(
    client: &reqwest::Client,
    loader_name: &str,
    version: &str,
) -> BuilderResult<ServerJarInfo> {
    let url = format!(
        "{}/builds/{}/{}",
        MCJARS_API_BASE,
        loader_name.to_uppercase(),
        version
    );
    info!("Fetching server jar build for {} {}", loader_name, version);

    let response: BuildsResponse = client.get(&url).send().await?.json().await?;

    let build = response.builds.into_iter().next();
    match build.and_then(|b| b.jar_url.clone().map(|jar_url| (b, jar_url))) {
        Some((build, jar_url)) => Ok(ServerJarInfo {
            jar_url,
            build_id: build.id,
            jar_size: build.jar_size,
        }),
        None => Err(BuilderError::NoServerJar {
            loader: loader_name.to_string(),
            version: version.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_build_record() {
        let json = r#"{
            "success": true,
            "builds": [
                { "id": 42, "name": "1.21.1", "buildNumber": 7, "experimental": false,
                  "jarUrl": "https://example.com/server.jar", "jarSize": 123456 }
            ]
        }"#;
        let parsed: BuildsResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.builds[0].id, 42);
        assert_eq!(
            parsed.builds[0].jar_url.as_deref(),
            Some("https://example.com/server.jar")
        );
        assert_eq!(parsed.builds[0].jar_size, Some(123456));
    }

    #[test]
    fn deserialize_build_without_jar() {
        let json = r#"{ "success": true, "builds": [ { "id": 1, "jarUrl": null, "jarSize": null } ] }"#;
        let parsed: BuildsResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.builds[0].jar_url.is_none());
    }
}
