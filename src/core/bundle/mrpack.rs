// ─── Modpack Manifest ───
// Reads the `modrinth.index.json` out of an .mrpack archive so the
// pipeline can expand it into individual downloads.

use std::collections::BTreeMap;
use std::io::Cursor;

use serde::Deserialize;
use zip::result::ZipError;

use crate::core::error::{BuilderError, BuilderResult};

const INDEX_FILE_NAME: &str = "modrinth.index.json";

/// Parsed `modrinth.index.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackIndex {
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub format_version: u32,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub files: Vec<PackFile>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// One entry of the manifest, with its path relative to the server root.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackFile {
    pub path: String,
    #[serde(default)]
    pub hashes: PackFileHashes,
    #[serde(default)]
    pub env: Option<PackFileEnv>,
    #[serde(default)]
    pub downloads: Vec<String>,
    #[serde(default)]
    pub file_size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackFileHashes {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub sha512: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackFileEnv {
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub server: String,
}

/// Locate and parse the index file inside an .mrpack blob.
///
/// A pack without the index is unusable and a hard failure; a pack without
/// a name falls back to `"instance"`.
pub fn read_pack_index(data: &[u8]) -> BuilderResult<PackIndex> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let index_file = match archive.by_name(INDEX_FILE_NAME) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(BuilderError::MissingPackIndex),
        Err(e) => return Err(e.into()),
    };

    let mut index: PackIndex = serde_json::from_reader(index_file)?;
    if index.name.is_empty() {
        index.name = "instance".to_string();
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn mrpack_with(index_json: Option<&str>) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        if let Some(json) = index_json {
            writer.start_file(INDEX_FILE_NAME, options).unwrap();
            writer.write_all(json.as_bytes()).unwrap();
        }
        writer.start_file("overrides/config/some.toml", options).unwrap();
        writer.write_all(b"x = 1").unwrap();

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn parses_a_well_formed_index() {
        let json = r#"{
            "game": "minecraft",
            "formatVersion": 1,
            "versionId": "1.0.0",
            "name": "Cool Pack",
            "files": [
                {
                    "path": "mods/cool.jar",
                    "hashes": { "sha1": "abc", "sha512": "def" },
                    "env": { "client": "required", "server": "required" },
                    "downloads": ["https://cdn.example/cool.jar"],
                    "fileSize": 2048
                }
            ],
            "dependencies": { "minecraft": "1.20.1", "fabric-loader": "0.15.0" }
        }"#;

        let index = read_pack_index(&mrpack_with(Some(json))).unwrap();
        assert_eq!(index.name, "Cool Pack");
        assert_eq!(index.files.len(), 1);
        assert_eq!(index.files[0].path, "mods/cool.jar");
        assert_eq!(index.files[0].file_size, 2048);
        assert_eq!(index.files[0].hashes.sha1.as_deref(), Some("abc"));
        assert_eq!(index.dependencies.get("minecraft").unwrap(), "1.20.1");
    }

    #[test]
    fn missing_index_is_a_hard_failure() {
        let result = read_pack_index(&mrpack_with(None));
        assert!(matches!(result, Err(BuilderError::MissingPackIndex)));
    }

    #[test]
    fn nameless_pack_falls_back_to_instance() {
        let json = r#"{ "files": [] }"#;
        let index = read_pack_index(&mrpack_with(Some(json))).unwrap();
        assert_eq!(index.name, "instance");
    }

    #[test]
    fn garbage_bytes_are_an_archive_error() {
        let result = read_pack_index(b"not a zip at all");
        assert!(matches!(result, Err(BuilderError::Zip(_))));
    }
}
