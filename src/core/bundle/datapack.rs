// ─── Gamerule Datapack ───
// Generates the support datapack that applies the user's gamerule
// overrides through a `minecraft:load` function, mirrored under a
// modern-format overlay so one pack covers the whole pack-format window.

use serde::Serialize;

use crate::core::error::BuilderResult;
use crate::core::state::GameruleEntry;

use super::archive::BundleArchive;

const PACK_DESCRIPTION: &str = "Universal Gamerule Pack";
const PACK_FORMAT: u32 = 4;
const MAX_SUPPORTED_FORMAT: u32 = 94;
const MODERN_FORMAT_MIN: u32 = 48;
const MODERN_FORMAT_DIR: &str = "modern_format";

#[derive(Serialize)]
struct PackMeta {
    pack: PackInfo,
    overlays: Overlays,
}

#[derive(Serialize)]
struct PackInfo {
    description: &'static str,
    pack_format: u32,
    supported_formats: FormatRange,
    min_format: u32,
    max_format: u32,
}

#[derive(Serialize)]
struct FormatRange {
    min_inclusive: u32,
    max_inclusive: u32,
}

#[derive(Serialize)]
struct Overlays {
    entries: Vec<OverlayEntry>,
}

#[derive(Serialize)]
struct OverlayEntry {
    directory: &'static str,
    formats: FormatRange,
}

#[derive(Serialize)]
struct FunctionTag {
    values: Vec<&'static str>,
}

fn pack_meta() -> PackMeta {
    PackMeta {
        pack: PackInfo {
            description: PACK_DESCRIPTION,
            pack_format: PACK_FORMAT,
            supported_formats: FormatRange {
                min_inclusive: PACK_FORMAT,
                max_inclusive: MAX_SUPPORTED_FORMAT,
            },
            min_format: PACK_FORMAT,
            max_format: MAX_SUPPORTED_FORMAT,
        },
        overlays: Overlays {
            entries: vec![OverlayEntry {
                directory: MODERN_FORMAT_DIR,
                formats: FormatRange {
                    min_inclusive: MODERN_FORMAT_MIN,
                    max_inclusive: MAX_SUPPORTED_FORMAT,
                },
            }],
        },
    }
}

/// Build `gamerules.zip`: one `gamerule <name> <value>` line per entry in
/// a load function, wired into the `minecraft:load` tag, duplicated under
/// the legacy and modern directory layouts.
pub fn gamerule_datapack(gamerules: &[GameruleEntry]) -> BuilderResult<Vec<u8>> {
    let mut archive = BundleArchive::new();

    archive.add_root("pack.mcmeta", serde_json::to_vec(&pack_meta())?);

    let function: String = gamerules
        .iter()
        .map(|rule| format!("gamerule {} {}", rule.name, rule.value))
        .collect::<Vec<_>>()
        .join("\n");
    let tag = serde_json::to_vec_pretty(&FunctionTag {
        values: vec!["gamerule_pack:load"],
    })?;

    archive.add_root(
        "data/gamerule_pack/function/load.mcfunction",
        function.clone().into_bytes(),
    );
    archive.add_root("data/minecraft/tags/functions/load.json", tag.clone());

    // The modern overlay swaps the function/functions directory names.
    archive.add_root(
        "modern_format/data/gamerule_pack/functions/load.mcfunction",
        function.into_bytes(),
    );
    archive.add_root("modern_format/data/minecraft/tags/function/load.json", tag);

    archive.compress(|_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn rule(name: &str, value: &str) -> GameruleEntry {
        GameruleEntry {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn read_entry(blob: &[u8], path: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(blob)).unwrap();
        let mut file = archive.by_name(path).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn load_function_lists_one_line_per_rule() {
        let blob = gamerule_datapack(&[
            rule("keepInventory", "true"),
            rule("doFireTick", "false"),
        ])
        .unwrap();

        let function = read_entry(&blob, "data/gamerule_pack/function/load.mcfunction");
        assert_eq!(function, "gamerule keepInventory true\ngamerule doFireTick false");

        // Overlay mirrors the same function content.
        let overlay = read_entry(
            &blob,
            "modern_format/data/gamerule_pack/functions/load.mcfunction",
        );
        assert_eq!(overlay, function);
    }

    #[test]
    fn pack_meta_declares_format_window_and_overlay() {
        let blob = gamerule_datapack(&[rule("keepInventory", "true")]).unwrap();
        let meta: serde_json::Value =
            serde_json::from_str(&read_entry(&blob, "pack.mcmeta")).unwrap();

        assert_eq!(meta["pack"]["pack_format"], 4);
        assert_eq!(meta["pack"]["supported_formats"]["max_inclusive"], 94);
        assert_eq!(meta["overlays"]["entries"][0]["directory"], "modern_format");
        assert_eq!(meta["overlays"]["entries"][0]["formats"]["min_inclusive"], 48);
    }

    #[test]
    fn load_tag_points_at_the_pack_function() {
        let blob = gamerule_datapack(&[rule("keepInventory", "true")]).unwrap();
        let tag: serde_json::Value =
            serde_json::from_str(&read_entry(&blob, "data/minecraft/tags/functions/load.json"))
                .unwrap();
        assert_eq!(tag["values"][0], "gamerule_pack:load");
    }
}
