use crate::core::api::ProjectVersion;
use crate::core::state::Selection;

use super::Compatibility;

/// Compute the game versions the whole selection can agree on.
///
/// Priority: a pinned version narrows the set to exactly that version; an
/// instance narrows it to the instance's supported list; otherwise the
/// per-group intersections of mods and datapacks are intersected with each
/// other (or unioned, when one group resolves to nothing, so the non-empty
/// group still constrains the result).
pub fn resolve_versions(selection: &Selection) -> Compatibility {
    let mut incompatible = false;
    let mut error_message = String::new();
    let mut incompatible_items: Vec<ProjectVersion> = Vec::new();
    let mut common_set: Vec<String> = Vec::new();

    let instance_versions: &[String] = selection
        .instance
        .as_ref()
        .map(|i| i.game_versions.as_slice())
        .unwrap_or(&[]);

    if let Some(pinned) = &selection.pinned_version {
        common_set.push(pinned.clone());

        if let Some(instance) = &selection.instance {
            if !instance_versions.contains(pinned) {
                incompatible = true;
                error_message = format!("Incompatible versions: Instance must support {}", pinned);
                incompatible_items.push(instance.clone());
            }
        }

        // The instance check takes priority: once it fails the
        // mod/datapack scan is skipped entirely.
        if !incompatible {
            let failing: Vec<ProjectVersion> = selection
                .datapacks
                .iter()
                .chain(selection.mods.iter())
                .filter(|v| !v.game_versions.contains(pinned))
                .cloned()
                .collect();

            if !failing.is_empty() {
                incompatible = true;
                error_message = format!(
                    "Incompatible versions: All selected datapacks and mods and instance must support {}",
                    pinned
                );
                incompatible_items.extend(failing);
            }
        }
    } else if selection.instance.is_some() {
        common_set.extend(instance_versions.iter().cloned());

        let failing: Vec<ProjectVersion> = selection
            .datapacks
            .iter()
            .chain(selection.mods.iter())
            .filter(|v| !v.game_versions.iter().any(|g| instance_versions.contains(g)))
            .cloned()
            .collect();

        if !failing.is_empty() {
            incompatible = true;
            error_message =
                "Incompatible versions: No common game version between selected datapacks, mods and instance."
                    .to_string();
            incompatible_items.extend(failing);
        }
    } else {
        let common_datapack_versions = intersect_supported(&selection.datapacks);
        let common_mod_versions = intersect_supported(&selection.mods);

        // When one group has nothing in common (usually because it is
        // empty), the union keeps the other group's intersection as the
        // comparison baseline instead of collapsing to the empty set.
        let baseline: Vec<String> =
            if common_datapack_versions.is_empty() || common_mod_versions.is_empty() {
                common_datapack_versions
                    .iter()
                    .chain(common_mod_versions.iter())
                    .cloned()
                    .collect()
            } else {
                common_datapack_versions
                    .iter()
                    .filter(|v| common_mod_versions.contains(v))
                    .cloned()
                    .collect()
            };

        let failing: Vec<ProjectVersion> = selection
            .datapacks
            .iter()
            .chain(selection.mods.iter())
            .filter(|v| !v.game_versions.iter().any(|g| baseline.contains(g)))
            .cloned()
            .collect();

        if !failing.is_empty() {
            incompatible = true;
            error_message =
                "Incompatible versions: No common game version between selected datapacks and mods."
                    .to_string();
            incompatible_items.extend(failing);
        }

        common_set.extend(baseline);
    }

    Compatibility {
        incompatible,
        error_message,
        incompatible_items,
        common_set,
    }
}

/// Set-intersection of `game_versions` across the group, keeping the first
/// member's ordering. Empty group -> empty intersection.
fn intersect_supported(group: &[ProjectVersion]) -> Vec<String> {
    let mut members = group.iter();
    let Some(first) = members.next() else {
        return Vec::new();
    };
    members.fold(first.game_versions.clone(), |acc, member| {
        acc.into_iter()
            .filter(|v| member.game_versions.contains(v))
            .collect()
    })
}
