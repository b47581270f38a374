use crate::core::api::ProjectVersion;
use crate::core::state::Selection;

use super::Compatibility;

/// Compute the loaders the selected mods (and instance) can agree on.
///
/// With no agreement and no instance, the resolver still flags the
/// selection incompatible but swaps `common_set` for the plurality
/// loader(s): whichever loader value(s) appear in the most mods, ties
/// kept. That is a best-effort suggestion, not a strict constraint.
pub fn resolve_loaders(selection: &Selection) -> Compatibility {
    let mut incompatible = false;
    let mut error_message = String::new();
    let mut incompatible_items: Vec<ProjectVersion> = Vec::new();
    let mut common_set: Vec<String> = Vec::new();

    let common_mod_loaders: Option<Vec<String>> = if selection.mods.is_empty() {
        None
    } else {
        Some(intersect_loaders(&selection.mods))
    };

    if let Some(instance) = &selection.instance {
        let instance_loaders = &instance.loaders;
        let failing: Vec<ProjectVersion> = selection
            .mods
            .iter()
            .filter(|m| !m.loaders.iter().any(|l| instance_loaders.contains(l)))
            .cloned()
            .collect();

        if !failing.is_empty() {
            incompatible = true;
            error_message = format!(
                "Incompatible mod loaders between mods and modpack. All mods must have one of the loaders: {}",
                instance_loaders.join(", ")
            );
            incompatible_items.extend(failing);
        }
        common_set.extend(instance_loaders.iter().cloned());
    }

    let mods_share_nothing = matches!(&common_mod_loaders, Some(shared) if shared.is_empty());
    if !incompatible && mods_share_nothing {
        // Plurality fallback: suggest the loader(s) most of the mods
        // already support and point at the mods left out by that choice.
        let mut counts: Vec<(String, usize)> = Vec::new();
        for m in &selection.mods {
            for loader in &m.loaders {
                match counts.iter_mut().find(|(name, _)| name == loader) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((loader.clone(), 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        if let Some((_, max_count)) = counts.first() {
            let max_count = *max_count;
            common_set.extend(
                counts
                    .iter()
                    .filter(|(_, count)| *count == max_count)
                    .map(|(name, _)| name.clone()),
            );

            let failing: Vec<ProjectVersion> = selection
                .mods
                .iter()
                .filter(|m| !m.loaders.iter().any(|l| common_set.contains(l)))
                .cloned()
                .collect();
            incompatible_items.extend(failing);
        }

        incompatible = true;
        error_message =
            "Incompatible mod loaders between mods selected. Please choose a compatible mod loader."
                .to_string();
    }

    if common_set.is_empty() {
        if let Some(shared) = &common_mod_loaders {
            if !shared.is_empty() {
                common_set.extend(shared.iter().cloned());
            }
        }
    }

    Compatibility {
        incompatible,
        error_message,
        incompatible_items,
        common_set,
    }
}

/// Set-intersection of `loaders` across the mods, keeping the first mod's
/// ordering.
fn intersect_loaders(mods: &[ProjectVersion]) -> Vec<String> {
    let mut members = mods.iter();
    let Some(first) = members.next() else {
        return Vec::new();
    };
    members.fold(first.loaders.clone(), |acc, member| {
        acc.into_iter()
            .filter(|l| member.loaders.contains(l))
            .collect()
    })
}
