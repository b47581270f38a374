use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::version::VersionTuple;

/// A parsed fact from the external gamerule change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRuleEvent {
    pub version: String,
    pub action: RuleAction,
    pub rule_name: String,
    #[serde(default)]
    pub old_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Add,
    Remove,
    Rename,
}

/// Best-known description of a rule. Not version-scoped; the history feed
/// only documents the current table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRuleMetadata {
    pub name: String,
    pub description: String,
    pub default_value: String,
    pub rule_type: String,
}

impl GameRuleMetadata {
    /// Placeholder for a rule the history mentions but the current table
    /// does not describe.
    fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: "no description".to_string(),
            default_value: "unknown".to_string(),
            rule_type: "unknown".to_string(),
        }
    }
}

/// Replay the event history up to `target` and attach metadata to every
/// rule still alive.
///
/// The history feed is noisy: names are inconsistently cased between the
/// event rows and the metadata table, so an exact-lookup miss falls back to
/// [`recover_metadata`]. That step is a best-effort heuristic, nothing
/// more; a rule it cannot place gets a stub record.
pub fn resolve_rules(
    events: &[GameRuleEvent],
    metadata: &BTreeMap<String, GameRuleMetadata>,
    target: &str,
) -> Vec<GameRuleMetadata> {
    let target_version = VersionTuple::parse(target);

    let mut ordered: Vec<&GameRuleEvent> = events
        .iter()
        .filter(|e| VersionTuple::parse(&e.version) <= target_version)
        .collect();
    ordered.sort_by(|a, b| VersionTuple::parse(&a.version).cmp(&VersionTuple::parse(&b.version)));

    // Insertion-ordered active set, so output order follows rule history.
    let mut active: Vec<String> = Vec::new();
    for event in ordered {
        match event.action {
            RuleAction::Add => {
                if !active.contains(&event.rule_name) {
                    active.push(event.rule_name.clone());
                }
            }
            RuleAction::Remove => active.retain(|name| name != &event.rule_name),
            RuleAction::Rename => {
                if let Some(old) = &event.old_name {
                    active.retain(|name| name != old);
                }
                if !active.contains(&event.rule_name) {
                    active.push(event.rule_name.clone());
                }
            }
        }
    }

    active
        .iter()
        .map(|name| match metadata.get(name) {
            Some(meta) => meta.clone(),
            None => recover_metadata(name, events, metadata, &target_version)
                .unwrap_or_else(|| GameRuleMetadata::unknown(name)),
        })
        .collect()
}

/// Fuzzy metadata lookup for a rule name the table does not list verbatim.
///
/// If any rename involving an underscored name landed strictly before the
/// target version, the table is assumed to have moved to snake_case and
/// both sides are compared under snake_case normalization (equality or
/// substring in either direction). Otherwise the symmetric camelCase
/// search runs, and a camelCase hit also rewrites the returned name to the
/// normalized form.
fn recover_metadata(
    name: &str,
    events: &[GameRuleEvent],
    metadata: &BTreeMap<String, GameRuleMetadata>,
    target_version: &VersionTuple,
) -> Option<GameRuleMetadata> {
    let snake_renames_before_target = events.iter().any(|e| {
        e.action == RuleAction::Rename
            && (e.rule_name.contains('_')
                || e.old_name.as_deref().is_some_and(|old| old.contains('_')))
            && VersionTuple::parse(&e.version) < *target_version
    });

    if snake_renames_before_target {
        let normalized = to_snake_case(name);
        for (meta_name, meta) in metadata {
            let candidate = to_snake_case(meta_name);
            if normalized == candidate
                || normalized.contains(&candidate)
                || candidate.contains(&normalized)
            {
                return Some(meta.clone());
            }
        }
    } else {
        let normalized = to_camel_case(name);
        for (meta_name, meta) in metadata {
            let candidate = to_camel_case(meta_name);
            if normalized == candidate
                || normalized.contains(&candidate)
                || candidate.contains(&normalized)
            {
                let mut found = meta.clone();
                found.name = normalized;
                return Some(found);
            }
        }
    }

    None
}

/// `doFireTick` -> `do_fire_tick`.
fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_lower = false;
    for c in s.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// `do_fire_tick` -> `doFireTick`. Underscores not followed by a lowercase
/// letter are simply dropped.
fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next && c.is_ascii_lowercase() {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(version: &str, action: RuleAction, rule_name: &str) -> GameRuleEvent {
        GameRuleEvent {
            version: version.to_string(),
            action,
            rule_name: rule_name.to_string(),
            old_name: None,
        }
    }

    fn rename(version: &str, old_name: &str, rule_name: &str) -> GameRuleEvent {
        GameRuleEvent {
            version: version.to_string(),
            action: RuleAction::Rename,
            rule_name: rule_name.to_string(),
            old_name: Some(old_name.to_string()),
        }
    }

    fn meta(name: &str) -> GameRuleMetadata {
        GameRuleMetadata {
            name: name.to_string(),
            description: format!("{} description", name),
            default_value: "true".to_string(),
            rule_type: "bool".to_string(),
        }
    }

    fn metadata_for(names: &[&str]) -> BTreeMap<String, GameRuleMetadata> {
        names
            .iter()
            .map(|n| (n.to_string(), meta(n)))
            .collect()
    }

    #[test]
    fn rule_is_active_between_add_and_remove() {
        let events = vec![
            event("1.8", RuleAction::Add, "doFireTick"),
            event("1.19", RuleAction::Remove, "doFireTick"),
        ];
        let metadata = metadata_for(&["doFireTick"]);

        let at_1_10 = resolve_rules(&events, &metadata, "1.10");
        assert!(at_1_10.iter().any(|r| r.name == "doFireTick"));

        let at_1_20 = resolve_rules(&events, &metadata, "1.20");
        assert!(!at_1_20.iter().any(|r| r.name == "doFireTick"));
    }

    #[test]
    fn events_replay_in_version_order_regardless_of_input_order() {
        // Remove listed before the add that precedes it in version order.
        let events = vec![
            event("1.19", RuleAction::Remove, "doFireTick"),
            event("1.8", RuleAction::Add, "doFireTick"),
        ];
        let metadata = metadata_for(&["doFireTick"]);

        let rules = resolve_rules(&events, &metadata, "1.20");
        assert!(rules.is_empty());
    }

    #[test]
    fn rename_swaps_the_active_name() {
        let events = vec![
            event("1.4.2", RuleAction::Add, "doFireTick"),
            rename("1.21.11", "doFireTick", "fire_tick"),
        ];
        let metadata = metadata_for(&["doFireTick", "fire_tick"]);

        let rules = resolve_rules(&events, &metadata, "1.21.11");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "fire_tick");

        let before = resolve_rules(&events, &metadata, "1.21.10");
        assert_eq!(before[0].name, "doFireTick");
    }

    #[test]
    fn snake_case_recovery_after_underscored_renames() {
        let events = vec![
            event("1.4.2", RuleAction::Add, "doFireTick"),
            event("1.4.2", RuleAction::Add, "doDaylightCycle"),
            rename("1.21.11", "doDaylightCycle", "daylight_cycle"),
            rename("1.21.11", "doFireTick", "fire_tick"),
        ];
        // The table only knows the old camelCase spellings.
        let metadata = metadata_for(&["doDaylightCycle", "doFireTick"]);

        let rules = resolve_rules(&events, &metadata, "1.21.12");
        assert_eq!(rules.len(), 2);
        // Both renamed rules matched their table rows through snake
        // normalization; the table spelling is kept.
        assert_eq!(rules[0].description, "doDaylightCycle description");
        assert_eq!(rules[1].description, "doFireTick description");
    }

    #[test]
    fn camel_case_recovery_rewrites_the_name() {
        let events = vec![event("1.8", RuleAction::Add, "do_mob_loot")];
        let metadata = metadata_for(&["doMobLoot"]);

        let rules = resolve_rules(&events, &metadata, "1.10");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "doMobLoot");
        assert_eq!(rules[0].description, "doMobLoot description");
    }

    #[test]
    fn unmatched_rule_gets_a_stub() {
        let events = vec![event("1.8", RuleAction::Add, "mysteryRule")];
        let metadata = metadata_for(&["doFireTick"]);

        let rules = resolve_rules(&events, &metadata, "1.10");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "mysteryRule");
        assert_eq!(rules[0].description, "no description");
        assert_eq!(rules[0].default_value, "unknown");
    }

    #[test]
    fn snake_case_normalization() {
        assert_eq!(to_snake_case("doFireTick"), "do_fire_tick");
        assert_eq!(to_snake_case("fire_tick"), "fire_tick");
    }

    #[test]
    fn camel_case_normalization() {
        assert_eq!(to_camel_case("do_fire_tick"), "doFireTick");
        assert_eq!(to_camel_case("doFireTick"), "doFireTick");
    }
}
