use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::version::VersionTuple;

/// A `server.properties` value. The wiki only ever documents strings,
/// integers and booleans, so the schema is a closed union instead of raw
/// strings with presence checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PropertyValue {
    /// Runtime type equality, ignoring the value itself. Carried-over user
    /// overrides must pass this check or be dropped.
    pub fn same_type(&self, other: &PropertyValue) -> bool {
        matches!(
            (self, other),
            (PropertyValue::Bool(_), PropertyValue::Bool(_))
                | (PropertyValue::Int(_), PropertyValue::Int(_))
                | (PropertyValue::Str(_), PropertyValue::Str(_))
        )
    }

    /// Render for a `key=value` properties line.
    pub fn to_property_string(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

/// One schema change between game versions: keys added (or retyped) and
/// keys removed, applied on top of everything before it.
#[derive(Debug, Clone)]
pub struct VersionDiff {
    pub version: &'static str,
    pub additions: Vec<(&'static str, PropertyValue)>,
    pub removals: &'static [&'static str],
    pub notes: Option<&'static str>,
}

/// The oldest property set the wiki documents (1.2). Every later version
/// is reconstructed by replaying [`version_history`] on top of this.
pub fn base_properties() -> BTreeMap<String, PropertyValue> {
    let entries: [(&str, PropertyValue); 23] = [
        ("allow-flight", false.into()),
        ("allow-nether", true.into()),
        ("difficulty", 1.into()),
        ("enable-query", false.into()),
        ("enable-rcon", false.into()),
        ("gamemode", 0.into()),
        ("generate-structures", true.into()),
        ("level-name", "world".into()),
        ("level-seed", "".into()),
        ("level-type", "DEFAULT".into()),
        ("max-players", 20.into()),
        ("motd", "A Minecraft Server".into()),
        ("online-mode", true.into()),
        ("op-permission-level", 4.into()),
        ("pvp", true.into()),
        ("resource-pack", "".into()),
        ("server-ip", "".into()),
        ("server-port", 25565.into()),
        ("spawn-animals", true.into()),
        ("spawn-monsters", true.into()),
        ("spawn-npcs", true.into()),
        ("view-distance", 10.into()),
        ("white-list", false.into()),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Ordered property-set diffs per game version, transcribed from the wiki's
/// change history. Insertion order happens to be ascending but the
/// synthesizer sorts anyway.
pub fn version_history() -> Vec<VersionDiff> {
    vec![
        VersionDiff {
            version: "1.2.1",
            additions: vec![("max-build-height", 256.into())],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.3.1",
            additions: vec![("snooper-enabled", true.into())],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.4.2",
            additions: vec![
                ("spawn-protection", 16.into()),
                ("enable-command-block", false.into()),
            ],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.8",
            additions: vec![
                ("generator-settings", "".into()),
                ("network-compression-threshold", 256.into()),
                ("max-tick-time", 60000.into()),
            ],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.11",
            additions: vec![("prevent-proxy-connections", false.into())],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.12",
            additions: vec![("enforce-whitelist", false.into())],
            removals: &["announce-player-achievements"],
            notes: None,
        },
        VersionDiff {
            version: "1.14",
            additions: vec![
                ("difficulty", "easy".into()),
                ("gamemode", "survival".into()),
                ("function-permission-level", 2.into()),
                ("broadcast-rcon-to-ops", true.into()),
                ("broadcast-console-to-ops", true.into()),
            ],
            removals: &[],
            notes: Some("Difficulty and Gamemode switched from integers to strings."),
        },
        VersionDiff {
            version: "1.15",
            additions: vec![
                ("enable-status", true.into()),
                ("sync-chunk-writes", true.into()),
            ],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.16",
            additions: vec![
                ("entity-broadcast-range-percentage", 100.into()),
                ("enable-jmx-monitoring", false.into()),
                ("text-filtering-config", "".into()),
            ],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.17",
            additions: vec![
                ("require-resource-pack", false.into()),
                ("resource-pack-prompt", "".into()),
            ],
            removals: &["max-build-height"],
            notes: None,
        },
        VersionDiff {
            version: "1.18",
            additions: vec![
                ("simulation-distance", 10.into()),
                ("hide-online-players", false.into()),
            ],
            removals: &["snooper-enabled"],
            notes: None,
        },
        VersionDiff {
            version: "1.19",
            additions: vec![
                ("enforce-secure-profile", true.into()),
                ("max-chained-neighbor-updates", 1000000.into()),
            ],
            removals: &[],
            notes: None,
        },
        VersionDiff {
            version: "1.20",
            additions: vec![("log-ips", true.into()), ("resource-pack-id", "".into())],
            removals: &[],
            notes: Some("File encoding switched to UTF-8 natively."),
        },
        VersionDiff {
            version: "1.21.2",
            additions: vec![("pause-when-empty-seconds", 60.into())],
            removals: &["spawn-animals", "spawn-npcs"],
            notes: None,
        },
        VersionDiff {
            version: "1.21.9",
            additions: vec![
                ("management-server-enabled", false.into()),
                ("management-server-host", "localhost".into()),
                ("management-server-port", 0.into()),
                ("management-server-secret", "".into()),
                ("enable-code-of-conduct", false.into()),
                ("bug-report-link", "".into()),
            ],
            removals: &["allow-nether", "enable-command-block", "pvp", "spawn-monsters"],
            notes: Some("Major management overhaul and cleanup of legacy toggles."),
        },
    ]
}

/// Rebuild the exact property set for `target`, optionally carrying over
/// values from a prior profile.
///
/// Every diff with a version <= target is replayed in ascending order:
/// additions override, then that diff's removals delete. A target below
/// all diffs returns the base map untouched. Prior values survive only
/// when their runtime type still matches the synthesized default for that
/// key, which silently drops overrides whose type changed across a schema
/// version (e.g. the 1.14 integer difficulty).
pub fn synthesize_properties(
    target: &str,
    prior: Option<&BTreeMap<String, PropertyValue>>,
) -> BTreeMap<String, PropertyValue> {
    let mut props = base_properties();
    let target_version = VersionTuple::parse(target);

    let mut applicable: Vec<VersionDiff> = version_history()
        .into_iter()
        .filter(|diff| VersionTuple::parse(diff.version) <= target_version)
        .collect();

    if applicable.is_empty() {
        return props;
    }
    applicable.sort_by(|a, b| VersionTuple::parse(a.version).cmp(&VersionTuple::parse(b.version)));

    for diff in &applicable {
        for (key, value) in &diff.additions {
            props.insert(key.to_string(), value.clone());
        }
        for key in diff.removals {
            props.remove(*key);
        }
    }

    if let Some(prior) = prior {
        for (key, value) in prior {
            if let Some(default) = props.get(key) {
                if default.same_type(value) {
                    props.insert(key.clone(), value.clone());
                }
            }
        }
    }

    props
}

/// Serialize to the line-oriented `key=value` file format.
pub fn generate_properties(props: &BTreeMap<String, PropertyValue>) -> String {
    let mut out = String::new();
    for (key, value) in props {
        out.push_str(key);
        out.push('=');
        out.push_str(&value.to_property_string());
        out.push('\n');
    }
    out
}
