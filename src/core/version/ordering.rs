// ─── Version Ordering ───
// Total order over dot-separated numeric game versions. Every other engine
// (property diffs, gamerule history, compatibility) leans on this.

use std::cmp::Ordering;
use std::fmt;

/// A parsed dotted version such as `1.20.4`.
///
/// Missing trailing components compare as zero, so `1.2` equals `1.2.0`.
/// Non-numeric components (snapshots, pre-releases) parse as zero rather
/// than failing; the content APIs only hand us release-style strings here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTuple(Vec<u32>);

impl VersionTuple {
    pub fn parse(version: &str) -> Self {
        Self(
            version
                .split('.')
                .map(|part| part.trim().parse::<u32>().unwrap_or(0))
                .collect(),
        )
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl Ord for VersionTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Compare two dotted version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    VersionTuple::parse(a).cmp(&VersionTuple::parse(b))
}
