// ─── Compatibility ───
// Pure resolvers over the user's selection: which game versions and which
// loaders the whole pick-set can agree on, and who is to blame when none.

pub mod loader;
pub mod version;

#[allow(unused_imports)]
pub use loader::resolve_loaders;
#[allow(unused_imports)]
pub use version::resolve_versions;

use crate::core::api::ProjectVersion;

/// Outcome shared by both resolvers.
///
/// An incompatibility is a computed state, never an error: callers disable
/// the build action and show `error_message` next to the offending items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compatibility {
    pub incompatible: bool,
    pub error_message: String,
    pub incompatible_items: Vec<ProjectVersion>,
    /// Game versions (version resolver) or loader ids (loader resolver)
    /// the selection has in common. On a loader conflict this holds the
    /// best-effort plurality suggestion instead, while `incompatible`
    /// stays true.
    pub common_set: Vec<String>,
}
