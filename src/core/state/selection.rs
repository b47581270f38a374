use serde::{Deserialize, Serialize};

use crate::core::api::ProjectVersion;

/// The user's current picks. The compatibility resolvers only ever read
/// this; mutation happens through the methods below so callers cannot end
/// up with duplicate ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub pinned_version: Option<String>,
    #[serde(default)]
    pub pinned_loader: Option<String>,
    /// At most one modpack / datapack-collection version as the base
    /// environment.
    #[serde(default)]
    pub instance: Option<ProjectVersion>,
    #[serde(default)]
    pub mods: Vec<ProjectVersion>,
    #[serde(default)]
    pub datapacks: Vec<ProjectVersion>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
            && self.mods.is_empty()
            && self.datapacks.is_empty()
            && self.pinned_version.is_none()
            && self.pinned_loader.is_none()
    }

    pub fn set_instance(&mut self, instance: Option<ProjectVersion>) {
        self.instance = instance;
    }

    /// Add a mod version, replacing any earlier pick from the same project.
    pub fn add_mod(&mut self, version: ProjectVersion) {
        self.mods.retain(|m| m.project_id != version.project_id);
        self.mods.push(version);
    }

    pub fn remove_mod(&mut self, version_id: &str) {
        self.mods.retain(|m| m.id != version_id);
    }

    /// Add a datapack version, replacing any earlier pick from the same
    /// project.
    pub fn add_datapack(&mut self, version: ProjectVersion) {
        self.datapacks.retain(|d| d.project_id != version.project_id);
        self.datapacks.push(version);
    }

    pub fn remove_datapack(&mut self, version_id: &str) {
        self.datapacks.retain(|d| d.id != version_id);
    }

    pub fn clear(&mut self) {
        *self = Selection::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(id: &str, project_id: &str) -> ProjectVersion {
        ProjectVersion {
            id: id.to_string(),
            project_id: project_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn adding_a_mod_replaces_the_same_project() {
        let mut sel = Selection::default();
        sel.add_mod(version("v1", "p1"));
        sel.add_mod(version("v2", "p1"));

        assert_eq!(sel.mods.len(), 1);
        assert_eq!(sel.mods[0].id, "v2");
    }

    #[test]
    fn removal_is_by_version_id() {
        let mut sel = Selection::default();
        sel.add_mod(version("v1", "p1"));
        sel.add_mod(version("v2", "p2"));
        sel.remove_mod("v1");

        assert_eq!(sel.mods.len(), 1);
        assert_eq!(sel.mods[0].id, "v2");

        sel.add_datapack(version("v3", "p3"));
        sel.remove_datapack("v3");
        assert!(sel.datapacks.is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let mut sel = Selection::default();
        sel.pinned_version = Some("1.20".to_string());
        sel.add_datapack(version("v1", "p1"));
        sel.clear();

        assert!(sel.is_empty());
    }
}
