use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::config::properties::{base_properties, synthesize_properties, PropertyValue};
use crate::core::config::startup::startup_script;

/// A user-authored gamerule override destined for the generated world
/// datapack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameruleEntry {
    pub name: String,
    pub value: String,
}

/// Everything the user configured about the server itself, independent of
/// which content they selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub eula: bool,
    pub chosen_version: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub gamerules: Vec<GameruleEntry>,
    pub start_script: String,
    pub ram_mb: u32,
    pub aikar_flags: bool,
    pub include_geyser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            eula: false,
            chosen_version: String::new(),
            properties: base_properties(),
            gamerules: Vec::new(),
            start_script: String::new(),
            ram_mb: 4096,
            aikar_flags: true,
            include_geyser: false,
        }
    }
}

impl ServerConfig {
    /// Change the target game version: re-synthesize the property set for
    /// it (keeping type-compatible overrides) and refresh the startup
    /// script.
    pub fn set_chosen_version(&mut self, version: &str) {
        self.chosen_version = version.to_string();
        self.retarget_properties();
        self.refresh_start_script();
    }

    /// Rebuild `properties` for the current target version, carrying over
    /// user values where the type still matches.
    pub fn retarget_properties(&mut self) {
        self.properties = synthesize_properties(&self.chosen_version, Some(&self.properties));
    }

    pub fn set_ram_mb(&mut self, ram_mb: u32) {
        self.ram_mb = ram_mb;
        self.refresh_start_script();
    }

    pub fn set_aikar_flags(&mut self, enabled: bool) {
        self.aikar_flags = enabled;
        self.refresh_start_script();
    }

    pub fn refresh_start_script(&mut self) {
        self.start_script = startup_script(&self.chosen_version, self.ram_mb, self.aikar_flags);
    }

    pub fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
    }

    /// Insert or replace the override with the same rule name.
    pub fn add_gamerule(&mut self, rule: GameruleEntry) {
        self.gamerules.retain(|r| r.name != rule.name);
        self.gamerules.push(rule);
    }

    pub fn remove_gamerule(&mut self, name: &str) {
        self.gamerules.retain(|r| r.name != name);
    }

    pub fn update_gamerule(&mut self, name: &str, value: &str) {
        for rule in &mut self.gamerules {
            if rule.name == name {
                rule.value = value.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_carries_the_base_schema() {
        let config = ServerConfig::default();
        assert!(!config.eula);
        assert_eq!(config.ram_mb, 4096);
        assert!(config.aikar_flags);
        assert_eq!(config.properties, base_properties());
    }

    #[test]
    fn choosing_a_version_retargets_properties_and_script() {
        let mut config = ServerConfig::default();
        config.set_property("max-players", PropertyValue::Int(50));
        config.set_chosen_version("1.14");

        assert_eq!(
            config.properties.get("difficulty"),
            Some(&PropertyValue::Str("easy".into()))
        );
        // Type-compatible override survived the retarget.
        assert_eq!(
            config.properties.get("max-players"),
            Some(&PropertyValue::Int(50))
        );
        assert!(config.start_script.starts_with("#!/bin/bash"));
    }

    #[test]
    fn gamerule_add_replaces_by_name() {
        let mut config = ServerConfig::default();
        config.add_gamerule(GameruleEntry {
            name: "doFireTick".to_string(),
            value: "true".to_string(),
        });
        config.add_gamerule(GameruleEntry {
            name: "doFireTick".to_string(),
            value: "false".to_string(),
        });

        assert_eq!(config.gamerules.len(), 1);
        assert_eq!(config.gamerules[0].value, "false");
    }

    #[test]
    fn gamerule_update_touches_only_the_named_rule() {
        let mut config = ServerConfig::default();
        config.add_gamerule(GameruleEntry {
            name: "keepInventory".to_string(),
            value: "false".to_string(),
        });
        config.add_gamerule(GameruleEntry {
            name: "doFireTick".to_string(),
            value: "true".to_string(),
        });
        config.update_gamerule("keepInventory", "true");

        assert_eq!(config.gamerules[0].value, "true");
        assert_eq!(config.gamerules[1].value, "true");
        config.remove_gamerule("keepInventory");
        assert_eq!(config.gamerules.len(), 1);
        assert_eq!(config.gamerules[0].name, "doFireTick");
    }
}
