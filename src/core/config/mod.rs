// ─── Server Configuration ───
// Version-aware synthesis of everything that ends up next to the jar:
// `server.properties`, the live gamerule set, and the startup script.

pub mod gamerules;
pub mod properties;
pub mod startup;

#[allow(unused_imports)]
pub use gamerules::{resolve_rules, GameRuleEvent, GameRuleMetadata, RuleAction};
#[allow(unused_imports)]
pub use properties::{
    base_properties, generate_properties, synthesize_properties, PropertyValue, VersionDiff,
};
#[allow(unused_imports)]
pub use startup::{aikar_flags, java_major_for, startup_script};
