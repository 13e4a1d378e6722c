use crate::spell::SpellDef;
use serde::Deserialize;

/// TOML configuration for a spell catalog file
#[derive(Debug, Deserialize)]
pub struct CatalogFileConfig {
    #[serde(default)]
    pub spells: Vec<SpellDef>,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// Configuration for an enchanted item
#[derive(Debug, Deserialize)]
pub struct ItemConfig {
    pub name: String,
    /// Name of the spell the item casts
    pub spell: String,
    #[serde(default = "default_charges")]
    pub charges: u32,
}

fn default_charges() -> u32 {
    1
}
