use crate::config::{CatalogFileConfig, ItemConfig};
use crate::spell::{ItemDef, SpellDef};
use crate::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Catalog of spell and item definitions, loaded from TOML files
#[derive(Debug, Default)]
pub struct SpellCatalog {
    spells: HashMap<String, SpellDef>,
    items: HashMap<String, ItemDef>,
}

impl SpellCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all catalog files from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        let mut pending = Vec::new();
        catalog.load_dir(dir, &mut pending)?;
        catalog.resolve_items(pending)?;
        Ok(catalog)
    }

    /// Parse a single catalog from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let path = PathBuf::from("<inline>");
        let config: CatalogFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.clone(),
        })?;

        let mut catalog = Self::new();
        let mut pending = Vec::new();
        catalog.add_config(config, &path, &mut pending)?;
        catalog.resolve_items(pending)?;
        Ok(catalog)
    }

    fn load_dir(
        &mut self,
        dir: &Path,
        pending: &mut Vec<(ItemConfig, PathBuf)>,
    ) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            let path = entry.path();

            if path.is_dir() {
                self.load_dir(&path, pending)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path, pending)?;
            }
        }

        Ok(())
    }

    fn load_file(
        &mut self,
        path: &Path,
        pending: &mut Vec<(ItemConfig, PathBuf)>,
    ) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let config: CatalogFileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                error: e,
                path: path.to_path_buf(),
            })?;

        self.add_config(config, path, pending)
    }

    fn add_config(
        &mut self,
        config: CatalogFileConfig,
        path: &Path,
        pending: &mut Vec<(ItemConfig, PathBuf)>,
    ) -> Result<(), ConfigError> {
        for spell in config.spells {
            if let Some(status) = &spell.status {
                if status.chance > 100 {
                    return Err(ConfigError::Validation {
                        message: format!(
                            "spell '{}' has status chance {} (must be 0-100)",
                            spell.name, status.chance
                        ),
                        path: path.to_path_buf(),
                    });
                }
            }
            if self.spells.contains_key(&spell.name) {
                return Err(ConfigError::Validation {
                    message: format!("duplicate spell '{}'", spell.name),
                    path: path.to_path_buf(),
                });
            }
            self.spells.insert(spell.name.clone(), spell);
        }

        pending.extend(config.items.into_iter().map(|i| (i, path.to_path_buf())));
        Ok(())
    }

    /// Items may reference spells defined in any file, so they resolve last
    fn resolve_items(&mut self, pending: Vec<(ItemConfig, PathBuf)>) -> Result<(), ConfigError> {
        for (item, path) in pending {
            let spell = self
                .spells
                .get(&item.spell)
                .cloned()
                .ok_or_else(|| ConfigError::Validation {
                    message: format!("item '{}' references unknown spell '{}'", item.name, item.spell),
                    path: path.clone(),
                })?;
            if self.items.contains_key(&item.name) {
                return Err(ConfigError::Validation {
                    message: format!("duplicate item '{}'", item.name),
                    path,
                });
            }
            self.items
                .insert(item.name.clone(), ItemDef::new(item.name, spell, item.charges));
        }
        Ok(())
    }

    /// Get a spell by name
    pub fn spell(&self, name: &str) -> Option<&SpellDef> {
        self.spells.get(name)
    }

    /// Get an item by name
    pub fn item(&self, name: &str) -> Option<&ItemDef> {
        self.items.get(name)
    }

    /// List all spell names
    pub fn spell_names(&self) -> impl Iterator<Item = &str> {
        self.spells.keys().map(|s| s.as_str())
    }

    pub fn spell_count(&self) -> usize {
        self.spells.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
