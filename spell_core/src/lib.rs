//! spell_core - Spell, item and status definitions
//!
//! These are the read-only content definitions the combat simulation
//! consumes. They are authored and persisted elsewhere; this crate only
//! models them and loads them from TOML.

mod catalog;
mod config;
mod spell;
mod types;

pub use catalog::SpellCatalog;
pub use spell::{ItemDef, SpellDef, StatusTemplate};
pub use types::{Element, SpellType, StatusKind, UnknownStatus};

use std::path::PathBuf;
use thiserror::Error;

/// Error loading a spell catalog
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}
