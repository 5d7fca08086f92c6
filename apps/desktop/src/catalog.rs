//! Module catalog read from a content directory.
//!
//! Layout: `<root>/<language>/modules.json` lists the modules and each
//! module's data lives next to it as `<id>.json`. When no per-language
//! directory exists the catalog falls back to `<root>` itself.

use drill_core::{parse_module_data, parse_module_list, DrillError, ModuleContent, ModuleMeta};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MODULE_LIST_FILE: &str = "modules.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("module not available: {id}")]
    ModuleUnavailable { id: String },

    #[error("invalid content: {0}")]
    Content(#[from] DrillError),
}

type Result<T> = std::result::Result<T, CatalogError>;

/// Directory-backed catalog for one language.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    language: String,
    modules: Vec<ModuleMeta>,
}

impl DirectorySource {
    /// Read the module list for `language` under `root`.
    pub fn open(root: &Path, language: &str) -> Result<Self> {
        let localized = root.join(language);
        let dir = if localized.join(MODULE_LIST_FILE).is_file() {
            localized
        } else {
            root.to_path_buf()
        };

        let list_path = dir.join(MODULE_LIST_FILE);
        let raw = read(&list_path)?;
        let modules = parse_module_list(&raw)?;
        tracing::info!(dir = %dir.display(), language, modules = modules.len(), "loaded module catalog");

        Ok(Self {
            dir,
            language: language.to_string(),
            modules,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn modules(&self) -> &[ModuleMeta] {
        &self.modules
    }

    pub fn find(&self, id: &str) -> Option<&ModuleMeta> {
        self.modules.iter().find(|meta| meta.id == id)
    }

    /// Load one module's data. A missing file fails only that module.
    pub fn load(&self, id: &str) -> Result<ModuleContent> {
        let meta = self
            .find(id)
            .ok_or_else(|| CatalogError::ModuleUnavailable { id: id.to_string() })?;

        let path = self.dir.join(format!("{id}.json"));
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(module = id, path = %path.display(), "module data missing");
                return Err(CatalogError::ModuleUnavailable { id: id.to_string() });
            }
            Err(source) => return Err(CatalogError::Io { path, source }),
        };

        Ok(parse_module_data(meta, &raw)?)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}
