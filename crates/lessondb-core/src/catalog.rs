//! In-memory material repository loaded from a directory of JSON files.
//!
//! Every `*.json` file under the catalog directory holds
//! `{"materials": [...], "topics": [...]}`. Files are read in sorted path
//! order and their arrays appended, so repository order is file order and
//! then array order within a file.
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::MaterialRepository;
use crate::types::{Material, MaterialField, MaterialFilter, Topic};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    materials: Vec<Material>,
    topics: Vec<Topic>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    materials: Vec<Material>,
    topics: Vec<Topic>,
}

impl Catalog {
    pub fn new(materials: Vec<Material>, topics: Vec<Topic>) -> Self {
        Self { materials, topics }
    }

    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Repository(format!("catalog directory {} does not exist", dir.display())));
        }
        let mut catalog = Self::default();
        for path in list_json_files(dir)? {
            let raw = fs::read_to_string(&path)
                .map_err(|e| Error::Repository(format!("failed to read {}: {}", path.display(), e)))?;
            let file: CatalogFile = serde_json::from_str(&raw)
                .map_err(|e| Error::Repository(format!("failed to parse {}: {}", path.display(), e)))?;
            debug!(path = %path.display(), materials = file.materials.len(), topics = file.topics.len(), "catalog file loaded");
            catalog.materials.extend(file.materials);
            catalog.topics.extend(file.topics);
        }
        info!(materials = catalog.materials.len(), topics = catalog.topics.len(), dir = %dir.display(), "catalog ready");
        Ok(catalog)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

#[async_trait]
impl MaterialRepository for Catalog {
    async fn find_materials(&self, filter: &MaterialFilter) -> Result<Vec<Material>> {
        Ok(self.materials.iter().filter(|m| filter.matches(m)).cloned().collect())
    }

    async fn find_topic(&self, id: &str) -> Result<Option<Topic>> {
        Ok(self.topics.iter().find(|t| t.id == id).cloned())
    }

    async fn distinct_values(&self, field: MaterialField, filter: &MaterialFilter) -> Result<Vec<String>> {
        let values: BTreeSet<&str> = self
            .materials
            .iter()
            .filter(|m| filter.matches(m))
            .map(|m| field.read(m))
            .collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }
}

fn list_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut json_files = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(root).display().to_string();
            Error::Repository(format!("failed to walk {}: {}", at, e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            json_files.push(path.to_path_buf());
        }
    }
    json_files.sort();
    Ok(json_files)
}
