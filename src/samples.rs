//! Sample values for properties, looked up in parameter datasets.
//!
//! The dataset index is a TSV file with one dataset per row, either
//! `type<TAB>key<TAB>path` or `lang<TAB>type<TAB>key<TAB>path`. Paths are
//! relative to the index file. Dataset files hold one value per row; only
//! the first column is used.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::Result;
use crate::ir::{Field, Ty};

pub const DEFAULT_MAX_SAMPLES: usize = 10;

pub trait SampleSource {
    /// Dataset file registered under `key`.
    fn path(&self, key: &str) -> Option<PathBuf>;

    /// Up to a handful of example values from the dataset under `key`.
    fn samples(&self, key: &str) -> Option<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct DatasetIndex {
    root: PathBuf,
    paths: IndexMap<String, String>,
    max_samples: usize,
}

impl DatasetIndex {
    pub fn load(index: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(index)?;
        let root = index.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::parse(root, &src))
    }

    pub fn parse(root: PathBuf, src: &str) -> Self {
        let mut paths = IndexMap::new();
        for row in src.lines().filter(|r| !r.trim().is_empty()) {
            let cols: Vec<&str> = row.split('\t').collect();
            let (key, path) = match cols.as_slice() {
                [_, _, key, path] => (*key, *path),
                [_, key, path] => (*key, *path),
                _ => {
                    tracing::debug!(row, "dataset index row has neither 3 nor 4 columns, skipped");
                    continue;
                }
            };
            paths.insert(key.to_string(), path.to_string());
        }
        Self { root, paths, max_samples: DEFAULT_MAX_SAMPLES }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl SampleSource for DatasetIndex {
    fn path(&self, key: &str) -> Option<PathBuf> {
        self.paths.get(key).map(|p| self.root.join(p))
    }

    fn samples(&self, key: &str) -> Option<Vec<String>> {
        let path = self.path(key)?;
        let src = match std::fs::read_to_string(&path) {
            Ok(src) => src,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "cannot read dataset");
                return None;
            }
        };
        let values: Vec<String> = src
            .lines()
            .filter_map(|row| row.split('\t').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .take(self.max_samples)
            .map(str::to_string)
            .collect();
        if values.is_empty() { None } else { Some(values) }
    }
}

/// Keys to try for a field, most specific first: its `string_values`
/// annotation, `<kind>:<query>_<field>`, then the element entity type.
pub fn lookup_keys(kind: &str, query: &str, field_name: &str, field: &Field) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(key) = &field.annotations.string_values {
        keys.push(key.clone());
    }
    keys.push(format!("{kind}:{query}_{field_name}"));
    if let Ty::Entity(entity) = field.ty.element() {
        keys.push(entity.clone());
    }
    keys
}

/// First key with a registered dataset.
pub fn find_path(source: &dyn SampleSource, keys: &[String]) -> Option<PathBuf> {
    keys.iter().find_map(|k| source.path(k))
}

/// Samples from the first key that has any.
pub fn find_samples(source: &dyn SampleSource, keys: &[String]) -> Option<Vec<String>> {
    keys.iter().find_map(|k| source.samples(k))
}
