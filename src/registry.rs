//! Cross-phase accumulation of symlink records.
//!
//! Every copy phase of a build feeds one [`LinkRegistry`], owned by the
//! pipeline and passed down by reference. Records are keyed by destination
//! path: re-registering a path replaces the record's value but keeps its
//! first-seen position, so the manifest order stays deterministic across
//! overlapping phases while later phases win on content.

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

/// One symlink to be reconstructed after unpacking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Path of the link as it will appear in the unpacked output. Absolute
    /// (stage-rooted) during accumulation; relative to the package root once
    /// the registry has been finalized.
    pub destination_path: PathBuf,
    /// The raw, unresolved target text exactly as stored by the filesystem.
    pub target: PathBuf,
    /// Whether the target resolves to a directory (reconstruction hint).
    pub is_directory: bool,
}

impl LinkRecord {
    /// Create a record for a link at `destination_path` pointing to `target`.
    #[must_use]
    pub fn new(
        destination_path: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        is_directory: bool,
    ) -> Self {
        Self {
            destination_path: destination_path.into(),
            target: target.into(),
            is_directory,
        }
    }
}

/// An insertion-ordered set of [`LinkRecord`] keyed by destination path.
///
/// Created once per build invocation, mutated by every copy phase, read
/// exactly once by the manifest writer, then discarded.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    records: IndexMap<PathBuf, LinkRecord>,
}

impl LinkRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its destination path.
    ///
    /// A later registration for an already-known destination overwrites the
    /// stored value but keeps the original insertion position.
    pub fn add(&mut self, record: LinkRecord) {
        self.records.insert(record.destination_path.clone(), record);
    }

    /// Add every record from `records`, with [`add`](Self::add) semantics.
    pub fn extend(&mut self, records: impl IntoIterator<Item = LinkRecord>) {
        for record in records {
            self.add(record);
        }
    }

    /// Remove the record for `destination_path`, preserving the relative
    /// order of the remaining records. Used by namespace-package pruning.
    pub fn remove(&mut self, destination_path: &Path) -> Option<LinkRecord> {
        self.records.shift_remove(destination_path)
    }

    /// Whether a record exists for `destination_path`.
    #[must_use]
    pub fn contains(&self, destination_path: &Path) -> bool {
        self.records.contains_key(destination_path)
    }

    /// Number of registered links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.values()
    }

    /// Rewrite every destination path to be relative to `root`.
    ///
    /// Called exactly once, before serialization. Destinations outside
    /// `root` are expressed with `..` components rather than rejected; link
    /// targets are never touched.
    pub fn relativize(&mut self, root: &Path) {
        let records = std::mem::take(&mut self.records);
        for (_, mut record) in records {
            record.destination_path = relative_to(&record.destination_path, root);
            self.records
                .insert(record.destination_path.clone(), record);
        }
    }
}

/// Express `path` relative to `base`, walking up with `..` when `path` does
/// not live under `base`. Both paths are compared component-wise without
/// touching the filesystem; when they share no common prefix at all, `path`
/// is returned unchanged.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return stripped.to_path_buf();
    }

    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return path.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in base_components.iter().skip(common) {
        relative.push("..");
    }
    for component in path_components.iter().skip(common) {
        relative.push(component);
    }
    relative
}
