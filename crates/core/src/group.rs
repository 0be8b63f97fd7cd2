//! Data model for organized file groups and file specifications.
//!
//! A file group is one atomic upload unit: a mapping from named slots to
//! file references plus free-form metadata. Groups arrive from the host's
//! organizer, flow through the workflow stages, and either survive into
//! the final upload list or are excluded by validation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// One named slot a file group may populate, as declared by the host.
///
/// Unknown fields supplied by the host are preserved verbatim in `extra`
/// and ignored by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpecEntry {
    /// Slot name, e.g. `"image_0"`.
    pub name: String,

    /// Declared file type, independent of the slot naming.
    pub file_type: String,

    /// Opaque extra fields carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileSpecEntry {
    pub fn new(name: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: file_type.into(),
            extra: Map::new(),
        }
    }
}

/// Resolve the specification entry for a slot name.
///
/// First entry wins. Spec lists are bounded by the slot count of a group,
/// so a linear scan is fine. `None` means the slot is untyped and the
/// validator skips it.
pub fn find_spec<'a>(specs: &'a [FileSpecEntry], slot_name: &str) -> Option<&'a FileSpecEntry> {
    specs.iter().find(|spec| spec.name == slot_name)
}

/// Value of one slot: a single file reference or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl SlotValue {
    /// Normalize to a single file reference.
    ///
    /// A one-element list is treated as its element. Empty lists mean
    /// "no file" and multi-element lists stay unresolved; both return
    /// `None` and are skipped by extension checks.
    pub fn as_single(&self) -> Option<&Path> {
        match self {
            SlotValue::One(path) => Some(path),
            SlotValue::Many(paths) if paths.len() == 1 => Some(&paths[0]),
            SlotValue::Many(_) => None,
        }
    }

    /// First file reference, if any.
    ///
    /// The conversion stage scans with this looser normalization: any
    /// non-empty list contributes its first element.
    pub fn first(&self) -> Option<&Path> {
        match self {
            SlotValue::One(path) => Some(path),
            SlotValue::Many(paths) => paths.first().map(PathBuf::as_path),
        }
    }
}

impl From<PathBuf> for SlotValue {
    fn from(path: PathBuf) -> Self {
        SlotValue::One(path)
    }
}

impl From<&str> for SlotValue {
    fn from(path: &str) -> Self {
        SlotValue::One(PathBuf::from(path))
    }
}

impl From<String> for SlotValue {
    fn from(path: String) -> Self {
        SlotValue::One(PathBuf::from(path))
    }
}

impl From<Vec<PathBuf>> for SlotValue {
    fn from(paths: Vec<PathBuf>) -> Self {
        SlotValue::Many(paths)
    }
}

/// One atomic unit of related files plus associated metadata.
///
/// `files` keys are unique and iterate in insertion order; `meta` and the
/// flattened `extra` fields are opaque payload copied by value across
/// workflow stages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileGroup {
    /// Slot name -> file reference(s).
    #[serde(default)]
    pub files: IndexMap<String, SlotValue>,

    /// Free-form metadata attached to this group.
    #[serde(default)]
    pub meta: Map<String, Value>,

    /// Opaque top-level fields carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at a slot.
    pub fn with_file(mut self, slot: impl Into<String>, value: impl Into<SlotValue>) -> Self {
        self.files.insert(slot.into(), value.into());
        self
    }

    /// Attach a metadata value.
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Copy of this group with every non-file attribute deep-copied and
    /// an empty file map. Derived groups (e.g. converted pages) start
    /// from this.
    pub fn without_files(&self) -> Self {
        Self {
            files: IndexMap::new(),
            meta: self.meta.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Category derived from a slot name: the prefix before the first `_`,
/// or the whole name when there is no underscore.
pub fn category_of(slot_name: &str) -> &str {
    slot_name.split('_').next().unwrap_or(slot_name)
}

/// Lowercase extension of a file reference, with the leading dot.
/// Empty string when the file has no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
