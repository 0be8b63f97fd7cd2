//! File-group validation against slot specifications.
//!
//! The validator walks each group's slots in insertion order, classifies
//! every file against the extension allow-lists and the conversion-warning
//! table, and splits the input into the surviving upload list and a map of
//! violations for reporting.
//!
//! A file group is an atomic upload unit: if any slot fails, the whole
//! group is excluded and the scan of that group stops at the failing slot.
//! Only that one slot is reported for the group.

use crate::config::UploadConfig;
use crate::group::{category_of, extension_of, find_spec, FileGroup, FileSpecEntry, SlotValue};
use indexmap::IndexMap;
use tracing::debug;

/// Classification of a single slot.
///
/// Returned as a value so callers branch on the outcome instead of
/// catching errors; nothing about a bad file is exceptional here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotVerdict {
    /// Extension is allowed, or nothing claims this slot (unrecognized
    /// category and type fall through permissively).
    Pass,
    /// No spec for the slot, or no single file reference to check
    /// (empty or multi-element list).
    Skipped,
    /// Extension not in the allow-list for the slot's category or type.
    Invalid {
        found: String,
        expected: Vec<String>,
    },
    /// Legacy extension that should be transcoded before upload.
    NeedsConversion { found: String },
}

/// Invalid-extension details for one violating slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidExtensions {
    /// Extensions found on the offending file(s).
    pub found: Vec<String>,
    /// Extensions the slot's category or type allows.
    pub expected: Vec<String>,
}

/// Violation collected for one slot during a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViolationRecord {
    /// Hard validation failure, if any.
    pub invalid: Option<InvalidExtensions>,
    /// Extensions that triggered a conversion warning.
    pub warnings: Vec<String>,
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// Groups that passed every check, in input order.
    pub valid: Vec<FileGroup>,
    /// Slot name -> violation, in detection order. One entry per
    /// excluded group; a later group violating on the same slot name
    /// overwrites the earlier record.
    pub violations: IndexMap<String, ViolationRecord>,
}

/// Classify one slot against the specs and configuration tables.
///
/// Precedence: conversion warning first, then the slot-name category
/// allow-list, then the spec's declared `file_type` as fallback.
pub fn classify_slot(
    slot_name: &str,
    value: &SlotValue,
    specs: &[FileSpecEntry],
    config: &UploadConfig,
) -> SlotVerdict {
    let Some(spec) = find_spec(specs, slot_name) else {
        return SlotVerdict::Skipped;
    };
    let Some(path) = value.as_single() else {
        // Empty lists mean "no file"; multi-element lists stay
        // unresolved and are not checked.
        return SlotVerdict::Skipped;
    };

    let extension = extension_of(path);

    if config.warnings.contains_key(&extension) {
        return SlotVerdict::NeedsConversion { found: extension };
    }

    let category = category_of(slot_name);
    if let Some(allowed) = config.extensions.get(category) {
        return if allowed.iter().any(|a| a == &extension) {
            SlotVerdict::Pass
        } else {
            SlotVerdict::Invalid {
                found: extension,
                expected: allowed.clone(),
            }
        };
    }

    if let Some(allowed) = config.extensions.get(spec.file_type.as_str()) {
        return if allowed.iter().any(|a| a == &extension) {
            SlotVerdict::Pass
        } else {
            SlotVerdict::Invalid {
                found: extension,
                expected: allowed.clone(),
            }
        };
    }

    // Neither the category nor the declared type is a known table key:
    // the slot is accepted unchecked.
    SlotVerdict::Pass
}

/// Validate file groups against their specifications.
///
/// Returns the groups that passed and the violations keyed by the slot
/// that stopped each excluded group. With no groups or no specs there is
/// nothing to check and the input passes through unchanged.
pub fn validate_groups(
    groups: Vec<FileGroup>,
    specs: &[FileSpecEntry],
    config: &UploadConfig,
) -> Validated {
    if groups.is_empty() || specs.is_empty() {
        return Validated {
            valid: groups,
            violations: IndexMap::new(),
        };
    }

    let mut valid = Vec::with_capacity(groups.len());
    let mut violations: IndexMap<String, ViolationRecord> = IndexMap::new();

    for group in groups {
        let mut violation: Option<(String, ViolationRecord)> = None;

        for (slot_name, value) in &group.files {
            match classify_slot(slot_name, value, specs, config) {
                SlotVerdict::Pass | SlotVerdict::Skipped => continue,
                SlotVerdict::Invalid { found, expected } => {
                    violation = Some((
                        slot_name.clone(),
                        ViolationRecord {
                            invalid: Some(InvalidExtensions {
                                found: vec![found],
                                expected,
                            }),
                            warnings: Vec::new(),
                        },
                    ));
                    break;
                }
                SlotVerdict::NeedsConversion { found } => {
                    violation = Some((
                        slot_name.clone(),
                        ViolationRecord {
                            invalid: None,
                            warnings: vec![found],
                        },
                    ));
                    break;
                }
            }
        }

        match violation {
            Some((slot_name, record)) => {
                debug!(slot = %slot_name, "excluding file group");
                violations.insert(slot_name, record);
            }
            None => valid.push(group),
        }
    }

    Validated { valid, violations }
}
