//! Human-readable reporting of validation violations.

use crate::run::{LogCode, RunLog};
use crate::validator::ViolationRecord;
use indexmap::IndexMap;

/// Emit one log line per violation through the host's run logger.
///
/// Purely informational: the offending groups are already excluded by the
/// time this runs, and nothing here can fail.
pub fn report_violations(
    violations: &IndexMap<String, ViolationRecord>,
    warnings_table: &IndexMap<String, String>,
    run: &dyn RunLog,
) {
    for (slot_name, record) in violations {
        if let Some(invalid) = &record.invalid {
            run.log_message_with_code(
                LogCode::InvalidExtensions,
                &format!(
                    "Validation warning in '{}': File extensions {:?} do not match expected extensions {:?}. These files will be excluded from upload.",
                    slot_name, invalid.found, invalid.expected
                ),
            );
        }
        for extension in &record.warnings {
            if let Some(suggested) = warnings_table.get(extension) {
                run.log_message_with_code(
                    LogCode::ConversionSuggested,
                    &format!(
                        "Conversion warning in '{}': File extension '{}' may require conversion to [{}].",
                        slot_name, extension, suggested
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::BufferedRun;
    use crate::validator::InvalidExtensions;

    fn warnings_table() -> IndexMap<String, String> {
        let mut table = IndexMap::new();
        table.insert(".tif".to_string(), ".jpg, .png".to_string());
        table
    }

    #[test]
    fn test_report_invalid_extensions() {
        let mut violations = IndexMap::new();
        violations.insert(
            "image_0".to_string(),
            ViolationRecord {
                invalid: Some(InvalidExtensions {
                    found: vec![".bmp".to_string()],
                    expected: vec![".jpg".to_string(), ".png".to_string()],
                }),
                warnings: vec![],
            },
        );

        let run = BufferedRun::new();
        report_violations(&violations, &warnings_table(), &run);

        let messages = run.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Validation warning in 'image_0'"));
        assert!(messages[0].contains(".bmp"));
        assert!(messages[0].contains(".jpg"));
        assert!(messages[0].contains("excluded from upload"));
    }

    #[test]
    fn test_report_conversion_warning() {
        let mut violations = IndexMap::new();
        violations.insert(
            "image_0".to_string(),
            ViolationRecord {
                invalid: None,
                warnings: vec![".tif".to_string()],
            },
        );

        let run = BufferedRun::new();
        report_violations(&violations, &warnings_table(), &run);

        let messages = run.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Conversion warning in 'image_0'"));
        assert!(messages[0].contains("'.tif'"));
        assert!(messages[0].contains("[.jpg, .png]"));
    }

    #[test]
    fn test_report_warned_extension_missing_from_table_is_silent() {
        let mut violations = IndexMap::new();
        violations.insert(
            "video_0".to_string(),
            ViolationRecord {
                invalid: None,
                warnings: vec![".flv".to_string()],
            },
        );

        let run = BufferedRun::new();
        report_violations(&violations, &warnings_table(), &run);
        assert!(run.is_empty());
    }

    #[test]
    fn test_report_nothing_for_empty_map() {
        let run = BufferedRun::new();
        report_violations(&IndexMap::new(), &warnings_table(), &run);
        assert!(run.is_empty());
    }

    #[test]
    fn test_report_multiple_slots_in_detection_order() {
        let mut violations = IndexMap::new();
        violations.insert(
            "pcd_0".to_string(),
            ViolationRecord {
                invalid: Some(InvalidExtensions {
                    found: vec![".ply".to_string()],
                    expected: vec![".pcd".to_string()],
                }),
                warnings: vec![],
            },
        );
        violations.insert(
            "image_0".to_string(),
            ViolationRecord {
                invalid: None,
                warnings: vec![".tif".to_string()],
            },
        );

        let run = BufferedRun::new();
        report_violations(&violations, &warnings_table(), &run);

        let messages = run.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("'pcd_0'"));
        assert!(messages[1].contains("'image_0'"));
    }
}
