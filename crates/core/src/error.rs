//! Error types for the upload-gate workflow.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the upload-gate library.
///
/// Data-level problems (a file with a wrong extension, a document that
/// fails to convert) never surface here; they are handled inside the
/// pipeline by exclusion or fallback. These variants cover configuration
/// and environment bugs that indicate a host-side mistake.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input document not found.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Temporary directory creation failed.
    #[error("Failed to create temporary directory: {0}")]
    TempDirFailed(#[from] std::io::Error),

    /// Pdfium library error.
    #[error("Pdfium error: {0}")]
    PdfiumError(String),

    /// PDF rendering failed.
    #[error("PDF rendering failed: {0}")]
    PdfRenderError(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncodingError(String),

    /// Output directory creation or write failed.
    #[error("Failed to write output under '{path}': {message}")]
    OutputDirError { path: PathBuf, message: String },

    /// A custom workflow stage failed.
    #[error("Workflow stage '{stage}' failed: {message}")]
    StageFailed { stage: &'static str, message: String },
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_config() {
        let err = UploadError::InvalidConfig("dpi must be between 1 and 1200".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("dpi must be between 1 and 1200"));
    }

    #[test]
    fn test_error_display_input_not_found() {
        let err = UploadError::InputNotFound(PathBuf::from("/missing/scan.pdf"));
        let msg = format!("{}", err);
        assert!(msg.contains("/missing/scan.pdf"));
    }

    #[test]
    fn test_error_display_output_dir() {
        let err = UploadError::OutputDirError {
            path: PathBuf::from("/tmp/pages"),
            message: "permission denied".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/tmp/pages"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_error_display_stage_failed() {
        let err = UploadError::StageFailed {
            stage: "process",
            message: "bad group".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("process"));
        assert!(msg.contains("bad group"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no tmp");
        let err: UploadError = io_err.into();
        match err {
            UploadError::TempDirFailed(_) => (),
            _ => panic!("Expected TempDirFailed"),
        }
    }

    #[test]
    fn test_error_debug_impl() {
        let err = UploadError::PdfiumError("missing library".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("PdfiumError"));
        assert!(debug.contains("missing library"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(7)
        }
        assert_eq!(returns_result().unwrap(), 7);
    }
}
