//! # upload-gate-core
//!
//! File-group validation and conversion for upload workflows.
//!
//! This library is the extension point an upload pipeline calls after its
//! default organizer has grouped files: it validates every file against
//! per-category extension allow-lists, optionally expands paginated
//! documents (PDF) into per-page image groups, and returns the filtered
//! list ready for upload. It provides:
//!
//! - a **fixed stage pipeline** (`organize -> before_process -> process
//!   -> after_process -> validate`) with every stage swappable
//! - an **extension validator** with warning tables for legacy formats
//! - **pdfium** (Google's PDF engine) for document-to-image conversion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use upload_gate_core::{FileGroup, FileSpecEntry, UploadWorkflow};
//!
//! fn main() -> anyhow::Result<()> {
//!     let workflow = UploadWorkflow::builder("./upload")
//!         .specs(vec![FileSpecEntry::new("image_0", "image")])
//!         .organized(vec![
//!             FileGroup::new().with_file("image_0", "frames/a.png"),
//!             FileGroup::new().with_file("image_0", "frames/b.bmp"),
//!         ])
//!         .build()?;
//!
//!     // b.bmp fails the "image" allow-list; only a.png survives.
//!     let upload_ready = workflow.handle_upload_files()?;
//!     println!("{} groups ready for upload", upload_ready.len());
//!     Ok(())
//! }
//! ```
//!
//! ## PDF Expansion
//!
//! ```rust,no_run
//! use upload_gate_core::{
//!     DocumentToPages, FileGroup, FileSpecEntry, PdfiumRasterizer, RasterConfig,
//!     UploadWorkflow,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let rasterizer = PdfiumRasterizer::new(RasterConfig::with_dpi(200))?;
//!
//!     let workflow = UploadWorkflow::builder("./upload")
//!         .specs(vec![FileSpecEntry::new("image_0", "image")])
//!         .organized(vec![FileGroup::new().with_file("image_0", "scans/report.pdf")])
//!         .before_process(DocumentToPages::new(rasterizer))
//!         .build()?;
//!
//!     // One group per PDF page, with page metadata attached.
//!     let upload_ready = workflow.handle_upload_files()?;
//!     println!("{} page groups", upload_ready.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod group;
pub mod pdf_renderer;
pub mod report;
pub mod run;
pub mod validator;
pub mod workflow;

// Re-export main types for convenience
pub use config::{RasterConfig, UploadConfig};
pub use convert::{DocumentToPages, Rasterizer};
pub use error::{Result, UploadError};
pub use group::{category_of, extension_of, find_spec, FileGroup, FileSpecEntry, SlotValue};
pub use pdf_renderer::PdfiumRasterizer;
pub use report::report_violations;
pub use run::{BufferedRun, LogCode, RunLog, TracingRun};
pub use validator::{
    classify_slot, validate_groups, InvalidExtensions, SlotVerdict, Validated, ViolationRecord,
};
pub use workflow::{
    create_target_dir, GroupStage, Identity, StageContext, StageFn, UploadWorkflow,
    UploadWorkflowBuilder, WorkflowStage,
};

/// Document extension the default conversion stage expands to pages.
pub const CONVERTIBLE_EXTENSION: &str = ".pdf";

/// Check if an extension (with leading dot) is convertible to pages.
pub fn is_convertible_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case(CONVERTIBLE_EXTENSION)
}

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
