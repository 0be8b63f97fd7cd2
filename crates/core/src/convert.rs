//! Document-to-pages conversion stage.
//!
//! Expands file groups that carry a paginated document into one file
//! group per page, leaving every other group untouched. The actual page
//! extraction is behind the [`Rasterizer`] trait so the workflow can run
//! with the pdfium-backed implementation, a different engine, or a test
//! double.

use crate::error::Result;
use crate::group::{extension_of, FileGroup, SlotValue};
use crate::run::{LogCode, RunLog};
use crate::workflow::{GroupStage, StageContext};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Renders a paginated document into ordered page images.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `document` into `output_dir`, naming files
    /// from `prefix`, and return the image paths in page order.
    fn rasterize(&self, document: &Path, output_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>>;

    /// Name of the extraction engine, recorded in page-group metadata.
    fn library(&self) -> &str;
}

/// Workflow stage that fans paginated documents out into per-page groups.
///
/// For each group, the first slot holding a file with the convertible
/// extension is converted; remaining slots are not scanned. Each page
/// becomes a new group that deep-copies the original's non-file
/// attributes and places the page image at the slot the document
/// occupied. Groups without a convertible document, and groups whose
/// conversion fails, pass through unchanged.
pub struct DocumentToPages {
    rasterizer: Box<dyn Rasterizer>,
    extension: String,
    temp_root: Option<PathBuf>,
}

impl DocumentToPages {
    /// Create a stage converting `.pdf` documents with the given engine.
    pub fn new(rasterizer: impl Rasterizer + 'static) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
            extension: crate::CONVERTIBLE_EXTENSION.to_string(),
            temp_root: None,
        }
    }

    /// Convert a different document extension (lowercase, with dot).
    pub fn for_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Create the scoped per-conversion directories under `root` instead
    /// of the system temp directory.
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Run the expansion over a list of groups.
    ///
    /// Page groups replace their source group's position in the
    /// sequence; conversion failures are logged and fall back to passing
    /// the original group through.
    pub fn expand(&self, run: &dyn RunLog, groups: Vec<FileGroup>) -> Vec<FileGroup> {
        let mut out = Vec::with_capacity(groups.len());

        for group in groups {
            let mut converted = false;

            for (slot_name, value) in &group.files {
                let Some(document) = value.first() else {
                    continue;
                };
                if extension_of(document) != self.extension {
                    continue;
                }

                match self.convert_document(document) {
                    Ok(pages) => {
                        let total_pages = pages.len();
                        let original_filename = document
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default();

                        for (index, page_path) in pages.into_iter().enumerate() {
                            let page_number = index + 1;
                            let mut page_group = group.without_files();
                            page_group
                                .meta
                                .insert("total_pages".to_string(), json!(total_pages));
                            page_group
                                .meta
                                .insert("page_number".to_string(), json!(page_number));
                            page_group.meta.insert(
                                "original_filename".to_string(),
                                json!(original_filename),
                            );
                            page_group.meta.insert(
                                "extraction_library".to_string(),
                                json!(self.rasterizer.library()),
                            );

                            run.log_message_with_code(
                                LogCode::PageConverted,
                                &format!(
                                    "Converted page {} to: {}",
                                    page_number,
                                    page_path.display()
                                ),
                            );
                            page_group
                                .files
                                .insert(slot_name.clone(), SlotValue::One(page_path));
                            out.push(page_group);
                        }

                        run.log_message_with_code(
                            LogCode::DocumentConverted,
                            &format!(
                                "Successfully converted {} to {} separate file groups",
                                document.display(),
                                total_pages
                            ),
                        );
                        converted = true;
                    }
                    Err(e) => {
                        warn!(document = %document.display(), error = %e, "document conversion failed");
                        run.log_message_with_code(
                            LogCode::ConversionFailed,
                            &format!("Error converting {}: {}", document.display(), e),
                        );
                        // Fall through: the original group is emitted
                        // unchanged below.
                    }
                }
                // Only the first convertible file per group is processed.
                break;
            }

            if !converted {
                out.push(group);
            }
        }

        out
    }

    /// Rasterize one document into a fresh scoped directory.
    ///
    /// The directory is persisted only on success, once the returned
    /// paths own it; a failed attempt removes it on drop so no emitted
    /// group can reference an orphan.
    fn convert_document(&self, document: &Path) -> Result<Vec<PathBuf>> {
        let temp_dir = match &self.temp_root {
            Some(root) => TempDir::with_prefix_in("upload-gate-pages-", root)?,
            None => TempDir::with_prefix("upload-gate-pages-")?,
        };

        let prefix = document
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document");

        debug!(document = %document.display(), out = %temp_dir.path().display(), "rasterizing document");
        let pages = self
            .rasterizer
            .rasterize(document, temp_dir.path(), prefix)?;

        let _ = temp_dir.keep();
        Ok(pages)
    }
}

impl GroupStage for DocumentToPages {
    fn apply(&self, ctx: &StageContext<'_>, groups: Vec<FileGroup>) -> Result<Vec<FileGroup>> {
        Ok(self.expand(ctx.run, groups))
    }
}
