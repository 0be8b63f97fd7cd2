//! PDF page rasterization using pdfium (Google's PDF engine).

use crate::config::RasterConfig;
use crate::convert::Rasterizer;
use crate::error::{Result, UploadError};
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// [`Rasterizer`] implementation backed by pdfium.
///
/// Pages are rendered one at a time; the workflow this feeds is a single
/// sequential pass.
pub struct PdfiumRasterizer {
    /// Render configuration.
    config: RasterConfig,
    /// Pdfium library instance.
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Create a new rasterizer, binding the pdfium library.
    pub fn new(config: RasterConfig) -> Result<Self> {
        config.validate()?;

        // Try to bind to a local library first, then fall back to the
        // system library.
        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/usr/lib",
                    ))
                })
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/usr/local/lib",
                    ))
                })
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| {
                    UploadError::PdfiumError(format!("Failed to load pdfium library: {}", e))
                })?,
        );

        info!(dpi = config.dpi, "pdfium rasterizer initialized");

        Ok(Self { config, pdfium })
    }

    /// Get the configured DPI.
    pub fn dpi(&self) -> u32 {
        self.config.dpi
    }

    /// Render a single page to an RGBA image at the configured DPI.
    fn render_page(&self, page: &PdfPage<'_>, page_number: usize) -> Result<RgbaImage> {
        // PDF pages are 72 points per inch, so scale up to the target DPI.
        let scale = self.config.dpi as f32 / 72.0;
        let width = (page.width().value * scale) as u32;
        let height = (page.height().value * scale) as u32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            UploadError::PdfRenderError(format!("Failed to render page {}: {}", page_number, e))
        })?;

        let rgba_image: RgbaImage = bitmap.as_image().into_rgba8();

        if self.config.use_alpha {
            Ok(rgba_image)
        } else {
            Ok(composite_background(rgba_image, self.config.background_color))
        }
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, document: &Path, output_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        if !document.exists() {
            return Err(UploadError::InputNotFound(document.to_path_buf()));
        }
        std::fs::create_dir_all(output_dir).map_err(|e| UploadError::OutputDirError {
            path: output_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let doc = self
            .pdfium
            .load_pdf_from_file(document, None)
            .map_err(|e| UploadError::PdfRenderError(format!("Failed to load PDF: {}", e)))?;

        let page_count = doc.pages().len() as usize;
        debug!(pages = page_count, document = %document.display(), "rasterizing");

        let mut output_paths = Vec::with_capacity(page_count);
        for page_idx in 0..page_count {
            let page = doc.pages().get(page_idx as u16).map_err(|e| {
                UploadError::PdfRenderError(format!("Failed to get page {}: {}", page_idx + 1, e))
            })?;

            let image = self.render_page(&page, page_idx + 1)?;
            let png_data = encode_png(&image)?;

            let filename = format!("{}_page_{:04}.png", prefix, page_idx + 1);
            let output_path = output_dir.join(&filename);
            std::fs::write(&output_path, &png_data).map_err(|e| UploadError::OutputDirError {
                path: output_path.clone(),
                message: e.to_string(),
            })?;

            output_paths.push(output_path);
        }

        Ok(output_paths)
    }

    fn library(&self) -> &str {
        "pdfium"
    }
}

/// Blend a background color into transparent areas and drop the alpha.
fn composite_background(mut image: RgbaImage, color: (u8, u8, u8)) -> RgbaImage {
    let (r, g, b) = color;

    for pixel in image.pixels_mut() {
        let alpha = pixel[3] as f32 / 255.0;
        if alpha < 1.0 {
            let inv_alpha = 1.0 - alpha;
            pixel[0] = ((pixel[0] as f32 * alpha) + (r as f32 * inv_alpha)) as u8;
            pixel[1] = ((pixel[1] as f32 * alpha) + (g as f32 * inv_alpha)) as u8;
            pixel[2] = ((pixel[2] as f32 * alpha) + (b as f32 * inv_alpha)) as u8;
            pixel[3] = 255;
        }
    }

    image
}

/// Encode an RGBA image to PNG bytes.
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);

    let mut writer = encoder
        .write_header()
        .map_err(|e| UploadError::PngEncodingError(format!("Failed to write PNG header: {}", e)))?;

    writer
        .write_image_data(image.as_raw())
        .map_err(|e| UploadError::PngEncodingError(format!("Failed to write PNG data: {}", e)))?;

    drop(writer);

    Ok(buffer.into_inner())
}
