//! Configuration types for upload validation and conversion.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Allowed file extensions per category or declared file type,
/// plus the table of legacy extensions that trigger a conversion
/// warning instead of a hard rejection.
///
/// Both tables are read-only for the duration of a workflow run.
/// Keys in `extensions` are matched first against the slot-name
/// category, then against the specification's `file_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Category/type -> allowed lowercase extensions (with leading dot).
    pub extensions: IndexMap<String, Vec<String>>,

    /// Legacy extension -> suggested replacement formats.
    /// A file matching one of these keys is excluded from upload and a
    /// conversion suggestion is logged.
    pub warnings: IndexMap<String, String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let mut extensions = IndexMap::new();
        extensions.insert("pcd".to_string(), vec![".pcd".to_string()]);
        extensions.insert(
            "text".to_string(),
            vec![".txt".to_string(), ".html".to_string()],
        );
        extensions.insert(
            "audio".to_string(),
            vec![".wav".to_string(), ".mp3".to_string()],
        );
        extensions.insert(
            "data".to_string(),
            vec![".bin".to_string(), ".json".to_string(), ".fbx".to_string()],
        );
        extensions.insert(
            "image".to_string(),
            vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()],
        );
        extensions.insert("video".to_string(), vec![".mp4".to_string()]);

        let mut warnings = IndexMap::new();
        warnings.insert(".tif".to_string(), ".jpg, .png".to_string());
        warnings.insert(".tiff".to_string(), ".jpg, .png".to_string());
        warnings.insert(".avi".to_string(), ".mp4".to_string());
        warnings.insert(".mov".to_string(), ".mp4".to_string());
        warnings.insert(".mkv".to_string(), ".mp4".to_string());
        warnings.insert(".wmv".to_string(), ".mp4".to_string());

        Self {
            extensions,
            warnings,
        }
    }
}

impl UploadConfig {
    /// An empty configuration with no allow-lists and no warnings.
    /// Every slot passes the permissive fallback.
    pub fn empty() -> Self {
        Self {
            extensions: IndexMap::new(),
            warnings: IndexMap::new(),
        }
    }

    /// Add or replace the allowed extensions for a category or type.
    pub fn allow(
        mut self,
        category: impl Into<String>,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.extensions.insert(
            category.into(),
            extensions.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Add or replace a conversion warning for a legacy extension.
    pub fn warn(
        mut self,
        extension: impl Into<String>,
        suggested: impl Into<String>,
    ) -> Self {
        self.warnings.insert(extension.into(), suggested.into());
        self
    }

    /// Validate the configuration.
    ///
    /// Extensions must be lowercase and carry their leading dot; the
    /// validator compares them verbatim against derived file suffixes.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (category, allowed) in &self.extensions {
            if category.is_empty() {
                return Err(crate::error::UploadError::InvalidConfig(
                    "extension table contains an empty category key".to_string(),
                ));
            }
            for ext in allowed {
                validate_extension(ext)?;
            }
        }
        for ext in self.warnings.keys() {
            validate_extension(ext)?;
        }
        Ok(())
    }
}

fn validate_extension(ext: &str) -> crate::error::Result<()> {
    if !ext.starts_with('.') || ext.len() < 2 {
        return Err(crate::error::UploadError::InvalidConfig(format!(
            "extension '{}' must start with a dot and name a suffix",
            ext
        )));
    }
    if ext.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(crate::error::UploadError::InvalidConfig(format!(
            "extension '{}' must be lowercase",
            ext
        )));
    }
    Ok(())
}

/// Configuration for rendering document pages to PNG images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Output DPI (dots per inch).
    /// Default: 200.
    pub dpi: u32,

    /// Whether to keep the alpha channel (transparency).
    /// Default: false.
    pub use_alpha: bool,

    /// Background color composited behind pages when alpha is off.
    /// Default: white (255, 255, 255).
    pub background_color: (u8, u8, u8),
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            use_alpha: false,
            background_color: (255, 255, 255),
        }
    }
}

impl RasterConfig {
    /// Create a raster config with specified DPI.
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Keep the alpha channel instead of compositing a background.
    pub fn use_alpha(mut self, enabled: bool) -> Self {
        self.use_alpha = enabled;
        self
    }

    /// Set the background color.
    pub fn background_color(mut self, color: (u8, u8, u8)) -> Self {
        self.background_color = color;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.dpi == 0 || self.dpi > 1200 {
            return Err(crate::error::UploadError::InvalidConfig(
                "dpi must be between 1 and 1200".to_string(),
            ));
        }
        Ok(())
    }
}
