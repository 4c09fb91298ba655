use crate::types::{AssemblyError, OrientationPolicy, PageSize, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest filename accepted from the input surface
pub const MAX_FILENAME_LEN: usize = 100;

/// Assembly configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssemblyOptions {
    pub page_size: PageSize,
    pub orientation: OrientationPolicy,
    /// Output name; `.pdf` is appended on resolution when missing
    pub filename: String,
    /// Quality used when re-encoding rotated pixels (1-100)
    pub jpeg_quality: u8,
    /// Optional pacing delay between pages, for progress observers
    pub page_delay_ms: u64,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::F4,
            orientation: OrientationPolicy::Adaptive,
            filename: default_filename(),
            jpeg_quality: 80,
            page_delay_ms: 0,
        }
    }
}

impl AssemblyOptions {
    /// Final output name: trimmed, with a `.pdf` extension guaranteed.
    /// Fails with [`AssemblyError::InvalidFilename`] when nothing is left
    /// after trimming.
    pub fn resolved_filename(&self) -> Result<String> {
        let trimmed = self.filename.trim();
        if trimmed.is_empty() {
            return Err(AssemblyError::InvalidFilename);
        }
        if trimmed.to_lowercase().ends_with(".pdf") {
            Ok(trimmed.to_string())
        } else {
            Ok(format!("{trimmed}.pdf"))
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.resolved_filename()?;
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(AssemblyError::Config(
                "jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| AssemblyError::Config(format!("Failed to parse config: {e}")))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssemblyError::Config(format!("Failed to serialize config: {e}")))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Date-stamped fallback name used when the caller provides none
pub fn default_filename() -> String {
    format!("images_{}", chrono::Local::now().format("%Y%m%d"))
}

/// Strip characters that are illegal in filenames and clamp the length.
///
/// Applied at the input edge (CLI, presentation glue) before a raw name
/// reaches [`AssemblyOptions`]; resolution and extension handling stay in
/// [`AssemblyOptions::resolved_filename`].
pub fn sanitize_filename(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| {
            !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') && !c.is_control()
        })
        .collect();
    if cleaned.chars().count() > MAX_FILENAME_LEN {
        cleaned = cleaned.chars().take(MAX_FILENAME_LEN).collect();
    }
    cleaned
}
