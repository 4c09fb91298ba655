use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("collection has no images")]
    EmptyCollection,
    #[error("output filename is empty")]
    InvalidFilename,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Output paper presets. Base dimensions are portrait millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    /// Folio size common for scanned office documents
    #[default]
    F4,
    A4,
    A3,
    Legal,
    Letter,
}

impl PageSize {
    /// Base dimensions in portrait orientation (width, height)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::F4 => (210.0, 330.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A3 => (297.0, 420.0),
            PageSize::Legal => (216.0, 356.0),
            PageSize::Letter => (216.0, 279.0),
        }
    }
}

/// How each page's orientation is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrientationPolicy {
    /// Every page uses the preset dimensions as-is
    Portrait,
    /// Every page uses the preset dimensions swapped
    Landscape,
    /// Per page from that image's rotation: quarter turns print landscape
    #[default]
    Adaptive,
}
