use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("no valid image files in batch")]
    BatchEmpty,
    #[error("no images selected")]
    NoSelection,
    #[error("index {0} is out of bounds")]
    IndexOutOfBounds(usize),
    #[error("reorder list is not a permutation of the collection")]
    InvalidOrder,
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CollectionError>;

/// One candidate file as yielded by the input surface (picker, drag-drop,
/// or a CLI path read). Only `image/*` content types are accepted.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Clockwise quarter-turn rotation applied to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// Advance by a quarter turn, wrapping at 360
    pub fn advance(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise90,
            Rotation::Clockwise90 => Rotation::Clockwise180,
            Rotation::Clockwise180 => Rotation::Clockwise270,
            Rotation::Clockwise270 => Rotation::None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Whether this rotation swaps the image's width and height
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// One decoded image tracked by the collection.
///
/// Identity is positional (the record's index in the collection); duplicate
/// names are legal and distinct.
#[derive(Clone)]
pub struct ImageRecord {
    pub name: String,
    pub pixels: DynamicImage,
    pub rotation: Rotation,
    pub selected: bool,
}

impl ImageRecord {
    pub fn new(name: String, pixels: DynamicImage) -> Self {
        Self {
            name,
            pixels,
            rotation: Rotation::None,
            selected: false,
        }
    }
}

/// Whether the collection currently reflects a name sort.
///
/// Appending a batch or applying a manual reorder invalidates the sorted
/// state without resorting; `Unsorted` is what makes the next explicit
/// sort call take effect instead of short-circuiting as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Ascending,
    Descending,
    Unsorted,
}

/// Counts reported by a completed batch add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// Records appended to the collection
    pub added: usize,
    /// Inputs rejected up front for a non-image content type
    pub rejected: usize,
    /// Image inputs that failed to decode and were excluded
    pub failed: usize,
}
