mod batch;
mod collection;
mod types;

pub use collection::ImageCollection;
pub use types::*;
