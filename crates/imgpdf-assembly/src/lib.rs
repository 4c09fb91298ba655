mod cancel;
mod compose;
mod layout;
mod options;
mod types;

pub use cancel::CancelFlag;
pub use compose::{Assembled, AssemblyOutcome, assemble, generate};
pub use layout::{Placement, fit_to_page, page_dimensions_mm};
pub use options::{AssemblyOptions, MAX_FILENAME_LEN, default_filename, sanitize_filename};
pub use types::*;
