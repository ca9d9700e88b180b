pub mod category;
pub mod media_type;
pub mod report;
pub mod verdict;

pub use category::FileCategory;
pub use media_type::MediaType;
pub use report::{ScanReport, ValidationReport};
pub use verdict::{ContentVerdict, ImageInfo, ScanVerdict};
