//! Page image analysis: preprocessing and table-region detection.

mod morphology;
mod preprocess;
mod region;
mod table_detector;

pub use morphology::{binarize_inverted, open_lines, union, Orientation};
pub use preprocess::{enhance_contrast, preprocess, sharpen, CONTRAST_FACTOR};
pub use region::{Rect, TableRegion};
pub use table_detector::{contour_area, TableDetector, TableDetectorConfig};
