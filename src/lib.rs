pub mod alignment;
pub mod boost;
pub mod cli;
pub mod commands;
pub mod image;
pub mod logging;
pub mod matching;
pub mod photometry;
pub mod pipeline;
pub mod star_detection;
pub mod utils;

#[cfg(test)]
mod test_pipeline;

// Re-export commonly used items
pub use image::BrightnessGrid;
pub use pipeline::{analyze, AnalysisReport, FilterSet};
pub use star_detection::{detect_stars, DetectionParams, PixelCoordinate, Star};
