pub mod analyze;
pub mod detect;

pub use analyze::{analyze_frames, FramePaths};
pub use detect::detect_frame;
