use crate::alignment::StarOffsetTranslator;
use crate::star_detection::{
    DetectionParams, ADDITIONAL_BRIGHTNESS, MAX_PIXELS_ON_STAR, MIN_BRIGHTNESS_STAR,
    MIN_PIXELS_ON_STAR,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "star-props")]
#[command(about = "Detect, match and characterise stars across blue, visual and luminosity frames", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align three filter frames, match their stars and report stellar properties
    Analyze {
        /// FITS frame taken through the blue filter
        #[arg(long)]
        blue: String,

        /// FITS frame taken through the visual filter (alignment reference)
        #[arg(long)]
        visual: String,

        /// FITS frame taken through the luminosity filter
        #[arg(long)]
        luminosity: String,

        /// Index of the matched star to characterise (prompted on stdin if omitted)
        #[arg(short, long)]
        index: Option<usize>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        #[command(flatten)]
        detection: DetectionOptions,

        #[command(flatten)]
        alignment: AlignmentOptions,
    },

    /// Segment a single FITS frame and list its stars
    Detect {
        /// FITS file to analyze
        path: String,

        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: String,

        #[command(flatten)]
        detection: DetectionOptions,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct DetectionOptions {
    /// Minimum pixel value (ADU) for a pixel to belong to a star
    #[arg(long, default_value_t = MIN_BRIGHTNESS_STAR)]
    pub min_brightness: i32,

    /// Boost added to bright pixels while estimating alignment
    #[arg(long, default_value_t = ADDITIONAL_BRIGHTNESS, value_parser = clap::value_parser!(i32).range(0..))]
    pub additional_brightness: i32,

    /// Smallest accepted star, in pixels
    #[arg(long, default_value_t = MIN_PIXELS_ON_STAR)]
    pub min_pixels: usize,

    /// Largest accepted star, in pixels
    #[arg(long, default_value_t = MAX_PIXELS_ON_STAR)]
    pub max_pixels: usize,
}

impl DetectionOptions {
    pub fn to_params(&self) -> DetectionParams {
        DetectionParams {
            min_brightness: self.min_brightness,
            additional_brightness: self.additional_brightness,
            min_pixels: self.min_pixels,
            max_pixels: self.max_pixels,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AlignmentOptions {
    /// Brightest sources per frame used to estimate alignment
    #[arg(long, default_value = "50")]
    pub alignment_stars: usize,

    /// Agreeing source pairs required to accept an alignment
    #[arg(long, default_value = "3")]
    pub min_votes: usize,
}

impl AlignmentOptions {
    pub fn to_translator(&self, detection: &DetectionParams) -> StarOffsetTranslator {
        StarOffsetTranslator::new(detection.min_brightness, self.alignment_stars, self.min_votes)
    }
}
