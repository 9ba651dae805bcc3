/// Multi-filter analysis: align, segment, match and measure
use crate::alignment::ImageTranslator;
use crate::boost::BrightnessBoost;
use crate::image::BrightnessGrid;
use crate::matching::match_stars;
use crate::photometry::StarMeasurement;
use crate::star_detection::{detect_stars, DetectionParams, Star};
use anyhow::Result;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Filter {
    Blue,
    Visual,
    Luminosity,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Blue => write!(f, "blue"),
            Filter::Visual => write!(f, "visual"),
            Filter::Luminosity => write!(f, "luminosity"),
        }
    }
}

/// One value per filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSet<T> {
    pub blue: T,
    pub visual: T,
    pub luminosity: T,
}

impl<T> FilterSet<T> {
    pub fn new(blue: T, visual: T, luminosity: T) -> Self {
        Self {
            blue,
            visual,
            luminosity,
        }
    }

    pub fn as_ref(&self) -> FilterSet<&T> {
        FilterSet {
            blue: &self.blue,
            visual: &self.visual,
            luminosity: &self.luminosity,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Filter, T) -> U) -> FilterSet<U> {
        FilterSet {
            blue: f(Filter::Blue, self.blue),
            visual: f(Filter::Visual, self.visual),
            luminosity: f(Filter::Luminosity, self.luminosity),
        }
    }
}

/// Shift the blue and luminosity images into the visual image's frame.
///
/// Translations are estimated and applied while the grids are boosted; the
/// boost is reverted before returning, whether or not alignment succeeded.
/// Returns the whole-pixel offset applied to each filter.
pub fn align_images(
    images: &mut FilterSet<BrightnessGrid>,
    params: &DetectionParams,
    translator: &dyn ImageTranslator,
) -> Result<FilterSet<(i64, i64)>> {
    let FilterSet {
        blue,
        visual,
        luminosity,
    } = images;

    let mut boost = BrightnessBoost::apply(vec![visual, blue, luminosity], params)?;
    let (reference, targets) = boost
        .grids_mut()
        .split_first_mut()
        .ok_or_else(|| anyhow::anyhow!("No reference image to align against"))?;

    let mut offsets = Vec::with_capacity(targets.len());
    for (filter, target) in [Filter::Blue, Filter::Luminosity].into_iter().zip(targets.iter_mut()) {
        let translation = translator
            .find_translation(&**target, &**reference)
            .map_err(|e| e.context(format!("Failed to align {} image onto visual image", filter)))?;
        let (dx, dy) = translation.to_pixels();
        tracing::info!(
            "Aligned {} image: translation ({:.2}, {:.2}), shifting by ({}, {})",
            filter,
            translation.dx,
            translation.dy,
            dx,
            dy
        );
        target.shift(dx, dy);
        offsets.push((dx, dy));
    }

    Ok(FilterSet::new(offsets[0], (0, 0), offsets[1]))
}

/// Result of a full multi-filter run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub offsets: FilterSet<(i64, i64)>,
    pub detected: FilterSet<usize>,
    pub measurements: Vec<StarMeasurement>,
}

impl AnalysisReport {
    pub fn color_indexes(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.color_index).collect()
    }

    pub fn absolute_magnitudes(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.absolute_magnitude).collect()
    }

    /// Fails when no star survived matching, so there is nothing to pick from
    pub fn ensure_selectable(&self) -> Result<()> {
        anyhow::ensure!(
            !self.measurements.is_empty(),
            "No stars were matched across all three filters; nothing to select"
        );
        Ok(())
    }

    /// Pick a matched star by its position in the report
    pub fn select(&self, index: usize) -> Result<&StarMeasurement> {
        self.ensure_selectable()?;
        self.measurements.get(index).ok_or_else(|| {
            anyhow::anyhow!(
                "Star index {} is out of range: expected 0..={}",
                index,
                self.measurements.len() - 1
            )
        })
    }
}

/// Segment each filter independently
pub fn segment_all(images: &FilterSet<BrightnessGrid>, params: &DetectionParams) -> FilterSet<Vec<Star>> {
    images.as_ref().map(|filter, grid| {
        let stars = detect_stars(grid, params);
        tracing::info!("Detected {} stars in {} image", stars.len(), filter);
        stars
    })
}

/// Align, segment, match and measure three filter images.
///
/// The grids are left shifted into the visual frame.
pub fn analyze(
    images: &mut FilterSet<BrightnessGrid>,
    params: &DetectionParams,
    translator: &dyn ImageTranslator,
) -> Result<AnalysisReport> {
    params.validate()?;

    let offsets = align_images(images, params, translator)?;
    let stars = segment_all(images, params);

    let matched = match_stars(&stars.blue, &stars.visual, &stars.luminosity);
    tracing::info!("Matched {} stars across all filters", matched.len());

    let measurements = matched
        .triplets()
        .map(|triplet| StarMeasurement::from_triplet(&triplet))
        .collect();

    Ok(AnalysisReport {
        offsets,
        detected: stars.as_ref().map(|_, s| s.len()),
        measurements,
    })
}
