/// Translation-only registration between two images of the same field
use crate::image::BrightnessGrid;
use crate::star_detection::{detect_stars, DetectionParams, Star};
use anyhow::Result;
use nalgebra::Vector2;
use serde::Serialize;
use std::collections::HashMap;

/// Offset that maps source coordinates onto the target frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

impl Translation {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Whole-pixel offset, truncated toward zero
    pub fn to_pixels(&self) -> (i64, i64) {
        (self.dx.trunc() as i64, self.dy.trunc() as i64)
    }
}

/// Seam the pipeline aligns through. [`StarOffsetTranslator`] is the bundled
/// implementation.
pub trait ImageTranslator {
    /// Estimate the translation that moves `source` onto `target`
    fn find_translation(&self, source: &BrightnessGrid, target: &BrightnessGrid) -> Result<Translation>;
}

/// Offset voting over centre-to-centre displacements of the brightest
/// detections in both images
#[derive(Debug, Clone)]
pub struct StarOffsetTranslator {
    pub threshold: i32,
    /// Brightest detections per image that take part in the vote
    pub max_stars: usize,
    /// Votes the winning offset needs before it is trusted
    pub min_votes: usize,
    /// Largest component still considered a point source
    pub max_component_pixels: usize,
}

impl Default for StarOffsetTranslator {
    fn default() -> Self {
        Self {
            threshold: crate::star_detection::MIN_BRIGHTNESS_STAR,
            max_stars: 50,
            min_votes: 3,
            max_component_pixels: 400,
        }
    }
}

impl StarOffsetTranslator {
    pub fn new(threshold: i32, max_stars: usize, min_votes: usize) -> Self {
        Self {
            threshold,
            max_stars,
            min_votes,
            ..Self::default()
        }
    }

    fn brightest_centers(&self, grid: &BrightnessGrid) -> Vec<Vector2<f64>> {
        let params = DetectionParams {
            min_brightness: self.threshold,
            min_pixels: 1,
            max_pixels: self.max_component_pixels,
            ..DetectionParams::default()
        };
        let mut stars: Vec<Star> = detect_stars(grid, &params);
        stars.sort_by_key(|s| std::cmp::Reverse(s.total_signal()));
        stars
            .iter()
            .take(self.max_stars)
            .map(|s| {
                let (x, y) = s.center();
                Vector2::new(x, y)
            })
            .collect()
    }
}

impl ImageTranslator for StarOffsetTranslator {
    fn find_translation(&self, source: &BrightnessGrid, target: &BrightnessGrid) -> Result<Translation> {
        let source_centers = self.brightest_centers(source);
        let target_centers = self.brightest_centers(target);

        if source_centers.is_empty() || target_centers.is_empty() {
            return Err(anyhow::anyhow!(
                "Cannot estimate alignment: {} sources in source image, {} in target image",
                source_centers.len(),
                target_centers.len()
            ));
        }

        // Every source/target pair votes for its rounded displacement
        let mut votes: HashMap<(i64, i64), Vec<Vector2<f64>>> = HashMap::new();
        for s in &source_centers {
            for t in &target_centers {
                let offset = t - s;
                let bin = (offset.x.round() as i64, offset.y.round() as i64);
                votes.entry(bin).or_default().push(offset);
            }
        }

        // Ties resolve to the smallest displacement so the result is deterministic
        let (bin, offsets) = votes
            .into_iter()
            .max_by(|(a_bin, a), (b_bin, b)| {
                a.len()
                    .cmp(&b.len())
                    .then_with(|| (b_bin.0.abs() + b_bin.1.abs()).cmp(&(a_bin.0.abs() + a_bin.1.abs())))
                    .then_with(|| b_bin.cmp(a_bin))
            })
            .ok_or_else(|| anyhow::anyhow!("Cannot estimate alignment: no offset candidates"))?;

        if offsets.len() < self.min_votes {
            return Err(anyhow::anyhow!(
                "Cannot estimate alignment: best offset ({}, {}) has {} votes, need {}",
                bin.0,
                bin.1,
                offsets.len(),
                self.min_votes
            ));
        }

        let mean = offsets.iter().sum::<Vector2<f64>>() / offsets.len() as f64;
        tracing::debug!(
            "Alignment: {} source / {} target centres, offset ({:.2}, {:.2}) from {} votes",
            source_centers.len(),
            target_centers.len(),
            mean.x,
            mean.y,
            offsets.len()
        );

        Ok(Translation::new(mean.x, mean.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(points: &[(usize, usize)], width: usize, height: usize) -> BrightnessGrid {
        let mut grid = BrightnessGrid::new(width, height);
        for (i, &(x, y)) in points.iter().enumerate() {
            let value = 5000 + 1000 * i as i32;
            grid.set(x, y, value);
            grid.set(x + 1, y, value);
        }
        grid
    }

    const STARS: [(usize, usize); 5] = [(5, 5), (20, 8), (12, 25), (30, 30), (8, 34)];

    #[test]
    fn test_translation_truncates_toward_zero() {
        assert_eq!(Translation::new(2.9, -2.9).to_pixels(), (2, -2));
        assert_eq!(Translation::new(-0.4, 0.4).to_pixels(), (0, 0));
    }

    #[test]
    fn test_finds_known_offset() {
        let target = field(&STARS, 48, 48);
        let shifted: Vec<_> = STARS.iter().map(|&(x, y)| (x + 3, y + 2)).collect();
        let source = field(&shifted, 48, 48);

        let translation = StarOffsetTranslator::default()
            .find_translation(&source, &target)
            .unwrap();
        assert_eq!(translation.to_pixels(), (-3, -2));
    }

    #[test]
    fn test_identity_offset() {
        let grid = field(&STARS, 48, 48);
        let translation = StarOffsetTranslator::default()
            .find_translation(&grid, &grid)
            .unwrap();
        assert_eq!(translation, Translation::new(0.0, 0.0));
    }

    #[test]
    fn test_empty_image_is_an_error() {
        let grid = field(&STARS, 48, 48);
        let empty = BrightnessGrid::new(48, 48);
        let err = StarOffsetTranslator::default()
            .find_translation(&empty, &grid)
            .unwrap_err();
        assert!(err.to_string().contains("Cannot estimate alignment"));
    }

    #[test]
    fn test_too_few_votes_is_an_error() {
        let source = field(&STARS[..1], 48, 48);
        let target = field(&STARS[..1], 48, 48);
        assert!(StarOffsetTranslator::default()
            .find_translation(&source, &target)
            .is_err());

        let lenient = StarOffsetTranslator::new(2200, 50, 1);
        assert!(lenient.find_translation(&source, &target).is_ok());
    }
}
