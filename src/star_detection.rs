/// Star segmentation by 4-connected flood fill over a brightness threshold
use crate::image::BrightnessGrid;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

/// Minimum intensity for a pixel to belong to a star
pub const MIN_BRIGHTNESS_STAR: i32 = 2200;
/// Boost added to bright pixels while estimating alignment
pub const ADDITIONAL_BRIGHTNESS: i32 = 20000;
/// Smallest accepted star footprint, in pixels
pub const MIN_PIXELS_ON_STAR: usize = 2;
/// Largest accepted star footprint, in pixels
pub const MAX_PIXELS_ON_STAR: usize = 4;

/// Detection parameters shared by segmentation and brightness boosting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionParams {
    pub min_brightness: i32,
    pub additional_brightness: i32,
    pub min_pixels: usize,
    pub max_pixels: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_brightness: MIN_BRIGHTNESS_STAR,
            additional_brightness: ADDITIONAL_BRIGHTNESS,
            min_pixels: MIN_PIXELS_ON_STAR,
            max_pixels: MAX_PIXELS_ON_STAR,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_pixels == 0 {
            return Err(anyhow::anyhow!("Minimum star size must be at least 1 pixel"));
        }
        if self.min_pixels > self.max_pixels {
            return Err(anyhow::anyhow!(
                "Minimum star size ({}) exceeds maximum star size ({})",
                self.min_pixels,
                self.max_pixels
            ));
        }
        if self.additional_brightness < 0 {
            return Err(anyhow::anyhow!(
                "Additional brightness must not be negative (got {})",
                self.additional_brightness
            ));
        }
        Ok(())
    }

    fn accepts_size(&self, pixel_count: usize) -> bool {
        (self.min_pixels..=self.max_pixels).contains(&pixel_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PixelCoordinate {
    pub x: usize,
    pub y: usize,
}

impl PixelCoordinate {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A detected star: a maximal 4-connected set of bright pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Star {
    total_signal: i64,
    footprint: BTreeSet<PixelCoordinate>,
}

impl Star {
    /// Sum of intensities over the footprint
    pub fn total_signal(&self) -> i64 {
        self.total_signal
    }

    pub fn footprint(&self) -> &BTreeSet<PixelCoordinate> {
        &self.footprint
    }

    pub fn pixel_count(&self) -> usize {
        self.footprint.len()
    }

    /// Mean footprint coordinate as `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        let n = self.footprint.len().max(1) as f64;
        let (sx, sy) = self
            .footprint
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        (sx / n, sy / n)
    }

    /// True when the two footprints share at least one pixel
    pub fn overlaps(&self, other: &Star) -> bool {
        self.footprint
            .intersection(&other.footprint)
            .next()
            .is_some()
    }
}

/// Accumulates a star while its component is being filled
#[derive(Default)]
struct StarBuilder {
    total_signal: i64,
    footprint: BTreeSet<PixelCoordinate>,
}

impl StarBuilder {
    fn absorb(&mut self, coordinate: PixelCoordinate, signal: i32) {
        if self.footprint.insert(coordinate) {
            self.total_signal += signal as i64;
        }
    }

    fn len(&self) -> usize {
        self.footprint.len()
    }

    fn finish(self) -> Star {
        Star {
            total_signal: self.total_signal,
            footprint: self.footprint,
        }
    }
}

/// Segment a grid into stars.
///
/// Every pixel is visited once. Pixels at or above `min_brightness` are grouped
/// into maximal 4-connected components by breadth-first fill; components whose
/// size lies outside `[min_pixels, max_pixels]` are discarded.
pub fn detect_stars(grid: &BrightnessGrid, params: &DetectionParams) -> Vec<Star> {
    let width = grid.width();
    let height = grid.height();
    let data = grid.data();
    let threshold = params.min_brightness;

    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();
    let mut stars = Vec::new();

    let mut components = 0usize;
    let mut too_small = 0usize;
    let mut too_large = 0usize;

    for y in 0..height {
        for x in 0..width {
            let seed = grid.index(x, y);
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            if data[seed] < threshold {
                continue;
            }

            components += 1;
            let mut star = StarBuilder::default();
            queue.push_back((x, y));

            while let Some((px, py)) = queue.pop_front() {
                star.absorb(PixelCoordinate::new(px, py), data[grid.index(px, py)]);

                // up, left, right, down
                let neighbors = [
                    (px as i64, py as i64 - 1),
                    (px as i64 - 1, py as i64),
                    (px as i64 + 1, py as i64),
                    (px as i64, py as i64 + 1),
                ];
                for (nx, ny) in neighbors {
                    if !grid.in_bounds(nx, ny) {
                        continue;
                    }
                    let idx = grid.index(nx as usize, ny as usize);
                    if !visited[idx] && data[idx] >= threshold {
                        visited[idx] = true;
                        queue.push_back((nx as usize, ny as usize));
                    }
                }
            }

            let size = star.len();
            if params.accepts_size(size) {
                stars.push(star.finish());
            } else if size < params.min_pixels {
                too_small += 1;
            } else {
                too_large += 1;
            }
        }
    }

    tracing::debug!(
        "Segmented {}x{} grid: {} components, {} stars kept, {} too small, {} too large",
        width,
        height,
        components,
        stars.len(),
        too_small,
        too_large
    );

    stars
}
