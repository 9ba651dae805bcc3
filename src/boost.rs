/// Temporary brightness boost used to make faint stars separable for alignment
use crate::image::BrightnessGrid;
use crate::star_detection::DetectionParams;
use anyhow::Result;

/// Add `additional_brightness * coefficient` to every pixel whose current
/// value exceeds `min_brightness`.
///
/// A boost with `+1` followed by `-1` restores the grid exactly, provided the
/// boost moves pixels strictly further above the threshold. Applying the
/// same sign twice is not idempotent. The grid is left untouched when any
/// affected pixel would leave the `i32` range.
pub fn adjust_brightness(grid: &mut BrightnessGrid, params: &DetectionParams, coefficient: i32) -> Result<()> {
    let delta = params
        .additional_brightness
        .checked_mul(coefficient)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Brightness boost {} x {} overflows",
                params.additional_brightness,
                coefficient
            )
        })?;
    let threshold = params.min_brightness;

    if let Some(pixel) = grid
        .data()
        .iter()
        .find(|&&p| p > threshold && p.checked_add(delta).is_none())
    {
        return Err(anyhow::anyhow!(
            "Pixel value {} has no headroom for a brightness change of {}",
            pixel,
            delta
        ));
    }

    for pixel in grid.data_mut().iter_mut() {
        if *pixel > threshold {
            *pixel += delta;
        }
    }
    Ok(())
}

/// Scoped boost over a set of grids.
///
/// The grids are boosted on construction and restored when the guard is
/// dropped, including early returns and unwinding.
pub struct BrightnessBoost<'a> {
    grids: Vec<&'a mut BrightnessGrid>,
    params: DetectionParams,
}

impl<'a> BrightnessBoost<'a> {
    /// Boost every grid, or none of them when the boost cannot be reverted exactly
    pub fn apply(mut grids: Vec<&'a mut BrightnessGrid>, params: &DetectionParams) -> Result<Self> {
        if params.additional_brightness < 0 {
            return Err(anyhow::anyhow!(
                "Additional brightness must not be negative (got {})",
                params.additional_brightness
            ));
        }
        let ceiling = i32::MAX - params.additional_brightness;
        for grid in grids.iter() {
            let saturated = grid
                .data()
                .iter()
                .find(|&&p| p > ceiling && p > params.min_brightness);
            if let Some(&pixel) = saturated {
                return Err(anyhow::anyhow!(
                    "Pixel value {} leaves no headroom for a brightness boost of {}",
                    pixel,
                    params.additional_brightness
                ));
            }
        }

        for grid in grids.iter_mut() {
            adjust_brightness(grid, params, 1)?;
        }
        tracing::debug!(
            "Boosted {} grids by {} above {}",
            grids.len(),
            params.additional_brightness,
            params.min_brightness
        );
        Ok(Self {
            grids,
            params: *params,
        })
    }

    pub fn grids(&self) -> &[&'a mut BrightnessGrid] {
        &self.grids
    }

    pub fn grids_mut(&mut self) -> &mut [&'a mut BrightnessGrid] {
        &mut self.grids
    }
}

impl Drop for BrightnessBoost<'_> {
    fn drop(&mut self) {
        for grid in self.grids.iter_mut() {
            // Subtracting a boost that was applied cannot overflow
            if let Err(e) = adjust_brightness(grid, &self.params, -1) {
                tracing::error!("Failed to revert brightness boost: {:#}", e);
            }
        }
        tracing::debug!("Reverted brightness boost on {} grids", self.grids.len());
    }
}
