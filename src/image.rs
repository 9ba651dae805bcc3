use anyhow::{Context, Result};
use fitrs::{Fits, FitsData, FitsDataArray, HeaderValue};
use std::path::Path;

/// 2D array of pixel intensities, stored row-major.
///
/// Coordinates are `(x, y)` = (column, row), matching FITS `NAXIS1`/`NAXIS2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrightnessGrid {
    width: usize,
    height: usize,
    data: Vec<i32>,
}

impl BrightnessGrid {
    /// Create a zero-filled grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Build a grid from row slices. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(anyhow::anyhow!(
                    "Row {} has {} pixels, expected {}",
                    y,
                    row.len(),
                    width
                ));
            }
            data.extend(row);
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Load the primary HDU of a FITS file.
    ///
    /// `BZERO`/`BSCALE` are applied so pixel values are physical ADU, which is
    /// the scale detection thresholds are expressed in.
    pub fn from_file(path: &Path) -> Result<Self> {
        let fits = Fits::open(path)
            .with_context(|| format!("Failed to open FITS file: {}", path.display()))?;

        let hdu = fits
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("No primary HDU found in {}", path.display()))?;

        let naxis = integer_header(hdu.value("NAXIS"), "NAXIS")?;
        if naxis < 2 {
            return Err(anyhow::anyhow!(
                "FITS file {} does not contain 2D image data (NAXIS={})",
                path.display(),
                naxis
            ));
        }
        let width = axis_length(hdu.value("NAXIS1"), "NAXIS1")
            .with_context(|| format!("Invalid image dimensions in {}", path.display()))?;
        let height = axis_length(hdu.value("NAXIS2"), "NAXIS2")
            .with_context(|| format!("Invalid image dimensions in {}", path.display()))?;
        let pixel_count = width
            .checked_mul(height)
            .ok_or_else(|| anyhow::anyhow!("Image {}x{} in {} is too large", width, height, path.display()))?;
        let bit_depth = integer_header(hdu.value("BITPIX"), "BITPIX")?;

        let bzero = real_header(hdu.value("BZERO")).unwrap_or(0.0);
        let bscale = real_header(hdu.value("BSCALE")).unwrap_or(1.0);
        let physical = |raw: f64| {
            (bzero + bscale * raw)
                .round()
                .clamp(i32::MIN as f64, i32::MAX as f64) as i32
        };

        let data: Vec<i32> = match hdu.read_data() {
            FitsData::Characters(_) => {
                return Err(anyhow::anyhow!(
                    "FITS file {} contains character data, not image data",
                    path.display()
                ));
            }
            FitsData::IntegersI32(FitsDataArray { data, .. }) => data
                .into_iter()
                .map(|x| x.map(|raw| physical(raw as f64)).unwrap_or(0))
                .collect(),
            FitsData::IntegersU32(FitsDataArray { data, .. }) => data
                .into_iter()
                .map(|x| x.map(|raw| physical(raw as f64)).unwrap_or(0))
                .collect(),
            FitsData::FloatingPoint32(FitsDataArray { data, .. }) => {
                data.into_iter().map(|x| physical(x as f64)).collect()
            }
            FitsData::FloatingPoint64(FitsDataArray { data, .. }) => {
                data.into_iter().map(physical).collect()
            }
        };

        // Extra axes (e.g. NAXIS3 planes) are ignored; only the first plane is used
        if data.len() < pixel_count {
            return Err(anyhow::anyhow!(
                "Data size mismatch in {}: expected {} pixels, got {}",
                path.display(),
                pixel_count,
                data.len()
            ));
        }

        tracing::debug!(
            "Loaded {} ({}x{}, BITPIX={}, BZERO={}, BSCALE={})",
            path.display(),
            width,
            height,
            bit_depth,
            bzero,
            bscale
        );

        let mut data = data;
        data.truncate(pixel_count);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Linear index of `(x, y)`. Caller guarantees the coordinate is in bounds.
    pub(crate) fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        if x < self.width && y < self.height {
            Some(self.data[self.index(x, y)])
        } else {
            None
        }
    }

    /// Write a pixel. Out-of-bounds writes are dropped and reported as `false`.
    pub fn set(&mut self, x: usize, y: usize, value: i32) -> bool {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx] = value;
            true
        } else {
            false
        }
    }

    pub(crate) fn data(&self) -> &[i32] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [i32] {
        &mut self.data
    }

    /// Iterate `(x, y, value)` in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % width, i / width, v))
    }

    /// Move every pixel by `(dx, dy)` in place.
    ///
    /// Writes landing outside the grid are dropped, never wrapped or clamped.
    /// Destination pixels that receive no write keep their previous value.
    /// Sources are read from a snapshot, so a value is never carried twice.
    pub fn shift(&mut self, dx: i64, dy: i64) {
        if dx == 0 && dy == 0 {
            return;
        }

        let source = self.data.clone();
        let mut dropped = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                let tx = x as i64 + dx;
                let ty = y as i64 + dy;
                if self.in_bounds(tx, ty) {
                    let idx = self.index(tx as usize, ty as usize);
                    self.data[idx] = source[y * self.width + x];
                } else {
                    dropped += 1;
                }
            }
        }

        tracing::debug!(
            "Shifted {}x{} grid by ({}, {}), dropped {} out-of-range writes",
            self.width,
            self.height,
            dx,
            dy,
            dropped
        );
    }
}

fn integer_header(value: Option<&HeaderValue>, key: &str) -> Result<i64> {
    match value {
        Some(HeaderValue::IntegerNumber(n)) => Ok(*n as i64),
        Some(_) => Err(anyhow::anyhow!("{} is not an integer", key)),
        None => Err(anyhow::anyhow!("Missing {} header", key)),
    }
}

/// Length of an image axis; must be positive
fn axis_length(value: Option<&HeaderValue>, key: &str) -> Result<usize> {
    let length = integer_header(value, key)?;
    if length <= 0 {
        return Err(anyhow::anyhow!("{} must be positive (got {})", key, length));
    }
    usize::try_from(length).with_context(|| format!("{} is too large ({})", key, length))
}

fn real_header(value: Option<&HeaderValue>) -> Option<f64> {
    match value {
        Some(HeaderValue::IntegerNumber(n)) => Some(*n as f64),
        Some(HeaderValue::RealFloatingNumber(f)) => Some(*f),
        _ => None,
    }
}
