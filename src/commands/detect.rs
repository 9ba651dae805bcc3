use crate::image::BrightnessGrid;
use crate::star_detection::{detect_stars, DetectionParams, Star};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct DetectedStarRow {
    index: usize,
    x: f64,
    y: f64,
    pixels: usize,
    total_signal: i64,
}

impl DetectedStarRow {
    fn new(index: usize, star: &Star) -> Self {
        let (x, y) = star.center();
        Self {
            index,
            x,
            y,
            pixels: star.pixel_count(),
            total_signal: star.total_signal(),
        }
    }
}

pub fn detect_frame(path: &str, format: &str, params: &DetectionParams) -> Result<()> {
    params.validate()?;

    let path = Path::new(path);
    let grid = BrightnessGrid::from_file(path)?;
    let stars = detect_stars(&grid, params);
    let rows: Vec<DetectedStarRow> = stars
        .iter()
        .enumerate()
        .map(|(i, s)| DetectedStarRow::new(i, s))
        .collect();

    match format.to_lowercase().as_str() {
        "json" => {
            let output = serde_json::json!({
                "file": path.display().to_string(),
                "width": grid.width(),
                "height": grid.height(),
                "params": params,
                "stars": rows,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "csv" => {
            println!("index,x,y,pixels,total_signal");
            for row in &rows {
                println!(
                    "{},{:.2},{:.2},{},{}",
                    row.index, row.x, row.y, row.pixels, row.total_signal
                );
            }
        }
        _ => {
            println!(
                "FITS File: {} ({} x {})",
                path.display(),
                grid.width(),
                grid.height()
            );
            println!(
                "Threshold: {} ADU, star size: {}-{} pixels\n",
                params.min_brightness, params.min_pixels, params.max_pixels
            );
            println!(
                "{:<8} {:<10} {:<10} {:<8} {:<14}",
                "Index", "X", "Y", "Pixels", "Total Signal"
            );
            println!("{:-<54}", "");
            for row in &rows {
                println!(
                    "{:<8} {:<10.2} {:<10.2} {:<8} {:<14}",
                    row.index, row.x, row.y, row.pixels, row.total_signal
                );
            }
            println!("\nTotal: {} stars", rows.len());
        }
    }

    Ok(())
}
