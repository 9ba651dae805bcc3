use crate::alignment::ImageTranslator;
use crate::image::BrightnessGrid;
use crate::photometry::StellarProperties;
use crate::pipeline::{analyze, AnalysisReport, FilterSet};
use crate::star_detection::DetectionParams;
use crate::utils::{format_list, prompt_index};
use anyhow::Result;
use std::path::Path;

pub struct FramePaths<'a> {
    pub blue: &'a str,
    pub visual: &'a str,
    pub luminosity: &'a str,
}

pub fn analyze_frames(
    paths: &FramePaths<'_>,
    index: Option<usize>,
    format: &str,
    params: &DetectionParams,
    translator: &dyn ImageTranslator,
) -> Result<()> {
    let mut images = FilterSet::new(
        BrightnessGrid::from_file(Path::new(paths.blue))?,
        BrightnessGrid::from_file(Path::new(paths.visual))?,
        BrightnessGrid::from_file(Path::new(paths.luminosity))?,
    );

    let report = analyze(&mut images, params, translator)?;

    match format.to_lowercase().as_str() {
        "json" => output_json(&report, index),
        _ => output_table(&report, index),
    }
}

fn resolve_index(index: Option<usize>, prompt_on_stderr: bool) -> Result<usize> {
    if let Some(index) = index {
        return Ok(index);
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let prompt = "Enter index of pivot star: ";
    if prompt_on_stderr {
        prompt_index(&mut input, &mut std::io::stderr(), prompt)
    } else {
        prompt_index(&mut input, &mut std::io::stdout(), prompt)
    }
}

fn output_table(report: &AnalysisReport, index: Option<usize>) -> Result<()> {
    println!(
        "Detected stars - blue: {}, visual: {}, luminosity: {}",
        report.detected.blue, report.detected.visual, report.detected.luminosity
    );
    println!("Matched stars: {}", report.measurements.len());

    if !report.measurements.is_empty() {
        println!();
        println!(
            "{:<6} {:<16} {:<12} {:<12} {:<12} {:<10} {:<12} {:<10}",
            "Index", "Position", "Blue", "Visual", "Luminosity", "B-V", "Temp (K)", "Abs Mag"
        );
        println!("{:-<96}", "");
        for (i, m) in report.measurements.iter().enumerate() {
            println!(
                "{:<6} {:<16} {:<12} {:<12} {:<12} {:<10.4} {:<12.0} {:<10.4}",
                i,
                format!("({:.1}, {:.1})", m.center.0, m.center.1),
                m.blue_signal,
                m.visual_signal,
                m.luminosity_signal,
                m.color_index,
                m.temperature,
                m.absolute_magnitude
            );
        }
        println!();
    }

    println!("Color indexes: {}", format_list(&report.color_indexes(), 4));
    println!(
        "Absolute magnitudes: {}",
        format_list(&report.absolute_magnitudes(), 4)
    );

    // Nothing to prompt for when no star survived matching
    report.ensure_selectable()?;

    let index = resolve_index(index, false)?;
    let measurement = report.select(index)?;
    let properties = StellarProperties::from_measurement(measurement);

    println!();
    println!("Star {}:", index);
    println!("  Temperature: {:.0} K", properties.temperature);
    println!("  Mass: {}", properties.mass);
    println!("  Radius: {}", properties.radius);
    println!("  Density: {}", properties.density);
    println!("  Luminosity: {}", properties.luminosity);
    println!("  Age: {}", properties.age);

    Ok(())
}

fn output_json(report: &AnalysisReport, index: Option<usize>) -> Result<()> {
    report.ensure_selectable()?;

    let index = resolve_index(index, true)?;
    let properties = StellarProperties::from_measurement(report.select(index)?);

    let output = serde_json::json!({
        "offsets": report.offsets,
        "detected": report.detected,
        "matched": report.measurements.len(),
        "measurements": report.measurements,
        "selected": {
            "index": index,
            "properties": properties,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
