/// Colour photometry and main-sequence relations for matched stars
///
/// All relations work in solar units unless noted otherwise.
use crate::matching::MatchedTriplet;
use serde::Serialize;
use std::f64::consts::PI;

/// Absolute magnitude of the Sun
pub const SUN_ABSOLUTE_MAGNITUDE: f64 = 4.83;
/// W m^-2 K^-4
pub const STEFAN_BOLTZMANN: f64 = 5.67036713e-8;
/// W
pub const SUN_LUMINOSITY: f64 = 3.827e26;
/// m
pub const SUN_RADIUS: f64 = 6.9551e8;

/// Magnitude difference between two fluxes
pub fn delta_m(reference_signal: f64, signal: f64) -> f64 {
    (reference_signal / signal).log10() / 0.4
}

/// B-V colour index, with both bands measured against the luminosity band
pub fn color_index(blue_signal: f64, visual_signal: f64, luminosity_signal: f64) -> f64 {
    delta_m(luminosity_signal, blue_signal) - delta_m(luminosity_signal, visual_signal)
}

/// Effective temperature in kelvin from B-V
pub fn temperature(color_index: f64) -> f64 {
    7920.0 / (color_index + 0.72)
}

fn main_sequence_polynomial(c: f64) -> f64 {
    (1.3948753e-6 * c.powf(8.0) - 8.7648505e-5 * c.powf(7.0) + 0.001944 * c.powi(6)
        - 0.0153264 * c.powi(5)
        - 0.0389616 * c.powi(4)
        + 1.1514965 * c.powi(3)
        - 4.7452887 * c.powi(2)
        + 9.6724702 * c
        + 7.8898473)
        / 10.0
}

/// Absolute magnitude read off a Hertzsprung-Russell main-sequence fit.
///
/// Red stars (B-V above 1.9) average the main fit with a quadratic branch.
pub fn absolute_magnitude(color_index: f64) -> f64 {
    let c = color_index * 10.0;
    if c > 19.0 {
        ((0.1581608 * c.powi(2) + 4.3310835 * c + 6.2940268) / 10.0 + main_sequence_polynomial(c)) / 2.0
    } else {
        main_sequence_polynomial(c)
    }
}

pub fn luminosity(absolute_magnitude: f64) -> f64 {
    2.512_f64.powf(SUN_ABSOLUTE_MAGNITUDE - absolute_magnitude)
}

pub fn mass(luminosity: f64) -> f64 {
    luminosity.powf(1.0 / 3.9)
}

/// Main-sequence lifetime in years
pub fn age(mass: f64) -> f64 {
    1e10 / mass.powi(3)
}

/// Radius from luminosity and temperature via Stefan-Boltzmann
pub fn radius(luminosity: f64, temperature: f64) -> f64 {
    (luminosity * SUN_LUMINOSITY / (4.0 * PI * STEFAN_BOLTZMANN * temperature.powi(4))).sqrt() / SUN_RADIUS
}

/// Mean density in solar mass per cubic solar radius
pub fn density(mass: f64, radius: f64) -> f64 {
    mass / (4.0 / 3.0 * PI * radius.powi(3))
}

/// Colour measurement of one matched star
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarMeasurement {
    pub center: (f64, f64),
    pub blue_signal: i64,
    pub visual_signal: i64,
    pub luminosity_signal: i64,
    pub color_index: f64,
    pub temperature: f64,
    pub absolute_magnitude: f64,
}

impl StarMeasurement {
    pub fn from_signals(center: (f64, f64), blue: i64, visual: i64, luminosity: i64) -> Self {
        let color_index = color_index(blue as f64, visual as f64, luminosity as f64);
        Self {
            center,
            blue_signal: blue,
            visual_signal: visual,
            luminosity_signal: luminosity,
            color_index,
            temperature: temperature(color_index),
            absolute_magnitude: absolute_magnitude(color_index),
        }
    }

    pub fn from_triplet(triplet: &MatchedTriplet<'_>) -> Self {
        Self::from_signals(
            triplet.blue.center(),
            triplet.blue.total_signal(),
            triplet.visual.total_signal(),
            triplet.luminosity.total_signal(),
        )
    }
}

/// Physical estimates for a single star
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StellarProperties {
    pub temperature: f64,
    pub luminosity: f64,
    pub mass: f64,
    pub radius: f64,
    pub density: f64,
    pub age: f64,
}

impl StellarProperties {
    pub fn from_measurement(measurement: &StarMeasurement) -> Self {
        let luminosity = luminosity(measurement.absolute_magnitude);
        let mass = mass(luminosity);
        let radius = radius(luminosity, measurement.temperature);
        Self {
            temperature: measurement.temperature,
            luminosity,
            mass,
            radius,
            density: density(mass, radius),
            age: age(mass),
        }
    }
}
