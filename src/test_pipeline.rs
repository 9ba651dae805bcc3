// End-to-end runs over synthetic three-filter frames.
//
// Each frame holds the same field of 2x2 stars on a noisy, below-threshold
// background. The blue and luminosity frames are displaced by whole pixels so
// the real alignment path has to recover the offsets before matching.

#[cfg(test)]
mod tests {
    use crate::alignment::StarOffsetTranslator;
    use crate::image::BrightnessGrid;
    use crate::photometry::{color_index, StellarProperties};
    use crate::pipeline::{analyze, FilterSet};
    use crate::star_detection::{DetectionParams, MIN_BRIGHTNESS_STAR};
    use rand::prelude::*;

    const SIZE: usize = 80;

    #[derive(Debug, Clone, Copy)]
    struct SyntheticStar {
        x: usize,
        y: usize,
        blue: i32,
        visual: i32,
        luminosity: i32,
    }

    /// Field positions in visual-frame coordinates, listed in row-major order
    fn field() -> Vec<SyntheticStar> {
        let positions = [
            (12, 10),
            (40, 12),
            (60, 15),
            (25, 28),
            (50, 33),
            (15, 47),
            (38, 55),
            (62, 60),
        ];
        positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| SyntheticStar {
                x,
                y,
                blue: 3000 + 700 * i as i32,
                visual: 4000 + 300 * i as i32,
                luminosity: 9000 + 500 * i as i32,
            })
            .collect()
    }

    fn render(
        stars: &[SyntheticStar],
        band: impl Fn(&SyntheticStar) -> i32,
        offset: (usize, usize),
        rng: &mut StdRng,
    ) -> BrightnessGrid {
        let mut grid = BrightnessGrid::new(SIZE, SIZE);
        for y in 0..SIZE {
            for x in 0..SIZE {
                grid.set(x, y, rng.gen_range(0..MIN_BRIGHTNESS_STAR - 200));
            }
        }
        for star in stars {
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                grid.set(star.x + offset.0 + dx, star.y + offset.1 + dy, band(star));
            }
        }
        grid
    }

    /// Blue is displaced by (+3, +2) and luminosity by (+1, +4) relative to visual
    fn synthetic_frames(seed: u64) -> (Vec<SyntheticStar>, FilterSet<BrightnessGrid>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = field();
        let frames = FilterSet::new(
            render(&stars, |s| s.blue, (3, 2), &mut rng),
            render(&stars, |s| s.visual, (0, 0), &mut rng),
            render(&stars, |s| s.luminosity, (1, 4), &mut rng),
        );
        (stars, frames)
    }

    #[test]
    fn test_full_pipeline_recovers_all_stars() {
        let (stars, mut frames) = synthetic_frames(7);
        let report = analyze(
            &mut frames,
            &DetectionParams::default(),
            &StarOffsetTranslator::default(),
        )
        .unwrap();

        assert_eq!(report.offsets.blue, (-3, -2));
        assert_eq!(report.offsets.visual, (0, 0));
        assert_eq!(report.offsets.luminosity, (-1, -4));
        assert_eq!(report.detected, FilterSet::new(8, 8, 8));
        assert_eq!(report.measurements.len(), stars.len());

        for (m, star) in report.measurements.iter().zip(&stars) {
            assert_eq!(m.center, (star.x as f64 + 0.5, star.y as f64 + 0.5));
            assert_eq!(m.blue_signal, 4 * star.blue as i64);
            assert_eq!(m.visual_signal, 4 * star.visual as i64);
            assert_eq!(m.luminosity_signal, 4 * star.luminosity as i64);

            let expected = color_index(
                4.0 * star.blue as f64,
                4.0 * star.visual as f64,
                4.0 * star.luminosity as f64,
            );
            assert!((m.color_index - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_frames_are_aligned_and_unboosted_afterwards() {
        let (stars, mut frames) = synthetic_frames(11);
        analyze(
            &mut frames,
            &DetectionParams::default(),
            &StarOffsetTranslator::default(),
        )
        .unwrap();

        for star in &stars {
            assert_eq!(frames.blue.get(star.x, star.y), Some(star.blue));
            assert_eq!(frames.visual.get(star.x + 1, star.y + 1), Some(star.visual));
            assert_eq!(frames.luminosity.get(star.x, star.y + 1), Some(star.luminosity));
        }
        let max_visual = frames.visual.pixels().map(|(_, _, v)| v).max().unwrap();
        assert!(max_visual < 20000);
    }

    #[test]
    fn test_selected_star_properties() {
        let (_, mut frames) = synthetic_frames(3);
        let report = analyze(
            &mut frames,
            &DetectionParams::default(),
            &StarOffsetTranslator::default(),
        )
        .unwrap();

        let measurement = report.select(2).unwrap();
        let properties = StellarProperties::from_measurement(measurement);
        assert!(properties.temperature.is_finite());
        assert!(properties.mass > 0.0);
        assert!(properties.radius > 0.0);
        assert!(report.select(report.measurements.len()).is_err());
    }

    #[test]
    fn test_missing_star_in_one_filter_is_dropped() {
        let mut rng = StdRng::seed_from_u64(5);
        let stars = field();
        let mut frames = FilterSet::new(
            render(&stars, |s| s.blue, (0, 0), &mut rng),
            render(&stars, |s| s.visual, (0, 0), &mut rng),
            render(&stars[1..], |s| s.luminosity, (0, 0), &mut rng),
        );

        let report = analyze(
            &mut frames,
            &DetectionParams::default(),
            &StarOffsetTranslator::default(),
        )
        .unwrap();

        assert_eq!(report.detected, FilterSet::new(8, 8, 7));
        assert_eq!(report.measurements.len(), 7);
        assert_eq!(report.measurements[0].center, (40.5, 12.5));
    }

    #[test]
    fn test_featureless_frame_fails_alignment_and_restores() {
        let mut rng = StdRng::seed_from_u64(9);
        let stars = field();
        let mut frames = FilterSet::new(
            render(&stars, |s| s.blue, (0, 0), &mut rng),
            render(&[], |s| s.visual, (0, 0), &mut rng),
            render(&stars, |s| s.luminosity, (0, 0), &mut rng),
        );
        let original = frames.clone();

        let err = analyze(
            &mut frames,
            &DetectionParams::default(),
            &StarOffsetTranslator::default(),
        )
        .unwrap_err();

        assert!(format!("{:#}", err).contains("Cannot estimate alignment"));
        assert_eq!(frames, original);
    }
}
