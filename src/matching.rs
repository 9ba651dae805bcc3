/// Cross-filter correspondence of stars by footprint overlap
use crate::star_detection::Star;
use std::collections::HashSet;

/// Three stars, one per filter, believed to be the same object
#[derive(Debug, Clone, Copy)]
pub struct MatchedTriplet<'a> {
    pub blue: &'a Star,
    pub visual: &'a Star,
    pub luminosity: &'a Star,
}

/// Parallel lists of corresponding stars. Entry `i` of each list forms one match.
#[derive(Debug, Default)]
pub struct MatchedStars<'a> {
    pub blue: Vec<&'a Star>,
    pub visual: Vec<&'a Star>,
    pub luminosity: Vec<&'a Star>,
}

impl<'a> MatchedStars<'a> {
    pub fn len(&self) -> usize {
        self.blue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blue.is_empty()
    }

    pub fn triplets(&self) -> impl Iterator<Item = MatchedTriplet<'a>> + '_ {
        self.blue
            .iter()
            .zip(&self.visual)
            .zip(&self.luminosity)
            .map(|((&blue, &visual), &luminosity)| MatchedTriplet {
                blue,
                visual,
                luminosity,
            })
    }
}

/// Pair every blue star with the first (visual, luminosity) combination whose
/// footprints share a pixel with it and with each other.
///
/// Blue stars without such a pair are dropped. Visual and luminosity stars are
/// not consumed by a match, so one of them may pair with several blue stars.
pub fn match_stars<'a>(blue: &'a [Star], visual: &'a [Star], luminosity: &'a [Star]) -> MatchedStars<'a> {
    let mut matched = MatchedStars::default();
    let mut used_visual = HashSet::new();
    let mut used_luminosity = HashSet::new();

    for blue_star in blue {
        let found = visual.iter().enumerate().find_map(|(vi, visual_star)| {
            luminosity
                .iter()
                .enumerate()
                .find(|(_, luminosity_star)| {
                    shares_pixel(blue_star, visual_star, luminosity_star)
                })
                .map(|(li, luminosity_star)| (vi, visual_star, li, luminosity_star))
        });

        if let Some((vi, visual_star, li, luminosity_star)) = found {
            let fresh_visual = used_visual.insert(vi);
            let fresh_luminosity = used_luminosity.insert(li);
            if !fresh_visual || !fresh_luminosity {
                tracing::warn!(
                    "Star at {:?} reuses visual star #{} / luminosity star #{} already matched to another blue star",
                    blue_star.center(),
                    vi,
                    li
                );
            }
            matched.blue.push(blue_star);
            matched.visual.push(visual_star);
            matched.luminosity.push(luminosity_star);
        }
    }

    tracing::debug!(
        "Matched {} of {} blue stars ({} visual, {} luminosity candidates)",
        matched.len(),
        blue.len(),
        visual.len(),
        luminosity.len()
    );

    matched
}

/// Three-way intersection of footprints is non-empty
fn shares_pixel(a: &Star, b: &Star, c: &Star) -> bool {
    a.footprint()
        .iter()
        .any(|p| b.footprint().contains(p) && c.footprint().contains(p))
}
