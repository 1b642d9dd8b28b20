// palette.rs

use log::debug;
use plotters::style::RGBColor;
use std::collections::BTreeMap;

/// Perceptually uniform colour scales used by the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorScale {
    /// Purple -> teal -> yellow. Used for component lines.
    Viridis,
    /// Black -> purple -> orange -> pale yellow. Used for the heat map.
    Magma,
}

// Samples of the matplotlib colour maps at t = 0, 1/8, ..., 1.
const VIRIDIS_ANCHORS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 145, 140),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

const MAGMA_ANCHORS: [(u8, u8, u8); 9] = [
    (0, 0, 4),
    (28, 16, 68),
    (79, 18, 123),
    (129, 37, 129),
    (181, 54, 122),
    (229, 80, 100),
    (251, 135, 97),
    (254, 194, 135),
    (252, 253, 191),
];

impl ColorScale {
    fn anchors(&self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorScale::Viridis => &VIRIDIS_ANCHORS,
            ColorScale::Magma => &MAGMA_ANCHORS,
        }
    }

    /// Colour at `t` in `[0, 1]`; values outside saturate to the end colours.
    pub(crate) fn at(&self, t: f64) -> RGBColor {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (anchors.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(anchors.len() - 2);
        let frac = scaled - lower as f64;
        let (r0, g0, b0) = anchors[lower];
        let (r1, g1, b1) = anchors[lower + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    /// Colour for `value` on a fixed `[min, max]` scale.
    pub(crate) fn normalized(&self, value: f64, min: f64, max: f64) -> RGBColor {
        self.at((value - min) / (max - min))
    }
}

/// Legend label for a 1-based component number.
pub(crate) fn component_label(number: usize) -> String {
    format!("PC {}", number)
}

/// Maps `PC 1 .. PC k` to colours sampled evenly across viridis.
///
/// Built once per run and shared by every score and eigenspectra chart so a
/// component keeps its colour across all of them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComponentPalette {
    colors: BTreeMap<String, (u8, u8, u8)>,
}

impl ComponentPalette {
    pub(crate) fn new(num_components: usize) -> Self {
        let colors = (1..=num_components)
            .map(|number| {
                let t = if num_components > 1 {
                    (number - 1) as f64 / (num_components - 1) as f64
                } else {
                    0.0
                };
                let RGBColor(r, g, b) = ColorScale::Viridis.at(t);
                (component_label(number), (r, g, b))
            })
            .collect::<BTreeMap<_, _>>();
        debug!("Component palette: {:?}", colors);
        Self { colors }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }

    pub(crate) fn get(&self, label: &str) -> Option<RGBColor> {
        self.colors
            .get(label)
            .map(|&(r, g, b)| RGBColor(r, g, b))
    }

    #[cfg(test)]
    pub(crate) fn for_component(&self, number: usize) -> Option<RGBColor> {
        self.get(&component_label(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: RGBColor) -> (u8, u8, u8) {
        (c.0, c.1, c.2)
    }

    #[test]
    fn scale_endpoints_match_anchor_table() {
        assert_eq!(rgb(ColorScale::Viridis.at(0.0)), (68, 1, 84));
        assert_eq!(rgb(ColorScale::Viridis.at(1.0)), (253, 231, 37));
        assert_eq!(rgb(ColorScale::Magma.at(0.0)), (0, 0, 4));
        assert_eq!(rgb(ColorScale::Magma.at(1.0)), (252, 253, 191));
    }

    #[test]
    fn out_of_range_values_saturate() {
        assert_eq!(
            rgb(ColorScale::Magma.normalized(0.9, -0.25, 0.25)),
            rgb(ColorScale::Magma.at(1.0))
        );
        assert_eq!(
            rgb(ColorScale::Magma.normalized(-3.0, -0.25, 0.25)),
            rgb(ColorScale::Magma.at(0.0))
        );
        assert_eq!(
            rgb(ColorScale::Magma.normalized(0.0, -0.25, 0.25)),
            rgb(ColorScale::Magma.at(0.5))
        );
    }

    #[test]
    fn palette_spans_the_scale_evenly() {
        let palette = ComponentPalette::new(5);
        assert_eq!(palette.len(), 5);
        assert_eq!(
            palette.get("PC 1").map(rgb),
            Some(rgb(ColorScale::Viridis.at(0.0)))
        );
        assert_eq!(
            palette.get("PC 3").map(rgb),
            Some(rgb(ColorScale::Viridis.at(0.5)))
        );
        assert_eq!(
            palette.get("PC 5").map(rgb),
            Some(rgb(ColorScale::Viridis.at(1.0)))
        );
        assert!(palette.get("PC 6").is_none());
    }

    #[test]
    fn single_component_takes_the_start_colour() {
        let palette = ComponentPalette::new(1);
        assert_eq!(
            palette.for_component(1).map(rgb),
            Some(rgb(ColorScale::Viridis.at(0.0)))
        );
    }
}
