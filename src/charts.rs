// charts.rs
//
// Variance, score (flat and stacked) and eigenspectra charts.

// --- External Crate Imports ---
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::ops::Range;

use crate::experiment::ExperimentClass;
use crate::palette::{component_label, ComponentPalette};
use crate::render::{
    clip_x, dashed_vertical, draw_frame, draw_legend, draw_x_ticks, drawing_err, legend_extent, padded_range,
    Canvas, Figure, FigureSize, LegendEntry, PlotError, Result, SERIES_BLUE,
};
use crate::tables::{ComponentTable, TableError, VarianceTable};

const AXIS_FONT_PT: f64 = 10.0;
const TICK_FONT_PT: f64 = 9.0;

const VARIANCE_FIGURE: FigureSize = FigureSize::new(6.0, 4.5);
const PORTRAIT_FIGURE: FigureSize = FigureSize::new(8.3, 11.7);

/// A labelled line ready to draw.
#[derive(Debug, Clone)]
pub(crate) struct PlotSeries {
    pub(crate) label: String,
    pub(crate) color: RGBColor,
    pub(crate) points: Vec<(f64, f64)>,
}

impl PlotSeries {
    fn legend_entry(&self) -> LegendEntry {
        LegendEntry {
            label: self.label.clone(),
            color: self.color,
        }
    }
}

/// Picks the first `k` component columns of `table` and pairs each with its
/// palette colour, its x values and its y values shifted down by
/// `i * separation`.
fn component_series<F>(
    table: &ComponentTable,
    num_components: usize,
    palette: &ComponentPalette,
    separation: f64,
    x_of_row: F,
) -> std::result::Result<Vec<PlotSeries>, SeriesError>
where
    F: Fn(usize, f64) -> f64,
{
    let axis = table.axis();
    table
        .components(num_components)?
        .into_iter()
        .enumerate()
        .map(|(i, component)| -> std::result::Result<PlotSeries, SeriesError> {
            let label = component_label(component.number);
            let color = palette
                .get(&label)
                .ok_or_else(|| PlotError::MissingColor(label.clone()))?;
            let offset = i as f64 * separation;
            let points = component
                .values
                .iter()
                .enumerate()
                .map(|(row, y)| (x_of_row(row, axis[row]), y - offset))
                .collect();
            Ok(PlotSeries {
                label,
                color,
                points,
            })
        })
        .collect()
}

/// Failure to assemble chart series from a table.
#[derive(thiserror::Error, Debug)]
pub(crate) enum SeriesError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}

fn mesh_fonts(canvas: Canvas) -> (TextStyle<'static>, TextStyle<'static>) {
    (canvas.text(TICK_FONT_PT), canvas.text(AXIS_FONT_PT))
}

// --- Variance chart ---

/// Percent variance per component, with a magnified inset of the tail.
pub(crate) struct VarianceChart<'a> {
    table: &'a VarianceTable,
    num_components: usize,
}

impl<'a> VarianceChart<'a> {
    pub(crate) fn new(table: &'a VarianceTable, num_components: usize) -> Self {
        Self {
            table,
            num_components,
        }
    }

    pub(crate) fn x_range(&self) -> (f64, f64) {
        (0.0, self.num_components as f64)
    }

    pub(crate) fn inset_x_range(&self) -> (f64, f64) {
        (2.0, self.num_components as f64)
    }

    /// Tick positions every 2 components from 0 to `k + 4`.
    pub(crate) fn ticks(&self) -> Vec<f64> {
        (0..=self.num_components + 4)
            .step_by(2)
            .map(|t| t as f64)
            .collect()
    }

    pub(crate) fn main_points(&self) -> Vec<(f64, f64)> {
        self.table.points(0, self.num_components)
    }

    pub(crate) fn inset_points(&self) -> Vec<(f64, f64)> {
        self.table.points(2, self.num_components)
    }

    fn draw_line_with_markers<DB: DrawingBackend>(
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        points: &[(f64, f64)],
        canvas: Canvas,
    ) -> Result<()> {
        let points: Vec<(f64, f64)> = points.iter().copied().filter(|p| p.1.is_finite()).collect();
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                SERIES_BLUE.stroke_width(canvas.upx(1.5)),
            ))
            .map_err(drawing_err)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, canvas.upx(2.0), SERIES_BLUE.filled())),
            )
            .map_err(drawing_err)?;
        Ok(())
    }
}

/// Widens an empty or inverted window so plotters can map it.
fn usable_window(lo: f64, hi: f64) -> Range<f64> {
    if hi > lo {
        lo..hi
    } else {
        (lo - 0.5)..(lo + 0.5)
    }
}

impl Figure for VarianceChart<'_> {
    fn size(&self) -> FigureSize {
        VARIANCE_FIGURE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, canvas: Canvas) -> Result<()> {
        let (tick_font, axis_font) = mesh_fonts(canvas);
        let (x_lo, x_hi) = self.x_range();
        let main_points = self.main_points();
        let y_range = padded_range(main_points.iter().map(|p| p.1));
        let ticks: Vec<f64> = self
            .ticks()
            .into_iter()
            .filter(|t| *t >= x_lo && *t <= x_hi)
            .collect();

        let mut chart = ChartBuilder::on(root)
            .margin(canvas.px(14.0))
            .x_label_area_size(canvas.px(30.0))
            .y_label_area_size(canvas.px(38.0))
            .build_cartesian_2d(usable_window(x_lo, x_hi), y_range.clone())
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .x_desc("PCs")
            .y_desc("% Variance")
            .label_style(tick_font.clone())
            .axis_desc_style(axis_font)
            .draw()
            .map_err(drawing_err)?;

        let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
        draw_frame(root, (x_pixels.clone(), y_pixels.clone()), canvas)?;
        let tick_positions: Vec<(i32, String)> = ticks
            .iter()
            .map(|t| (chart.backend_coord(&(*t, y_range.start)).0, format!("{:.0}", t)))
            .collect();
        draw_x_ticks(root, &tick_positions, y_pixels.end, canvas)?;
        Self::draw_line_with_markers(&mut chart, &main_points, canvas)?;

        // Inset: centre-right, 70% x 60% of the parent axes.
        let plot_w = x_pixels.end - x_pixels.start;
        let plot_h = y_pixels.end - y_pixels.start;
        let inset_w = (plot_w as f64 * 0.7) as i32;
        let inset_h = (plot_h as f64 * 0.6) as i32;
        let border_pad = canvas.px(5.0);
        let inset_x = x_pixels.end - border_pad - inset_w;
        let inset_y = y_pixels.start + (plot_h - inset_h) / 2;
        let inset_area = pixel_window(root, &(inset_x..inset_x + inset_w), &(inset_y..inset_y + inset_h));
        if canvas.opaque {
            inset_area.fill(&WHITE).map_err(drawing_err)?;
        }

        let inset_points = self.inset_points();
        let (inset_lo, inset_hi) = self.inset_x_range();
        let mut inset = ChartBuilder::on(&inset_area)
            .margin(canvas.px(2.0))
            .x_label_area_size(canvas.px(16.0))
            .y_label_area_size(canvas.px(30.0))
            .build_cartesian_2d(
                usable_window(inset_lo, inset_hi),
                padded_range(inset_points.iter().map(|p| p.1)),
            )
            .map_err(drawing_err)?;
        inset
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|x| format!("{:.0}", x))
            .label_style(tick_font)
            .draw()
            .map_err(drawing_err)?;
        draw_frame(root, inset.plotting_area().get_pixel_range(), canvas)?;
        Self::draw_line_with_markers(&mut inset, &inset_points, canvas)?;

        Ok(())
    }
}

/// Sub-area of `root` covering the absolute pixel window `xs x ys`.
fn pixel_window<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    xs: &Range<i32>,
    ys: &Range<i32>,
) -> DrawingArea<DB, Shift> {
    let (base_x, base_y) = root.get_base_pixel();
    let (width, height) = root.dim_in_pixel();
    let left = xs.start - base_x;
    let top = ys.start - base_y;
    let right = width as i32 - (xs.end - base_x);
    let bottom = height as i32 - (ys.end - base_y);
    root.margin(top, bottom, left, right)
}

// --- Score charts ---

/// Time axis: one sample every 1.1 s.
pub(crate) const SECONDS_PER_SAMPLE: f64 = 1.1;
/// Vertical reference lines, one per potential step boundary.
pub(crate) const STEP_BOUNDARIES: [f64; 11] = [
    0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, 1000.0,
];
const SCORE_X_RANGE: (f64, f64) = (0.0, 1000.0);
const STACK_SEPARATION: f64 = 10.0;
const STEP_LABEL_FONT_PT: f64 = 16.0;

/// Flat (overlaid) or stacked (waterfall) score layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoreLayout {
    Flat,
    Stacked,
}

impl ScoreLayout {
    pub(crate) fn separation(&self) -> f64 {
        match self {
            ScoreLayout::Flat => 0.0,
            ScoreLayout::Stacked => STACK_SEPARATION,
        }
    }

    pub(crate) fn shows_y_ticks(&self) -> bool {
        matches!(self, ScoreLayout::Flat)
    }
}

/// Component scores against time with step boundaries and voltage labels.
pub(crate) struct ScoreChart<'a> {
    series: Vec<PlotSeries>,
    layout: ScoreLayout,
    experiment: &'a ExperimentClass,
}

impl<'a> ScoreChart<'a> {
    pub(crate) fn new(
        table: &ComponentTable,
        num_components: usize,
        palette: &ComponentPalette,
        experiment: &'a ExperimentClass,
        layout: ScoreLayout,
    ) -> std::result::Result<Self, SeriesError> {
        let series = component_series(
            table,
            num_components,
            palette,
            layout.separation(),
            |row, _| row as f64 * SECONDS_PER_SAMPLE,
        )?;
        Ok(Self {
            series,
            layout,
            experiment,
        })
    }

    #[cfg(test)]
    pub(crate) fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    #[cfg(test)]
    pub(crate) fn layout(&self) -> ScoreLayout {
        self.layout
    }

    pub(crate) fn x_range(&self) -> (f64, f64) {
        SCORE_X_RANGE
    }

    /// `(interval centre, label)` for every interval between consecutive
    /// step boundaries, alternating between the experiment's two labels.
    pub(crate) fn interval_labels(&self) -> Vec<(f64, &'static str)> {
        let Some(labels) = self.experiment.voltage_labels() else {
            return Vec::new();
        };
        STEP_BOUNDARIES
            .windows(2)
            .enumerate()
            .map(|(i, pair)| ((pair[0] + pair[1]) / 2.0, labels[i % 2]))
            .collect()
    }
}

impl Figure for ScoreChart<'_> {
    fn size(&self) -> FigureSize {
        PORTRAIT_FIGURE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, canvas: Canvas) -> Result<()> {
        let (tick_font, axis_font) = mesh_fonts(canvas);
        let (x_lo, x_hi) = self.x_range();
        let visible: Vec<Vec<(f64, f64)>> = self
            .series
            .iter()
            .map(|s| clip_x(s.points.clone(), x_lo, x_hi))
            .collect();
        let y_range = padded_range(visible.iter().flatten().map(|p| p.1));

        let entries: Vec<LegendEntry> = self.series.iter().map(PlotSeries::legend_entry).collect();
        let (legend_w, _) = legend_extent(&entries, 1, canvas);
        let labels = self.interval_labels();
        let top_margin = if labels.is_empty() {
            canvas.px(14.0)
        } else {
            canvas.px(14.0)
                + labels
                    .iter()
                    .map(|(_, text)| canvas.estimate_text_width(text, STEP_LABEL_FONT_PT))
                    .max()
                    .unwrap_or(0)
        };

        let mut chart = ChartBuilder::on(root)
            .margin_top(top_margin)
            .margin_bottom(canvas.px(14.0))
            .margin_left(canvas.px(14.0))
            .margin_right(legend_w + canvas.px(24.0))
            .x_label_area_size(canvas.px(30.0))
            .y_label_area_size(canvas.px(if self.layout.shows_y_ticks() { 40.0 } else { 16.0 }))
            .build_cartesian_2d(x_lo..x_hi, y_range.clone())
            .map_err(drawing_err)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .x_desc("Time (s)")
            .y_desc("Score (a.u.)")
            .label_style(tick_font)
            .axis_desc_style(axis_font);
        if !self.layout.shows_y_ticks() {
            mesh.y_labels(0);
        }
        mesh.draw().map_err(drawing_err)?;

        let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
        draw_frame(root, (x_pixels.clone(), y_pixels.clone()), canvas)?;

        for &boundary in STEP_BOUNDARIES.iter() {
            chart
                .draw_series(dashed_vertical(boundary, &y_range, 60).into_iter().map(|segment| {
                    PathElement::new(segment.to_vec(), BLACK.mix(0.1).stroke_width(canvas.upx(1.0)))
                }))
                .map_err(drawing_err)?;
        }

        for (series, points) in self.series.iter().zip(visible) {
            chart
                .draw_series(LineSeries::new(points, series.color.stroke_width(canvas.upx(1.5))))
                .map_err(drawing_err)?;
        }

        let (base_x, base_y) = root.get_base_pixel();
        let label_color = BLACK.mix(0.15);
        let label_style = canvas
            .text(STEP_LABEL_FONT_PT)
            .color(&label_color)
            .transform(FontTransform::Rotate270)
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (centre, text) in labels {
            let (x, _) = chart.backend_coord(&(centre, y_range.end));
            root.draw(&Text::new(
                text.to_string(),
                (x - base_x, y_pixels.start - base_y - canvas.px(4.0)),
                label_style.clone(),
            ))
            .map_err(drawing_err)?;
        }

        let legend_origin = (
            x_pixels.end - base_x + (0.02 * (x_pixels.end - x_pixels.start) as f64) as i32,
            y_pixels.start - base_y,
        );
        draw_legend(root, legend_origin, &entries, 1, canvas)
    }
}

// --- Eigenspectra chart ---

/// Wavenumber window, drawn decreasing left to right.
pub(crate) const WAVENUMBER_RANGE: (f64, f64) = (4000.0, 1100.0);
const LOADING_SEPARATION: f64 = 0.1;

/// Component loadings against wavenumber, offset for legibility.
pub(crate) struct EigenspectraChart {
    series: Vec<PlotSeries>,
}

impl EigenspectraChart {
    pub(crate) fn new(
        table: &ComponentTable,
        num_components: usize,
        palette: &ComponentPalette,
    ) -> std::result::Result<Self, SeriesError> {
        let series = component_series(
            table,
            num_components,
            palette,
            LOADING_SEPARATION,
            |_, wavenumber| wavenumber,
        )?;
        Ok(Self { series })
    }

    #[cfg(test)]
    pub(crate) fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    /// `(left, right)` edges of the x axis.
    pub(crate) fn x_range(&self) -> (f64, f64) {
        WAVENUMBER_RANGE
    }
}

impl Figure for EigenspectraChart {
    fn size(&self) -> FigureSize {
        PORTRAIT_FIGURE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, canvas: Canvas) -> Result<()> {
        let (tick_font, axis_font) = mesh_fonts(canvas);
        let (left, right) = self.x_range();
        let (lo, hi) = (left.min(right), left.max(right));

        // The axis runs over negated wavenumbers so that values decrease
        // left to right; labels undo the negation.
        let visible: Vec<Vec<(f64, f64)>> = self
            .series
            .iter()
            .map(|s| {
                clip_x(s.points.clone(), lo, hi)
                    .into_iter()
                    .map(|(x, y)| (-x, y))
                    .collect()
            })
            .collect();
        let y_range = padded_range(visible.iter().flatten().map(|p| p.1));

        let entries: Vec<LegendEntry> = self.series.iter().map(PlotSeries::legend_entry).collect();
        let (legend_w, _) = legend_extent(&entries, 2, canvas);

        let mut chart = ChartBuilder::on(root)
            .margin_top(canvas.px(14.0))
            .margin_bottom(canvas.px(14.0))
            .margin_left(canvas.px(14.0))
            .margin_right(legend_w + canvas.px(24.0))
            .x_label_area_size(canvas.px(30.0))
            .y_label_area_size(canvas.px(16.0))
            .build_cartesian_2d(-left..-right, y_range)
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .y_labels(0)
            .x_labels(8)
            .x_label_formatter(&|x| format!("{:.0}", -x))
            .x_desc("Wavenumbers (cm^-1)")
            .y_desc("Loading (a.u.)")
            .label_style(tick_font)
            .axis_desc_style(axis_font)
            .draw()
            .map_err(drawing_err)?;

        let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
        draw_frame(root, (x_pixels.clone(), y_pixels.clone()), canvas)?;

        for (series, points) in self.series.iter().zip(visible) {
            chart
                .draw_series(LineSeries::new(points, series.color.stroke_width(canvas.upx(1.5))))
                .map_err(drawing_err)?;
        }

        let (base_x, base_y) = root.get_base_pixel();
        let legend_origin = (
            x_pixels.end - base_x + (0.02 * (x_pixels.end - x_pixels.start) as f64) as i32,
            y_pixels.start - base_y,
        );
        draw_legend(root, legend_origin, &entries, 2, canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::save_figure;
    use ndarray::Array2;
    use tempfile::tempdir;

    fn rgb(c: RGBColor) -> (u8, u8, u8) {
        (c.0, c.1, c.2)
    }

    fn score_table() -> ComponentTable {
        // 4 rows: index, PC1..PC3
        let values = Array2::from_shape_vec(
            (4, 4),
            vec![
                0.0, 1.0, 2.0, 3.0, //
                1.0, 1.5, 2.5, 3.5, //
                2.0, 2.0, 3.0, 4.0, //
                3.0, 2.5, 3.5, 4.5,
            ],
        )
        .unwrap();
        ComponentTable::from_parts(&["Index", "PC1", "PC2", "PC3"], values)
    }

    fn eigen_table() -> ComponentTable {
        let values = Array2::from_shape_vec(
            (3, 4),
            vec![
                4000.0, 0.1, 0.2, 0.3, //
                2500.0, 0.4, 0.5, 0.6, //
                1000.0, 0.7, 0.8, 0.9,
            ],
        )
        .unwrap();
        ComponentTable::from_parts(&["Wavenumber", "PC1", "PC2", "PC3"], values)
    }

    #[test]
    fn variance_chart_ranges_follow_component_count() {
        let table = VarianceTable::from_percentages(&[60.0, 20.0, 10.0, 5.0, 3.0, 2.0]);
        for k in 1..=6 {
            let chart = VarianceChart::new(&table, k);
            assert_eq!(chart.x_range(), (0.0, k as f64));
            assert_eq!(chart.inset_x_range(), (2.0, k as f64));
        }
    }

    #[test]
    fn variance_chart_points_and_ticks() {
        let table = VarianceTable::from_percentages(&[60.0, 20.0, 10.0, 5.0, 3.0, 2.0]);
        let chart = VarianceChart::new(&table, 4);
        assert_eq!(chart.ticks(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(chart.main_points().len(), 5);
        assert_eq!(chart.main_points()[0], (0.0, 0.0));
        assert_eq!(
            chart.inset_points(),
            vec![(2.0, 20.0), (3.0, 10.0), (4.0, 5.0)]
        );
    }

    #[test]
    fn flat_scores_use_time_axis_without_offset() {
        let palette = ComponentPalette::new(3);
        let class = ExperimentClass::from_tag("_07");
        let chart =
            ScoreChart::new(&score_table(), 3, &palette, &class, ScoreLayout::Flat).unwrap();
        let series = chart.series();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].label, "PC 1");
        assert_eq!(series[2].label, "PC 3");
        assert_eq!(series[1].points[3].1, 3.5);
        assert!((series[0].points[2].0 - 2.2).abs() < 1e-12);
    }

    #[test]
    fn stacked_scores_are_offset_by_ten_per_component() {
        let palette = ComponentPalette::new(3);
        let class = ExperimentClass::from_tag("_07");
        let chart =
            ScoreChart::new(&score_table(), 3, &palette, &class, ScoreLayout::Stacked).unwrap();
        assert_eq!(chart.layout(), ScoreLayout::Stacked);
        assert!(!chart.layout().shows_y_ticks());
        let series = chart.series();
        assert_eq!(series[0].points[0].1, 1.0);
        assert_eq!(series[1].points[0].1, 2.0 - 10.0);
        assert_eq!(series[2].points[0].1, 3.0 - 20.0);
    }

    #[test]
    fn interval_labels_alternate_for_known_tags() {
        let palette = ComponentPalette::new(2);
        let class = ExperimentClass::from_tag("_07");
        let chart =
            ScoreChart::new(&score_table(), 2, &palette, &class, ScoreLayout::Flat).unwrap();
        let labels = chart.interval_labels();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels[0], (50.0, "-0.05 V"));
        assert_eq!(labels[1], (150.0, "-0.4 V"));
        assert_eq!(labels[9], (950.0, "-0.4 V"));
        assert_eq!(chart.x_range(), (0.0, 1000.0));
    }

    #[test]
    fn unknown_tag_produces_no_labels() {
        let palette = ComponentPalette::new(2);
        let class = ExperimentClass::from_tag("abc");
        let chart =
            ScoreChart::new(&score_table(), 2, &palette, &class, ScoreLayout::Flat).unwrap();
        assert!(chart.interval_labels().is_empty());
    }

    #[test]
    fn eigenspectra_offsets_and_axis() {
        let palette = ComponentPalette::new(3);
        let chart = EigenspectraChart::new(&eigen_table(), 3, &palette).unwrap();
        assert_eq!(chart.x_range(), (4000.0, 1100.0));
        let series = chart.series();
        assert_eq!(series[0].points[1], (2500.0, 0.4));
        assert!((series[2].points[1].1 - (0.6 - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn component_colours_agree_across_charts() {
        let palette = ComponentPalette::new(3);
        let class = ExperimentClass::from_tag("_08");
        let flat = ScoreChart::new(&score_table(), 3, &palette, &class, ScoreLayout::Flat).unwrap();
        let stacked =
            ScoreChart::new(&score_table(), 3, &palette, &class, ScoreLayout::Stacked).unwrap();
        let eigen = EigenspectraChart::new(&eigen_table(), 3, &palette).unwrap();
        for i in 0..3 {
            let c = rgb(flat.series()[i].color);
            assert_eq!(c, rgb(stacked.series()[i].color));
            assert_eq!(c, rgb(eigen.series()[i].color));
            assert_eq!(Some(c), palette.for_component(i + 1).map(rgb));
        }
    }

    #[test]
    fn too_many_components_fail_before_drawing() {
        let palette = ComponentPalette::new(5);
        let class = ExperimentClass::from_tag("_07");
        let result = ScoreChart::new(&score_table(), 5, &palette, &class, ScoreLayout::Flat);
        assert!(matches!(
            result,
            Err(SeriesError::Table(TableError::NotEnoughComponents { .. }))
        ));
    }

    fn assert_rendered(paths: &[std::path::PathBuf]) {
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].extension().unwrap(), "png");
        assert_eq!(paths[1].extension().unwrap(), "svg");
        for path in paths {
            assert!(path.is_file(), "{} missing", path.display());
            assert!(std::fs::metadata(path).unwrap().len() > 0);
        }
    }

    #[test]
    fn variance_chart_renders_png_and_svg() {
        let dir = tempdir().unwrap();
        let table = VarianceTable::from_percentages(&[60.0, 20.0, f64::NAN, 5.0, 3.0]);
        let written = save_figure(&VarianceChart::new(&table, 4), "PCA_CVE1_to_4", dir.path()).unwrap();
        assert_rendered(&written);
        assert!(dir.path().join("PCA_CVE1_to_4.svg").is_file());
    }

    #[test]
    fn single_component_variance_chart_renders() {
        let dir = tempdir().unwrap();
        let table = VarianceTable::from_percentages(&[100.0]);
        let written = save_figure(&VarianceChart::new(&table, 1), "PCA_CVE1_to_1", dir.path()).unwrap();
        assert_rendered(&written);
    }

    #[test]
    fn score_charts_render_png_and_svg() {
        let dir = tempdir().unwrap();
        let palette = ComponentPalette::new(3);
        let class = ExperimentClass::from_tag("_09");
        let flat = ScoreChart::new(&score_table(), 3, &palette, &class, ScoreLayout::Flat).unwrap();
        assert_rendered(&save_figure(&flat, "PCA_scores1_to_3", dir.path()).unwrap());

        let stacked =
            ScoreChart::new(&score_table(), 3, &palette, &class, ScoreLayout::Stacked).unwrap();
        assert_rendered(&save_figure(&stacked, "PCA_scores_stacked1_to_3", dir.path()).unwrap());
    }

    #[test]
    fn eigenspectra_chart_renders_png_and_svg() {
        let dir = tempdir().unwrap();
        let palette = ComponentPalette::new(3);
        let chart = EigenspectraChart::new(&eigen_table(), 3, &palette).unwrap();
        assert_rendered(&save_figure(&chart, "PCA_eigenspectra1_to_3", dir.path()).unwrap());
    }
}
