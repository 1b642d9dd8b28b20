// render.rs
//
// Shared drawing infrastructure: figure sizing, the PNG + SVG writer, and
// the small pieces (legends, frames, dashed rules) every chart reuses.

// --- External Crate Imports ---
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Resolution of the raster copy of every chart.
pub(crate) const RASTER_DPI: f64 = 300.0;
/// SVG user units per inch (one unit per typographic point).
pub(crate) const VECTOR_DPI: f64 = 72.0;
/// Resolution of the raster-only correlation diagnostics.
pub(crate) const DIAGNOSTIC_DPI: f64 = 100.0;

/// Default line colour for single-series charts.
pub(crate) const SERIES_BLUE: RGBColor = RGBColor(31, 119, 180);
const LEGEND_BORDER: RGBColor = RGBColor(204, 204, 204);

const FONT_FAMILY: &str = "sans-serif";

/// Errors that can occur while rendering or saving a chart.
#[derive(Error, Debug)]
pub(crate) enum PlotError {
    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to {}: {message}", .path.display())]
    Save { path: PathBuf, message: String },

    #[error("No colour assigned to {0}")]
    MissingColor(String),
}

pub(crate) type Result<T> = std::result::Result<T, PlotError>;

/// Maps any plotters drawing error into [`PlotError::Drawing`].
pub(crate) fn drawing_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

// --- Figure geometry ---

/// Physical figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FigureSize {
    pub(crate) width_in: f64,
    pub(crate) height_in: f64,
}

impl FigureSize {
    pub(crate) const fn new(width_in: f64, height_in: f64) -> Self {
        Self { width_in, height_in }
    }

    pub(crate) fn pixels(&self, dpi: f64) -> (u32, u32) {
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }
}

/// Per-target rendering parameters: point-to-pixel scale and whether the
/// background is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Canvas {
    px_per_pt: f64,
    pub(crate) opaque: bool,
}

impl Canvas {
    pub(crate) fn new(dpi: f64, opaque: bool) -> Self {
        Self {
            px_per_pt: dpi / 72.0,
            opaque,
        }
    }

    /// Points to (signed) backend pixels.
    pub(crate) fn px(&self, pt: f64) -> i32 {
        (pt * self.px_per_pt).round() as i32
    }

    /// Points to backend pixels, never less than one.
    pub(crate) fn upx(&self, pt: f64) -> u32 {
        self.px(pt).max(1) as u32
    }

    pub(crate) fn font_px(&self, pt: f64) -> f64 {
        pt * self.px_per_pt
    }

    pub(crate) fn text(&self, pt: f64) -> TextStyle<'static> {
        (FONT_FAMILY, self.font_px(pt)).into_font().color(&BLACK)
    }

    /// Rough rendered width of `text` in pixels, used to reserve room for
    /// legends drawn outside the axes.
    pub(crate) fn estimate_text_width(&self, text: &str, pt: f64) -> i32 {
        (text.chars().count() as f64 * self.font_px(pt) * 0.6).ceil() as i32
    }
}

/// A chart that can be drawn onto any plotters backend.
pub(crate) trait Figure {
    fn size(&self) -> FigureSize;

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, canvas: Canvas)
        -> Result<()>;
}

// --- Output writer ---

fn save_error(path: &Path, e: impl std::fmt::Display) -> PlotError {
    PlotError::Save {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Renders `figure` into a white-background PNG at `dpi`.
pub(crate) fn save_png<F: Figure>(figure: &F, path: &Path, dpi: f64) -> Result<()> {
    let root = BitMapBackend::new(path, figure.size().pixels(dpi)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_err)?;
    figure.draw(&root, Canvas::new(dpi, true))?;
    root.present().map_err(|e| save_error(path, e))?;
    Ok(())
}

/// Renders `figure` into an SVG with no background fill.
pub(crate) fn save_svg<F: Figure>(figure: &F, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, figure.size().pixels(VECTOR_DPI)).into_drawing_area();
    figure.draw(&root, Canvas::new(VECTOR_DPI, false))?;
    root.present().map_err(|e| save_error(path, e))?;
    Ok(())
}

/// Saves `figure` as `<title>.png` (raster) and `<title>.svg` (transparent
/// vector) inside `dir`. Each backend is dropped before returning, so no
/// drawing state outlives the call.
pub(crate) fn save_figure<F: Figure>(figure: &F, title: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    let png_path = dir.join(format!("{}.png", title));
    let svg_path = dir.join(format!("{}.svg", title));

    save_png(figure, &png_path, RASTER_DPI)?;
    save_svg(figure, &svg_path)?;

    info!("Saved {} and {}", png_path.display(), svg_path.display());
    Ok(vec![png_path, svg_path])
}

/// Saves a raster-only diagnostic figure.
pub(crate) fn save_raster_figure<F: Figure>(figure: &F, path: &Path) -> Result<PathBuf> {
    save_png(figure, path, DIAGNOSTIC_DPI)?;
    info!("Saved {}", path.display());
    Ok(path.to_path_buf())
}

// --- Drawing helpers ---

/// Axis range covering `values` with 5% padding on both ends, ignoring
/// non-finite values. Degenerate inputs get a unit-wide range.
pub(crate) fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }
    if (max - min).abs() < 1e-12 {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Keeps points whose x lies in `[lo, hi]`.
pub(crate) fn clip_x(points: Vec<(f64, f64)>, lo: f64, hi: f64) -> Vec<(f64, f64)> {
    points
        .into_iter()
        .filter(|(x, y)| *x >= lo && *x <= hi && y.is_finite())
        .collect()
}

/// Splits the vertical rule `x` over `y_range` into `dashes` dash segments
/// separated by equal gaps.
pub(crate) fn dashed_vertical(x: f64, y_range: &Range<f64>, dashes: usize) -> Vec<[(f64, f64); 2]> {
    let period = (y_range.end - y_range.start) / dashes.max(1) as f64;
    (0..dashes.max(1))
        .map(|i| {
            let start = y_range.start + i as f64 * period;
            [(x, start), (x, start + period * 0.6)]
        })
        .collect()
}

/// Draws a rectangle outline around a plotting area given by its absolute
/// pixel range.
pub(crate) fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    pixel_range: (Range<i32>, Range<i32>),
    canvas: Canvas,
) -> Result<()> {
    let (base_x, base_y) = root.get_base_pixel();
    let (xs, ys) = pixel_range;
    root.draw(&Rectangle::new(
        [
            (xs.start - base_x, ys.start - base_y),
            (xs.end - base_x, ys.end - base_y),
        ],
        BLACK.stroke_width(canvas.upx(0.8)),
    ))
    .map_err(drawing_err)
}

/// Draws tick marks and labels below an x axis located at absolute pixel row
/// `axis_y`. `ticks` holds absolute pixel columns and their label text.
pub(crate) fn draw_x_ticks<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ticks: &[(i32, String)],
    axis_y: i32,
    canvas: Canvas,
) -> Result<()> {
    let (base_x, base_y) = root.get_base_pixel();
    let y = axis_y - base_y;
    let tick_len = canvas.px(3.5);
    let style = canvas.text(9.0).pos(Pos::new(HPos::Center, VPos::Top));
    for (x, label) in ticks {
        let x = x - base_x;
        root.draw(&PathElement::new(
            vec![(x, y), (x, y + tick_len)],
            BLACK.stroke_width(canvas.upx(0.8)),
        ))
        .map_err(drawing_err)?;
        root.draw(&Text::new(
            label.clone(),
            (x, y + tick_len + canvas.px(2.0)),
            style.clone(),
        ))
        .map_err(drawing_err)?;
    }
    Ok(())
}

/// One legend row.
#[derive(Debug, Clone)]
pub(crate) struct LegendEntry {
    pub(crate) label: String,
    pub(crate) color: RGBColor,
}

/// Font size used for legends, in points.
pub(crate) const LEGEND_FONT_PT: f64 = 10.0;

/// Pixel size `(width, height)` a legend of `entries` laid out in `columns`
/// columns will occupy.
pub(crate) fn legend_extent(entries: &[LegendEntry], columns: usize, canvas: Canvas) -> (i32, i32) {
    let columns = columns.max(1);
    let rows = (entries.len() + columns - 1) / columns;
    let label_width = entries
        .iter()
        .map(|e| canvas.estimate_text_width(&e.label, LEGEND_FONT_PT))
        .max()
        .unwrap_or(0);
    let column_width = canvas.px(20.0) + canvas.px(8.0) + label_width + canvas.px(8.0);
    let row_height = canvas.px(LEGEND_FONT_PT * 1.5);
    (
        column_width * columns as i32 + canvas.px(8.0),
        row_height * rows as i32 + canvas.px(8.0),
    )
}

/// Draws a framed legend whose top-left corner sits at `origin` (pixels
/// relative to `root`).
pub(crate) fn draw_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    origin: (i32, i32),
    entries: &[LegendEntry],
    columns: usize,
    canvas: Canvas,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let columns = columns.max(1);
    let (width, height) = legend_extent(entries, columns, canvas);
    let (x0, y0) = origin;

    if canvas.opaque {
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + width, y0 + height)],
            WHITE.mix(0.8).filled(),
        ))
        .map_err(drawing_err)?;
    }
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + width, y0 + height)],
        LEGEND_BORDER.stroke_width(canvas.upx(0.8)),
    ))
    .map_err(drawing_err)?;

    let column_width = (width - canvas.px(8.0)) / columns as i32;
    let row_height = canvas.px(LEGEND_FONT_PT * 1.5);
    let style = canvas
        .text(LEGEND_FONT_PT)
        .pos(Pos::new(HPos::Left, VPos::Center));

    // Entries fill row by row.
    for (i, entry) in entries.iter().enumerate() {
        let column = (i % columns) as i32;
        let row = (i / columns) as i32;
        let x = x0 + canvas.px(6.0) + column * column_width;
        let y = y0 + canvas.px(4.0) + row * row_height + row_height / 2;
        root.draw(&PathElement::new(
            vec![(x, y), (x + canvas.px(20.0), y)],
            entry.color.stroke_width(canvas.upx(1.5)),
        ))
        .map_err(drawing_err)?;
        root.draw(&Text::new(
            entry.label.clone(),
            (x + canvas.px(28.0), y),
            style.clone(),
        ))
        .map_err(drawing_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Annotated;

    impl Figure for Annotated {
        fn size(&self) -> FigureSize {
            FigureSize::new(2.0, 1.0)
        }

        fn draw<DB: DrawingBackend>(
            &self,
            root: &DrawingArea<DB, Shift>,
            canvas: Canvas,
        ) -> Result<()> {
            root.draw(&Text::new(
                "R^2: 1.000000, Spearman's rho: 1.000000",
                (canvas.px(4.0), canvas.px(20.0)),
                canvas.text(8.0),
            ))
            .map_err(drawing_err)?;
            draw_legend(
                root,
                (canvas.px(4.0), canvas.px(36.0)),
                &[LegendEntry {
                    label: "PC 1".to_string(),
                    color: SERIES_BLUE,
                }],
                1,
                canvas,
            )
        }
    }

    #[test]
    fn text_renders_into_both_formats() {
        let dir = tempdir().unwrap();
        let written = save_figure(&Annotated, "annotated", dir.path()).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("annotated.png"), dir.path().join("annotated.svg")]
        );
        let svg = std::fs::read_to_string(dir.path().join("annotated.svg")).unwrap();
        assert!(svg.contains("Spearman"));

        let raster = save_raster_figure(&Annotated, &dir.path().join("raster.png")).unwrap();
        assert!(raster.is_file());
    }

    #[test]
    fn figure_size_scales_with_dpi() {
        let size = FigureSize::new(6.0, 4.5);
        assert_eq!(size.pixels(RASTER_DPI), (1800, 1350));
        assert_eq!(size.pixels(VECTOR_DPI), (432, 324));
    }

    #[test]
    fn canvas_converts_points_to_pixels() {
        let raster = Canvas::new(RASTER_DPI, true);
        assert_eq!(raster.px(72.0), 300);
        let vector = Canvas::new(VECTOR_DPI, false);
        assert_eq!(vector.px(10.0), 10);
        assert_eq!(vector.upx(0.1), 1);
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range(Vec::<f64>::new()), -1.0..1.0);
        assert_eq!(padded_range(vec![2.0, 2.0]), 1.5..2.5);
        let r = padded_range(vec![0.0, 10.0, f64::NAN]);
        assert!((r.start + 0.5).abs() < 1e-12);
        assert!((r.end - 10.5).abs() < 1e-12);
    }

    #[test]
    fn clip_x_drops_points_outside_the_window() {
        let points = vec![(-1.0, 0.0), (0.0, 1.0), (5.0, f64::NAN), (10.0, 2.0), (11.0, 3.0)];
        assert_eq!(clip_x(points, 0.0, 10.0), vec![(0.0, 1.0), (10.0, 2.0)]);
    }

    #[test]
    fn dashed_rule_stays_within_range() {
        let segments = dashed_vertical(100.0, &(0.0..10.0), 5);
        assert_eq!(segments.len(), 5);
        assert!(segments.iter().all(|[a, b]| a.0 == 100.0 && b.0 == 100.0));
        assert_eq!(segments[0][0].1, 0.0);
        assert!(segments[4][1].1 <= 10.0);
    }

    #[test]
    fn two_column_legend_halves_the_row_count() {
        let canvas = Canvas::new(VECTOR_DPI, false);
        let entries: Vec<LegendEntry> = (1..=6)
            .map(|n| LegendEntry {
                label: format!("PC {}", n),
                color: BLACK,
            })
            .collect();
        let (w1, h1) = legend_extent(&entries, 1, canvas);
        let (w2, h2) = legend_extent(&entries, 2, canvas);
        assert!(w2 > w1);
        assert!(h2 < h1);
    }
}
