// diagnostics.rs
//
// Pairwise score-correlation diagnostics: a k x k scatter matrix annotated
// with R^2 / Spearman rho, and a Spearman heat map on a fixed colour scale.

// --- External Crate Imports ---
use log::debug;
use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::palette::ColorScale;
use crate::render::{
    draw_frame, drawing_err, padded_range, Canvas, Figure, FigureSize, Result,
};
use crate::stats::{spearman_matrix, PairCorrelation};
use crate::tables::{ComponentTable, TableError};

pub(crate) const SCATTER_MATRIX_FILE: &str = "PC_Scatter_Matrix.png";
pub(crate) const HEATMAP_FILE: &str = "Spearman_Correlation_Matrix.png";

/// Fixed colour-scale bounds of the heat map.
pub(crate) const HEATMAP_BOUNDS: (f64, f64) = (-0.25, 0.25);

/// Significant digits of the heat-map cell annotations.
const ANNOTATION_DIGITS: usize = 2;

/// Inches per scatter-matrix cell.
const CELL_INCHES: f64 = 5.0;
const MARKER_BLUE: RGBColor = RGBColor(0, 0, 255);

/// Named score columns used by both diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct ScoreColumns {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl ScoreColumns {
    /// The first `k` component columns of a score table, keyed by header.
    pub(crate) fn from_table(
        table: &ComponentTable,
        num_components: usize,
    ) -> std::result::Result<Self, TableError> {
        let components = table.components(num_components)?;
        Ok(Self {
            names: components.iter().map(|c| c.header.to_string()).collect(),
            values: components.iter().map(|c| c.values.to_vec()).collect(),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

// --- Scatter matrix ---

/// One scatter-matrix panel: column `x_name` against column `y_name`.
#[derive(Debug, Clone)]
pub(crate) struct ScatterCell {
    pub(crate) x_index: usize,
    pub(crate) y_index: usize,
    pub(crate) x_name: String,
    pub(crate) y_name: String,
    pub(crate) correlation: PairCorrelation,
}

impl ScatterCell {
    pub(crate) fn title(&self) -> String {
        format!("{} vs {}", self.y_name, self.x_name)
    }

    pub(crate) fn annotation(&self) -> String {
        format!(
            "R^2: {:.6}, Spearman's rho: {:.6}",
            self.correlation.r_squared, self.correlation.spearman_rho
        )
    }

    #[cfg(test)]
    pub(crate) fn is_self_pair(&self) -> bool {
        self.x_index == self.y_index
    }
}

/// `k x k` grid over every ordered pair of score columns, self-pairs
/// included, in row-major order of the Cartesian product.
pub(crate) struct ScatterMatrix<'a> {
    columns: &'a ScoreColumns,
    cells: Vec<ScatterCell>,
}

impl<'a> ScatterMatrix<'a> {
    pub(crate) fn new(columns: &'a ScoreColumns) -> Self {
        let k = columns.len();
        let cells = (0..k)
            .flat_map(|x_index| (0..k).map(move |y_index| (x_index, y_index)))
            .map(|(x_index, y_index)| {
                let correlation =
                    PairCorrelation::between(&columns.values[x_index], &columns.values[y_index]);
                debug!(
                    "{} vs {}: R^2 = {:.6}, rho = {:.6}",
                    columns.names[y_index],
                    columns.names[x_index],
                    correlation.r_squared,
                    correlation.spearman_rho
                );
                ScatterCell {
                    x_index,
                    y_index,
                    x_name: columns.names[x_index].clone(),
                    y_name: columns.names[y_index].clone(),
                    correlation,
                }
            })
            .collect();
        Self { columns, cells }
    }

    #[cfg(test)]
    pub(crate) fn cells(&self) -> &[ScatterCell] {
        &self.cells
    }

    pub(crate) fn grid_dim(&self) -> usize {
        self.columns.len()
    }
}

impl Figure for ScatterMatrix<'_> {
    fn size(&self) -> FigureSize {
        let side = CELL_INCHES * self.grid_dim().max(1) as f64;
        FigureSize::new(side, side)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, canvas: Canvas) -> Result<()> {
        let k = self.grid_dim();
        if k == 0 {
            return Ok(());
        }
        let panels = root.split_evenly((k, k));
        let tick_font = canvas.text(8.0);
        let axis_font = canvas.text(10.0);
        let annotation_font = canvas.text(10.0).pos(Pos::new(HPos::Center, VPos::Center));

        for (panel, cell) in panels.iter().zip(self.cells.iter()) {
            let xs = &self.columns.values[cell.x_index];
            let ys = &self.columns.values[cell.y_index];

            let mut chart = ChartBuilder::on(panel)
                .caption(cell.title(), canvas.text(12.0))
                .margin(canvas.px(10.0))
                .x_label_area_size(canvas.px(30.0))
                .y_label_area_size(canvas.px(44.0))
                .build_cartesian_2d(padded_range(xs.iter().copied()), padded_range(ys.iter().copied()))
                .map_err(drawing_err)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc(cell.x_name.as_str())
                .y_desc(cell.y_name.as_str())
                .label_style(tick_font.clone())
                .axis_desc_style(axis_font.clone())
                .draw()
                .map_err(drawing_err)?;

            let pixel_range = chart.plotting_area().get_pixel_range();
            draw_frame(root, pixel_range.clone(), canvas)?;

            chart
                .draw_series(
                    xs.iter()
                        .zip(ys.iter())
                        .filter(|(x, y)| x.is_finite() && y.is_finite())
                        .map(|(&x, &y)| {
                            Circle::new((x, y), canvas.upx(3.0), MARKER_BLUE.mix(0.7).filled())
                        }),
                )
                .map_err(drawing_err)?;

            // Annotation at (0.5, 0.9) in axes fractions.
            let (px, py) = pixel_range;
            let (base_x, base_y) = root.get_base_pixel();
            let ax = px.start + (px.end - px.start) / 2 - base_x;
            let ay = py.start + ((py.end - py.start) as f64 * 0.1) as i32 - base_y;
            root.draw(&Text::new(cell.annotation(), (ax, ay), annotation_font.clone()))
                .map_err(drawing_err)?;
        }
        Ok(())
    }
}

// --- Spearman heat map ---

/// `%g`-style formatting: `significant` digits with trailing zeros dropped,
/// switching to scientific notation for exponents below -4 or at least
/// `significant`.
pub(crate) fn general_format(value: f64, significant: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    let significant = significant.max(1);
    let scientific = format!("{:.*e}", significant - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= significant as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Symmetric Spearman matrix rendered with annotated cells on a fixed
/// magma scale.
pub(crate) struct CorrelationHeatmap<'a> {
    columns: &'a ScoreColumns,
    matrix: Array2<f64>,
}

impl<'a> CorrelationHeatmap<'a> {
    pub(crate) fn new(columns: &'a ScoreColumns) -> Self {
        let matrix = spearman_matrix(&columns.values);
        debug!("Spearman matrix:\n{:.4}", matrix);
        Self { columns, matrix }
    }

    #[cfg(test)]
    pub(crate) fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub(crate) fn cell_color(value: f64) -> RGBColor {
        let (min, max) = HEATMAP_BOUNDS;
        ColorScale::Magma.normalized(value, min, max)
    }

    /// Annotation text; dark cells get white text.
    fn annotation_color(fill: RGBColor) -> RGBColor {
        let luminance = 0.299 * fill.0 as f64 + 0.587 * fill.1 as f64 + 0.114 * fill.2 as f64;
        if luminance < 128.0 {
            WHITE
        } else {
            BLACK
        }
    }
}

impl Figure for CorrelationHeatmap<'_> {
    fn size(&self) -> FigureSize {
        FigureSize::new(10.0, 8.0)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, canvas: Canvas) -> Result<()> {
        let k = self.columns.len();
        if k == 0 {
            return Ok(());
        }
        let names = &self.columns.names;
        let (main, colorbar) = root.split_horizontally(root.dim_in_pixel().0 as i32 * 85 / 100);

        let centres: Vec<f64> = (0..k).map(|i| i as f64 + 0.5).collect();
        let mut chart = ChartBuilder::on(&main)
            .caption("Spearman Correlation Coefficients Matrix", canvas.text(14.0))
            .margin(canvas.px(14.0))
            .x_label_area_size(canvas.px(40.0))
            .y_label_area_size(canvas.px(60.0))
            .build_cartesian_2d(0.0..k as f64, 0.0..k as f64)
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .y_labels(0)
            .x_desc("PCs")
            .y_desc("PCs")
            .axis_desc_style(canvas.text(10.0))
            .draw()
            .map_err(drawing_err)?;

        // Row 0 at the top, as in a printed matrix.
        let cell_font = canvas.text(10.0).pos(Pos::new(HPos::Center, VPos::Center));
        for i in 0..k {
            for j in 0..k {
                let value = self.matrix[[i, j]];
                let fill = Self::cell_color(value);
                let text_color = Self::annotation_color(fill);
                let top = (k - i) as f64;
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(j as f64, top - 1.0), (j as f64 + 1.0, top)],
                        fill.filled(),
                    )))
                    .map_err(drawing_err)?;
                chart
                    .draw_series(std::iter::once(Text::new(
                        general_format(value, ANNOTATION_DIGITS),
                        (j as f64 + 0.5, top - 0.5),
                        cell_font.color(&text_color),
                    )))
                    .map_err(drawing_err)?;
            }
        }

        let (base_x, base_y) = root.get_base_pixel();
        let (_, y_pixels) = chart.plotting_area().get_pixel_range();
        let tick_font = canvas.text(9.0);
        for (i, centre) in centres.iter().enumerate() {
            let (x, _) = chart.backend_coord(&(*centre, 0.0));
            root.draw(&Text::new(
                names[i].clone(),
                (x - base_x, y_pixels.end - base_y + canvas.px(4.0)),
                tick_font.pos(Pos::new(HPos::Center, VPos::Top)),
            ))
            .map_err(drawing_err)?;
            let (px, y) = chart.backend_coord(&(0.0, k as f64 - centre));
            root.draw(&Text::new(
                names[i].clone(),
                (px - base_x - canvas.px(4.0), y - base_y),
                tick_font.pos(Pos::new(HPos::Right, VPos::Center)),
            ))
            .map_err(drawing_err)?;
        }

        draw_colorbar(&colorbar, (y_pixels.start, y_pixels.end), canvas)
    }
}

/// Vertical magma gradient spanning [`HEATMAP_BOUNDS`] with five ticks.
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (top, bottom): (i32, i32),
    canvas: Canvas,
) -> Result<()> {
    let (min, max) = HEATMAP_BOUNDS;
    let (base_x, base_y) = area.get_base_pixel();
    let top = top - base_y;
    let bottom = bottom - base_y;
    let left = canvas.px(10.0);
    let width = canvas.px(14.0);
    let height = (bottom - top).max(1);

    for row in 0..height {
        let t = 1.0 - row as f64 / height as f64;
        let color = ColorScale::Magma.at(t);
        area.draw(&Rectangle::new(
            [(left, top + row), (left + width, top + row + 1)],
            color.filled(),
        ))
        .map_err(drawing_err)?;
    }
    draw_frame(
        area,
        (
            (left + base_x)..(left + width + base_x),
            (top + base_y)..(bottom + base_y),
        ),
        canvas,
    )?;

    let tick_font = canvas.text(9.0).pos(Pos::new(HPos::Left, VPos::Center));
    for step in 0..=4 {
        let value = min + (max - min) * step as f64 / 4.0;
        let y = bottom - (height as f64 * step as f64 / 4.0).round() as i32;
        area.draw(&PathElement::new(
            vec![(left + width, y), (left + width + canvas.px(3.0), y)],
            BLACK.stroke_width(canvas.upx(0.8)),
        ))
        .map_err(drawing_err)?;
        area.draw(&Text::new(
            format!("{:.2}", value),
            (left + width + canvas.px(5.0), y),
            tick_font.clone(),
        ))
        .map_err(drawing_err)?;
    }

    Ok(())
}
