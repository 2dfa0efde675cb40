//! Static Chart Renderer
//! Draws chart geometry into an RGB buffer with plotters.
//!
//! 1D/2D charts use a cartesian mesh with column names as axis labels;
//! 3D charts use a projected cartesian cube, with the column names listed in
//! a footer line.

use crate::charts::geometry::{surface_z, ChartGeometry, SurfaceGrid};
use crate::charts::request::{LineStyle, StyleConfig};
use crate::stats::{BoxStats, HistogramBin};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::ops::Range;

type DrawResult<T> = Result<T, Box<dyn Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Chart2d<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FONT: &str = "sans-serif";
const TITLE_SIZE: u32 = 22;
const LABEL_SIZE: u32 = 14;
const LINE_WIDTH: u32 = 2;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Draw `geometry` on a white canvas and return the RGB pixels.
    pub fn draw(
        geometry: &ChartGeometry,
        style: &StyleConfig,
        title: &str,
        width: u32,
        height: u32,
        surface_max_axis_points: usize,
    ) -> DrawResult<Vec<u8>> {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            match geometry {
                ChartGeometry::Histogram { column, bins } => {
                    Self::draw_histogram(&root, title, column, bins, style)?
                }
                ChartGeometry::Line1D { column, points } => {
                    Self::draw_line(&root, title, "Index", column, points, style, true)?
                }
                ChartGeometry::Bar { column, bars } => {
                    Self::draw_bars(&root, title, column, bars, style)?
                }
                ChartGeometry::Scatter2D { x, y, points } => {
                    Self::draw_scatter(&root, title, x, y, points, style)?
                }
                ChartGeometry::Box { columns } => Self::draw_box(&root, title, columns, style)?,
                ChartGeometry::Line2D { x, y, points } => {
                    Self::draw_line(&root, title, x, y, points, style, false)?
                }
                ChartGeometry::Scatter3D { axes, points } => {
                    Self::draw_scatter_3d(&root, title, axes, points, style)?
                }
                ChartGeometry::Surface { axes, grid } => {
                    Self::draw_surface(&root, title, axes, grid, style, surface_max_axis_points)?
                }
            }

            root.present()?;
        }
        Ok(buffer)
    }

    fn build_2d<'a, 'b>(
        root: &'a Area<'b>,
        title: &str,
        x_range: Range<f64>,
        y_range: Range<f64>,
    ) -> DrawResult<Chart2d<'a, 'b>> {
        check_span(&x_range)?;
        check_span(&y_range)?;
        let chart = ChartBuilder::on(root)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;
        Ok(chart)
    }

    fn draw_histogram(
        root: &Area,
        title: &str,
        column: &str,
        bins: &[HistogramBin],
        style: &StyleConfig,
    ) -> DrawResult<()> {
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return Ok(());
        };
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

        let mut chart = Self::build_2d(root, title, first.lower..last.upper, 0.0..max_count * 1.1)?;
        chart
            .configure_mesh()
            .x_desc(column)
            .y_desc("Count")
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        let color = style.rgb();
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], color.filled())
        }))?;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
        }))?;
        Ok(())
    }

    fn draw_line(
        root: &Area,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        points: &[(f64, f64)],
        style: &StyleConfig,
        markers: bool,
    ) -> DrawResult<()> {
        let x_range = padded_range(points.iter().map(|p| p.0));
        let y_range = padded_range(points.iter().map(|p| p.1));

        let mut chart = Self::build_2d(root, title, x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        let color = style.rgb();
        let pixel_path: Vec<(f64, f64)> = points
            .iter()
            .map(|p| {
                let (px, py) = chart.backend_coord(p);
                (px as f64, py as f64)
            })
            .collect();

        for (a, b) in dash_segments(&pixel_path, dash_pattern(style.line_style())) {
            root.draw(&PathElement::new(
                vec![
                    (a.0.round() as i32, a.1.round() as i32),
                    (b.0.round() as i32, b.1.round() as i32),
                ],
                color.stroke_width(LINE_WIDTH),
            ))?;
        }

        if markers {
            chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
        }
        Ok(())
    }

    fn draw_bars(
        root: &Area,
        title: &str,
        column: &str,
        bars: &[(usize, f64)],
        style: &StyleConfig,
    ) -> DrawResult<()> {
        let x_range = padded_range(bars.iter().map(|&(i, _)| i as f64));
        let y_range = padded_range(bars.iter().map(|&(_, v)| v).chain(std::iter::once(0.0)));

        let mut chart = Self::build_2d(root, title, x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc("Index")
            .y_desc(column)
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        let color = style.rgb();
        chart.draw_series(bars.iter().map(|&(i, v)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], color.filled())
        }))?;
        Ok(())
    }

    fn draw_scatter(
        root: &Area,
        title: &str,
        x: &str,
        y: &str,
        points: &[(f64, f64)],
        style: &StyleConfig,
    ) -> DrawResult<()> {
        let x_range = padded_range(points.iter().map(|p| p.0));
        let y_range = padded_range(points.iter().map(|p| p.1));

        let mut chart = Self::build_2d(root, title, x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc(x)
            .y_desc(y)
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        let color = style.rgb();
        let radius = style.marker_radius() as i32;
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, radius, color.mix(0.6).filled())),
        )?;
        Ok(())
    }

    fn draw_box(
        root: &Area,
        title: &str,
        columns: &[(String, BoxStats)],
        style: &StyleConfig,
    ) -> DrawResult<()> {
        let y_range = padded_range(
            columns
                .iter()
                .flat_map(|(_, s)| [s.min, s.max].into_iter()),
        );
        let x_range = -0.5..(columns.len() as f64 - 0.5);
        let names: Vec<String> = columns
            .iter()
            .map(|(name, stats)| format!("{} (n={})", name, stats.count))
            .collect();
        let label_for = |v: &f64| {
            let idx = v.round();
            if (v - idx).abs() < 1e-6 && idx >= 0.0 {
                names.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };

        let mut chart = Self::build_2d(root, title, x_range, y_range)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(columns.len() * 2 + 1)
            .x_label_formatter(&label_for)
            .y_desc("Value")
            .label_style((FONT, LABEL_SIZE))
            .draw()?;

        let color = style.rgb();
        for (i, (_, stats)) in columns.iter().enumerate() {
            let x = i as f64;
            let half = 0.25;

            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - half, stats.q1), (x + half, stats.q3)],
                color.mix(0.3).filled(),
            )))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - half, stats.q1), (x + half, stats.q3)],
                color.stroke_width(LINE_WIDTH),
            )))?;

            let segments = [
                [(x - half, stats.median), (x + half, stats.median)],
                [(x, stats.q3), (x, stats.whisker_high)],
                [(x, stats.q1), (x, stats.whisker_low)],
                [(x - half / 2.0, stats.whisker_high), (x + half / 2.0, stats.whisker_high)],
                [(x - half / 2.0, stats.whisker_low), (x + half / 2.0, stats.whisker_low)],
            ];
            chart.draw_series(
                segments
                    .iter()
                    .map(|seg| PathElement::new(seg.to_vec(), BLACK.stroke_width(LINE_WIDTH))),
            )?;

            chart.draw_series(
                stats
                    .outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), 4, BLACK.stroke_width(1))),
            )?;

            // mean
            chart.draw_series(std::iter::once(Cross::new(
                (x, stats.mean),
                5,
                BLACK.stroke_width(LINE_WIDTH),
            )))?;
        }
        Ok(())
    }

    fn draw_scatter_3d(
        root: &Area,
        title: &str,
        axes: &[String; 3],
        points: &[(f64, f64, f64)],
        style: &StyleConfig,
    ) -> DrawResult<()> {
        let x_range = padded_range(points.iter().map(|p| p.0));
        let y_range = padded_range(points.iter().map(|p| p.1));
        let z_range = padded_range(points.iter().map(|p| p.2));

        // plotters' second axis is vertical, so the data z goes there
        for range in [&x_range, &y_range, &z_range] {
            check_span(range)?;
        }
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(20)
            .build_cartesian_3d(x_range, z_range, y_range)?;
        chart.with_projection(|mut pb| {
            pb.pitch = 0.5;
            pb.yaw = 0.6;
            pb.scale = 0.8;
            pb.into_matrix()
        });
        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.15))
            .max_light_lines(3)
            .draw()?;

        let color = style.rgb();
        let radius = style.marker_radius() as i32;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y, z)| Circle::new((x, z, y), radius, color.mix(0.6).filled())),
        )?;

        Self::draw_axis_footer(root, axes)
    }

    fn draw_surface(
        root: &Area,
        title: &str,
        axes: &[String; 3],
        grid: &SurfaceGrid,
        style: &StyleConfig,
        max_axis_points: usize,
    ) -> DrawResult<()> {
        let xs = lattice_axis(&grid.xs, max_axis_points);
        let ys = lattice_axis(&grid.ys, max_axis_points);

        let x_range = padded_range(xs.iter().copied());
        let y_range = padded_range(ys.iter().copied());
        let z_range = padded_range(grid.z.iter().flatten().copied());

        for range in [&x_range, &y_range, &z_range] {
            check_span(range)?;
        }
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(20)
            .build_cartesian_3d(x_range, z_range, y_range)?;
        chart.with_projection(|mut pb| {
            pb.pitch = 0.5;
            pb.yaw = 0.6;
            pb.scale = 0.8;
            pb.into_matrix()
        });
        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.15))
            .max_light_lines(3)
            .draw()?;

        let color = style.rgb();
        chart.draw_series(
            SurfaceSeries::xoz(xs.iter().copied(), ys.iter().copied(), |x, y| surface_z(x, y))
                .style(color.mix(0.5).filled()),
        )?;

        Self::draw_axis_footer(root, axes)
    }

    fn draw_axis_footer(root: &Area, axes: &[String; 3]) -> DrawResult<()> {
        let (_, height) = root.dim_in_pixel();
        let style = (FONT, LABEL_SIZE).into_text_style(root);
        root.draw_text(
            &format!("x: {}   y: {}   z: {}", axes[0], axes[1], axes[2]),
            &style,
            (15, height as i32 - 25),
        )?;
        Ok(())
    }
}

/// Observed range of the finite values, widened by 5% on each side.
/// Degenerate ranges are widened by at least half a unit; no finite input
/// maps to `0..1`.
pub fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    let pad = if lo == hi {
        (lo.abs() / 20.0).max(0.5)
    } else {
        hi / 20.0 - lo / 20.0
    };
    (lo - pad).max(-f64::MAX)..(hi + pad).min(f64::MAX)
}

/// Axis ranges must have a finite, positive span; plotters does not
/// terminate on anything else.
fn check_span(range: &Range<f64>) -> DrawResult<()> {
    let span = range.end - range.start;
    if span.is_finite() && span > 0.0 {
        Ok(())
    } else {
        Err(format!("axis range {:?} cannot be drawn", range).into())
    }
}

/// On/off lengths in pixels for each line style. Empty means solid.
pub fn dash_pattern(style: LineStyle) -> &'static [f64] {
    match style {
        LineStyle::Solid => &[],
        LineStyle::Dashed => &[12.0, 6.0],
        LineStyle::DashDot => &[12.0, 5.0, 3.0, 5.0],
        LineStyle::Dotted => &[2.0, 4.0],
    }
}

/// Split a polyline into the visible pieces of a repeating dash pattern.
/// The pattern continues across vertices.
pub fn dash_segments(path: &[(f64, f64)], pattern: &[f64]) -> Vec<((f64, f64), (f64, f64))> {
    if pattern.is_empty() || pattern.iter().any(|&len| len <= 0.0) {
        return path.windows(2).map(|w| (w[0], w[1])).collect();
    }

    let mut segments = Vec::new();
    let mut idx = 0;
    let mut remaining = pattern[0];

    for w in path.windows(2) {
        let (mut start, end) = (w[0], w[1]);
        let mut left = ((end.0 - start.0).powi(2) + (end.1 - start.1).powi(2)).sqrt();

        while left > 0.0 {
            let step = remaining.min(left);
            let next = if step >= left {
                end
            } else {
                let t = step / left;
                (
                    start.0 + (end.0 - start.0) * t,
                    start.1 + (end.1 - start.1) * t,
                )
            };
            if idx % 2 == 0 {
                segments.push((start, next));
            }
            start = next;
            left -= step;
            remaining -= step;
            if remaining <= 0.0 {
                idx = (idx + 1) % pattern.len();
                remaining = pattern[idx];
            }
        }
    }

    segments
}

/// Sorted, deduplicated lattice values, thinned to at most `max_points`
/// evenly spaced entries (always keeping both ends).
pub fn lattice_axis(values: &[f64], max_points: usize) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup();

    let max_points = max_points.max(2);
    if sorted.len() <= max_points {
        return sorted;
    }

    let last = sorted.len() - 1;
    (0..max_points)
        .map(|i| sorted[i * last / (max_points - 1)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    fn assert_segments(actual: &[((f64, f64), (f64, f64))], expected: &[((f64, f64), (f64, f64))]) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert!(close(a.0, e.0) && close(a.1, e.1), "{:?} != {:?}", a, e);
        }
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([0.0, 10.0].into_iter()), -0.5..10.5);
        assert_eq!(padded_range([3.0].into_iter()), 2.5..3.5);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn test_padded_range_ignores_non_finite() {
        assert_eq!(
            padded_range([0.0, f64::INFINITY, 10.0, f64::NAN].into_iter()),
            -0.5..10.5
        );
        assert_eq!(padded_range([f64::NEG_INFINITY].into_iter()), 0.0..1.0);
        let wide = padded_range([-f64::MAX, f64::MAX].into_iter());
        assert!(wide.start.is_finite() && wide.end.is_finite());
    }

    #[test]
    fn test_check_span() {
        assert!(check_span(&(0.0..1.0)).is_ok());
        assert!(check_span(&(1.0..1.0)).is_err());
        assert!(check_span(&(f64::NAN..1.0)).is_err());
        assert!(check_span(&(-f64::MAX..f64::MAX)).is_err());
    }

    #[test]
    fn test_solid_keeps_every_segment() {
        let path = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        assert_eq!(dash_segments(&path, dash_pattern(LineStyle::Solid)).len(), 2);
    }

    #[test]
    fn test_dashes_alternate() {
        let path = [(0.0, 0.0), (30.0, 0.0)];
        let segments = dash_segments(&path, &[10.0, 5.0]);
        assert_segments(
            &segments,
            &[((0.0, 0.0), (10.0, 0.0)), ((15.0, 0.0), (25.0, 0.0))],
        );
    }

    #[test]
    fn test_dash_pattern_continues_across_vertices() {
        let path = [(0.0, 0.0), (6.0, 0.0), (6.0, 6.0)];
        let segments = dash_segments(&path, &[10.0, 5.0]);
        assert_segments(
            &segments,
            &[((0.0, 0.0), (6.0, 0.0)), ((6.0, 0.0), (6.0, 4.0))],
        );
    }

    #[test]
    fn test_lattice_axis_thins_and_sorts() {
        let values: Vec<f64> = (0..100).rev().map(|i| i as f64).collect();
        let axis = lattice_axis(&values, 5);
        assert_eq!(axis, vec![0.0, 24.0, 49.0, 74.0, 99.0]);
        assert_eq!(lattice_axis(&[2.0, 1.0, 2.0], 10), vec![1.0, 2.0]);
    }
}
