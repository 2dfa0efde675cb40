//! Chart Dispatcher Module
//! Validates a chart request against the dataset, resolves it into geometry
//! and renders it to an in-memory bitmap.

use crate::charts::geometry::{ChartGeometry, SurfaceGrid};
use crate::charts::renderer::StaticChartRenderer;
use crate::charts::request::{ChartFamily, ChartKind, ChartRequest};
use crate::config::AppConfig;
use crate::data::DataProcessor;
use crate::stats::StatsCalculator;
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("{family} charts need {expected} axis column(s), got {got}")]
    AxisCount {
        family: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{kind} is not available for {family} charts")]
    UnsupportedKind {
        family: &'static str,
        kind: &'static str,
    },
    #[error("Column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Column '{0}' is selected for more than one axis")]
    DuplicateAxis(String),
    #[error("Column '{0}' has no values to plot")]
    NoValues(String),
    #[error("Invalid style: {0}")]
    InvalidStyle(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// One rendered chart: RGB pixels plus the geometry they were drawn from.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub title: String,
    pub geometry: ChartGeometry,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB, three bytes per pixel.
    pub pixels: Vec<u8>,
}

impl RenderedChart {
    /// Encode the bitmap as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, ChartError> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| ChartError::Render("pixel buffer does not match chart size".into()))?;

        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(bytes)
    }
}

/// Turns chart requests into rendered charts. Holds only output settings;
/// every call renders from scratch.
#[derive(Debug, Clone)]
pub struct ChartDispatcher {
    pub width: u32,
    pub height: u32,
    pub surface_max_axis_points: usize,
}

impl Default for ChartDispatcher {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ChartDispatcher {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            width: config.chart_width.max(1),
            height: config.chart_height.max(1),
            surface_max_axis_points: config.surface_max_axis_points.max(2),
        }
    }

    /// Validate and draw one chart. Nothing is drawn when validation fails.
    pub fn render(&self, df: &DataFrame, request: &ChartRequest) -> Result<RenderedChart, ChartError> {
        let geometry = Self::plan(df, request)?;
        let title = geometry.title();
        log::debug!(
            "Rendering '{}' ({} marks) at {}x{}",
            title,
            geometry.mark_count(),
            self.width,
            self.height
        );

        let pixels = StaticChartRenderer::draw(
            &geometry,
            &request.style,
            &title,
            self.width,
            self.height,
            self.surface_max_axis_points,
        )
        .map_err(|e| ChartError::Render(e.to_string()))?;

        Ok(RenderedChart {
            title,
            geometry,
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    /// Resolve a request into plot-ready geometry.
    pub fn plan(df: &DataFrame, request: &ChartRequest) -> Result<ChartGeometry, ChartError> {
        let family = request.family;
        let kind = request.kind;

        if !family.supports(kind) {
            return Err(ChartError::UnsupportedKind {
                family: family.label(),
                kind: kind.label(),
            });
        }

        let axes = &request.axis_columns;
        if axes.len() != family.axis_count() {
            return Err(ChartError::AxisCount {
                family: family.label(),
                expected: family.axis_count(),
                got: axes.len(),
            });
        }

        let numeric = DataProcessor::numeric_columns(df);
        for (i, name) in axes.iter().enumerate() {
            if df.column(name).is_err() {
                return Err(ChartError::UnknownColumn(name.clone()));
            }
            if !numeric.contains(name) {
                return Err(ChartError::NotNumeric(name.clone()));
            }
            if axes[..i].contains(name) {
                return Err(ChartError::DuplicateAxis(name.clone()));
            }
        }

        match (family, kind) {
            (ChartFamily::OneD, ChartKind::Histogram) => {
                let column = axes[0].clone();
                let values = Self::present_values(df, &column)?;
                let bins = StatsCalculator::histogram(&values, request.style.bin_count() as usize);
                Ok(ChartGeometry::Histogram { column, bins })
            }
            (ChartFamily::OneD, ChartKind::Line) => {
                let column = axes[0].clone();
                let points = Self::indexed_values(df, &column)?
                    .into_iter()
                    .map(|(i, v)| (i as f64, v))
                    .collect();
                Ok(ChartGeometry::Line1D { column, points })
            }
            (ChartFamily::OneD, ChartKind::Bar) => {
                let column = axes[0].clone();
                let bars = Self::indexed_values(df, &column)?;
                Ok(ChartGeometry::Bar { column, bars })
            }
            (ChartFamily::TwoD, ChartKind::Scatter) => {
                let (x, y) = (axes[0].clone(), axes[1].clone());
                let points = Self::paired_values(df, &x, &y)?;
                Ok(ChartGeometry::Scatter2D { x, y, points })
            }
            (ChartFamily::TwoD, ChartKind::Line) => {
                let (x, y) = (axes[0].clone(), axes[1].clone());
                let points = Self::paired_values(df, &x, &y)?;
                Ok(ChartGeometry::Line2D { x, y, points })
            }
            (ChartFamily::TwoD, ChartKind::Box) => {
                let columns = axes
                    .iter()
                    .map(|name| {
                        let values = Self::present_values(df, name)?;
                        let stats = StatsCalculator::box_stats(&values)
                            .ok_or_else(|| ChartError::NoValues(name.clone()))?;
                        Ok((name.clone(), stats))
                    })
                    .collect::<Result<Vec<_>, ChartError>>()?;
                Ok(ChartGeometry::Box { columns })
            }
            (ChartFamily::ThreeD, ChartKind::Scatter) => {
                let axes_owned = [axes[0].clone(), axes[1].clone(), axes[2].clone()];
                let xs = DataProcessor::column_values(df, &axes[0])?;
                let ys = DataProcessor::column_values(df, &axes[1])?;
                let zs = DataProcessor::column_values(df, &axes[2])?;
                let points: Vec<(f64, f64, f64)> = xs
                    .into_iter()
                    .zip(ys)
                    .zip(zs)
                    .filter_map(|((x, y), z)| Some((x?, y?, z?)))
                    .collect();
                if points.is_empty() {
                    return Err(ChartError::NoValues(axes[0].clone()));
                }
                Ok(ChartGeometry::Scatter3D {
                    axes: axes_owned,
                    points,
                })
            }
            (ChartFamily::ThreeD, ChartKind::Surface) => {
                // The z column is validated like the others but does not feed
                // the surface heights.
                let axes_owned = [axes[0].clone(), axes[1].clone(), axes[2].clone()];
                let xs = Self::present_values(df, &axes[0])?;
                let ys = Self::present_values(df, &axes[1])?;
                Ok(ChartGeometry::Surface {
                    axes: axes_owned,
                    grid: SurfaceGrid::from_axes(xs, ys),
                })
            }
            _ => Err(ChartError::UnsupportedKind {
                family: family.label(),
                kind: kind.label(),
            }),
        }
    }

    /// Non-missing values of a column, in row order.
    fn present_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, ChartError> {
        let values: Vec<f64> = DataProcessor::column_values(df, name)?
            .into_iter()
            .flatten()
            .collect();
        if values.is_empty() {
            return Err(ChartError::NoValues(name.to_string()));
        }
        Ok(values)
    }

    /// Non-missing values with their row index.
    fn indexed_values(df: &DataFrame, name: &str) -> Result<Vec<(usize, f64)>, ChartError> {
        let values: Vec<(usize, f64)> = DataProcessor::column_values(df, name)?
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();
        if values.is_empty() {
            return Err(ChartError::NoValues(name.to_string()));
        }
        Ok(values)
    }

    /// Rows where both columns have a value, in row order.
    fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<Vec<(f64, f64)>, ChartError> {
        let xs = DataProcessor::column_values(df, x)?;
        let ys = DataProcessor::column_values(df, y)?;
        let points: Vec<(f64, f64)> = xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| Some((x?, y?)))
            .collect();
        if points.is_empty() {
            return Err(ChartError::NoValues(x.to_string()));
        }
        Ok(points)
    }
}
