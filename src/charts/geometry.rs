//! Chart Geometry Module
//! Plot-ready data for each chart kind, computed before any drawing.

use crate::stats::{BoxStats, HistogramBin};

/// One variant per chart kind. The renderer matches on this exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartGeometry {
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
    },
    /// Value by row index, connected in row order.
    Line1D {
        column: String,
        points: Vec<(f64, f64)>,
    },
    /// Value by row index as discrete bars.
    Bar {
        column: String,
        bars: Vec<(usize, f64)>,
    },
    Scatter2D {
        x: String,
        y: String,
        points: Vec<(f64, f64)>,
    },
    /// Independent summaries of the two axis columns.
    Box {
        columns: Vec<(String, BoxStats)>,
    },
    Line2D {
        x: String,
        y: String,
        points: Vec<(f64, f64)>,
    },
    Scatter3D {
        axes: [String; 3],
        points: Vec<(f64, f64, f64)>,
    },
    /// Illustrative surface over the x/y lattice. The third axis column only
    /// names the vertical axis; its values are not plotted.
    Surface {
        axes: [String; 3],
        grid: SurfaceGrid,
    },
}

impl ChartGeometry {
    pub fn title(&self) -> String {
        match self {
            ChartGeometry::Histogram { column, .. } => format!("Histogram of {}", column),
            ChartGeometry::Line1D { column, .. } => format!("Line Plot of {}", column),
            ChartGeometry::Bar { column, .. } => format!("Bar Plot of {}", column),
            ChartGeometry::Scatter2D { x, y, .. } => format!("Scatter Plot: {} vs {}", x, y),
            ChartGeometry::Box { columns } => {
                let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
                format!("Box Plot of {}", names.join(" & "))
            }
            ChartGeometry::Line2D { x, y, .. } => format!("Line Plot: {} vs {}", x, y),
            ChartGeometry::Scatter3D { .. } => "3D Scatter Plot".to_string(),
            ChartGeometry::Surface { .. } => "3D Surface Plot".to_string(),
        }
    }

    /// Number of plotted marks (points, bars, buckets, lattice cells).
    pub fn mark_count(&self) -> usize {
        match self {
            ChartGeometry::Histogram { bins, .. } => bins.len(),
            ChartGeometry::Line1D { points, .. }
            | ChartGeometry::Scatter2D { points, .. }
            | ChartGeometry::Line2D { points, .. } => points.len(),
            ChartGeometry::Bar { bars, .. } => bars.len(),
            ChartGeometry::Box { columns } => columns.len(),
            ChartGeometry::Scatter3D { points, .. } => points.len(),
            ChartGeometry::Surface { grid, .. } => grid.xs.len() * grid.ys.len(),
        }
    }
}

/// Derived height of the illustrative surface at `(x, y)`.
pub fn surface_z(x: f64, y: f64) -> f64 {
    x.sin() + y.cos()
}

/// Cross product of the x and y column values with a derived height at each
/// point. `z[j][i]` belongs to `(xs[i], ys[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

impl SurfaceGrid {
    pub fn from_axes(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        let z = ys
            .iter()
            .map(|&y| xs.iter().map(|&x| surface_z(x, y)).collect())
            .collect();
        Self { xs, ys, z }
    }

    pub fn z_at(&self, i: usize, j: usize) -> Option<f64> {
        self.z.get(j).and_then(|row| row.get(i)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_origin_is_one() {
        let grid = SurfaceGrid::from_axes(vec![0.0], vec![0.0]);
        assert_eq!(grid.z, vec![vec![1.0]]);
    }

    #[test]
    fn test_surface_lattice_shape() {
        let grid = SurfaceGrid::from_axes(vec![0.0, 1.0, 2.0], vec![0.5, -0.5]);
        assert_eq!(grid.z.len(), 2);
        assert!(grid.z.iter().all(|row| row.len() == 3));
        let expected = 2.0f64.sin() + (-0.5f64).cos();
        assert!((grid.z_at(2, 1).unwrap() - expected).abs() < 1e-12);
        assert!(grid.z_at(3, 0).is_none());
    }

    #[test]
    fn test_titles() {
        let geometry = ChartGeometry::Scatter2D {
            x: "X".to_string(),
            y: "Y".to_string(),
            points: vec![(0.0, 1.0)],
        };
        assert_eq!(geometry.title(), "Scatter Plot: X vs Y");
        assert_eq!(geometry.mark_count(), 1);
    }
}
