//! Stats module - histogram and box-plot calculations

mod calculator;

pub use calculator::{BoxStats, HistogramBin, StatsCalculator};
