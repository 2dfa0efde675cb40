//! Charts module - request validation, geometry and rendering

mod dispatcher;
mod geometry;
mod renderer;
mod request;

pub use dispatcher::{ChartDispatcher, ChartError, RenderedChart};
pub use request::{ChartFamily, ChartKind, ChartRequest, LineStyle, StyleConfig};
