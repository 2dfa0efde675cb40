//! Data module - intake, generation and column selection

mod generator;
mod loader;
mod processor;

pub use generator::{GeneratorSpec, MAX_SAMPLES, MIN_SAMPLES};
pub use loader::{delimiter_name, DataLoader, DataSource, FileFormat, TextEncoding};
pub use processor::DataProcessor;
