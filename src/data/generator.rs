//! Synthetic Data Generator
//! Reproducible random numeric data for trying charts without a file.

use crate::data::loader::IntakeError;
use polars::prelude::*;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

/// Fixed seed so the same sample count always yields the same frame.
pub const GENERATOR_SEED: u64 = 42;
pub const MIN_SAMPLES: usize = 10;
pub const MAX_SAMPLES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSpec {
    pub sample_count: usize,
}

impl GeneratorSpec {
    pub fn new(sample_count: usize) -> Self {
        Self { sample_count }
    }
}

pub struct DataGenerator;

impl DataGenerator {
    /// Columns X and Y are standard normal, Z is normal with std 10.
    pub fn generate(spec: &GeneratorSpec) -> Result<DataFrame, IntakeError> {
        let n = spec.sample_count;
        if !(MIN_SAMPLES..=MAX_SAMPLES).contains(&n) {
            return Err(IntakeError::SampleCount {
                requested: n,
                min: MIN_SAMPLES,
                max: MAX_SAMPLES,
            });
        }

        let mut rng = StdRng::seed_from_u64(GENERATOR_SEED);
        let normal = Normal::new(0.0, 1.0).map_err(|e| IntakeError::Generator(e.to_string()))?;

        let x: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
        let y: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
        let z: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng) * 10.0).collect();

        log::debug!("Generated {} samples with seed {}", n, GENERATOR_SEED);

        let df = DataFrame::new(vec![
            Column::new("X".into(), x),
            Column::new("Y".into(), y),
            Column::new("Z".into(), z),
        ])?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_count_is_bit_identical() {
        let a = DataGenerator::generate(&GeneratorSpec::new(200)).unwrap();
        let b = DataGenerator::generate(&GeneratorSpec::new(200)).unwrap();
        assert!(a.equals(&b));

        let xa: Vec<u64> = a
            .column("Z")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .map(f64::to_bits)
            .collect();
        let xb: Vec<u64> = b
            .column("Z")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .map(f64::to_bits)
            .collect();
        assert_eq!(xa, xb);
    }

    #[test]
    fn test_shape() {
        let df = DataGenerator::generate(&GeneratorSpec::new(50)).unwrap();
        assert_eq!(df.height(), 50);
        assert_eq!(df.width(), 3);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_bounds() {
        assert!(matches!(
            DataGenerator::generate(&GeneratorSpec::new(9)),
            Err(IntakeError::SampleCount { requested: 9, .. })
        ));
        assert!(DataGenerator::generate(&GeneratorSpec::new(1001)).is_err());
        assert!(DataGenerator::generate(&GeneratorSpec::new(MIN_SAMPLES)).is_ok());
        assert!(DataGenerator::generate(&GeneratorSpec::new(MAX_SAMPLES)).is_ok());
    }
}
