use log::info;
use std::fmt;

/// Summary of the non-NaN values of one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStatistics {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub valid: usize,
    pub total: usize,
}

impl BandStatistics {
    pub fn from_values(values: &[f32]) -> Self {
        let valid_values: Vec<f32> = values.iter().copied().filter(|v| !v.is_nan()).collect();

        let mean = if valid_values.is_empty() {
            f32::NAN
        } else {
            (valid_values.iter().map(|&v| v as f64).sum::<f64>() / valid_values.len() as f64) as f32
        };

        Self {
            min: valid_values.iter().copied().fold(f32::NAN, f32::min),
            max: valid_values.iter().copied().fold(f32::NAN, f32::max),
            mean,
            valid: valid_values.len(),
            total: values.len(),
        }
    }

    pub fn valid_percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.valid as f32 / self.total as f32
        }
    }
}

impl fmt::Display for BandStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min {:.6}, max {:.6}, mean {:.6}, valid pixels {} / {} ({:.1}%)",
            self.min,
            self.max,
            self.mean,
            self.valid,
            self.total,
            self.valid_percent()
        )
    }
}

pub fn log_band_statistics(name: &str, values: &[f32]) -> BandStatistics {
    let stats = BandStatistics::from_values(values);
    info!("  {}: {}", name, stats);
    stats
}
