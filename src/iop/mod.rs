//! Inherent Optical Properties (IOP) module
//!
//! Retrieval of absorption and backscattering coefficients of water from
//! remote sensing reflectance with the Quasi-Analytical Algorithm, plus the
//! per-pixel result record, sensor presets and the euphotic depth extension.

pub mod algorithm;
pub mod constants;
pub mod error;
pub mod qaa;
pub mod qaa_config;
pub mod result;
pub mod sensor;
pub mod water_clarity;

pub use algorithm::{ConfAlgorithm, QaaAlgorithm};
pub use constants::*;
pub use error::QaaError;
pub use qaa::*;
pub use qaa_config::{Bounds, QaaConfig};
pub use result::{IopFlags, IopResult};
pub use sensor::{BandIndices, Sensor, SensorConfig, SensorError};
pub use water_clarity::{WaterClarity, qaaf_zeu};
