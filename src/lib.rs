//! Inversion of ocean colour remote sensing reflectance into inherent optical
//! properties with the Quasi-Analytical Algorithm (QAA v5).

pub mod config;
pub mod iop;
pub mod processor;
pub mod readers;
pub mod solar;
pub mod utils;

pub use config::Config;
pub use iop::{
    Bounds, ConfAlgorithm, IopFlags, IopResult, QaaAlgorithm, QaaConfig, QaaError, Sensor,
    SensorConfig, WaterClarity, qaaf_zeu,
};
pub use processor::SceneProcessor;
