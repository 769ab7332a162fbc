use chrono::NaiveDateTime;
use log::warn;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::iop::{QaaConfig, Sensor, WaterClarity};
use crate::solar::sun_zenithal_angle;

pub mod error;
pub use error::ConfigError;

const ACQUISITION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Flag raster selecting water pixels
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WaterMask {
    pub file: String,
    /// Water when this bit is set. Without it, any non-zero value is water.
    pub bit: Option<u32>,
}

impl WaterMask {
    pub fn is_water(&self, value: u32) -> bool {
        match self.bit {
            Some(bit) => bit < 32 && value & (1 << bit) != 0,
            None => value != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunPosition {
    Zenith(f64),
    Computed {
        acquisition_time: NaiveDateTime,
        latitude: f64,
        longitude: f64,
    },
}

impl SunPosition {
    /// Solar zenith angle in degrees
    pub fn zenith(&self) -> f64 {
        match *self {
            SunPosition::Zenith(zenith) => zenith,
            SunPosition::Computed {
                acquisition_time,
                latitude,
                longitude,
            } => sun_zenithal_angle(acquisition_time, longitude, latitude),
        }
    }
}

/// Settings of the optional euphotic depth band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterClarityConfig {
    pub percentile: WaterClarity,
    pub sun: SunPosition,
}

#[derive(Debug, Clone)]
pub struct Config {
    sensor: Sensor,
    qaa: QaaConfig,
    input_directory: PathBuf,
    bands: Vec<String>,
    water_mask: Option<WaterMask>,
    output_directory: PathBuf,
    water_clarity: Option<WaterClarityConfig>,
}

// Deserializes a Config, checking bound ordering, the band count against the
// sensor and the water clarity geometry.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            #[serde(default)]
            sensor: Sensor,
            #[serde(default)]
            qaa: QaaConfig,
            input_directory: PathBuf,
            bands: Vec<String>,
            water_mask: Option<WaterMask>,
            output_directory: PathBuf,
            water_clarity: Option<WaterClarityHelper>,
        }

        #[derive(Deserialize)]
        struct WaterClarityHelper {
            #[serde(default = "default_percentile")]
            percentile: u32,
            sun_zenith: Option<f64>,
            acquisition_time: Option<String>,
            latitude: Option<f64>,
            longitude: Option<f64>,
        }

        fn default_percentile() -> u32 {
            1
        }

        impl WaterClarityHelper {
            fn sun_position(self) -> Result<SunPosition, ConfigError> {
                if let Some(zenith) = self.sun_zenith {
                    return Ok(SunPosition::Zenith(zenith));
                }

                match (self.acquisition_time, self.latitude, self.longitude) {
                    (Some(time), Some(latitude), Some(longitude)) => {
                        if !(-90.0..=90.0).contains(&latitude) {
                            return Err(ConfigError::Latitude(latitude));
                        }
                        if !(-180.0..=180.0).contains(&longitude) {
                            return Err(ConfigError::Longitude(longitude));
                        }
                        let acquisition_time =
                            NaiveDateTime::parse_from_str(&time, ACQUISITION_TIME_FORMAT)?;
                        Ok(SunPosition::Computed {
                            acquisition_time,
                            latitude,
                            longitude,
                        })
                    }
                    _ => Err(ConfigError::MissingSunPosition),
                }
            }
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        if let Some(name) = helper.qaa.first_unordered() {
            return Err(D::Error::custom(ConfigError::BoundsOrder(name)));
        }

        let expected = helper.sensor.config().input_bands();
        if helper.bands.len() != expected {
            return Err(D::Error::custom(ConfigError::BandCount {
                expected,
                got: helper.bands.len(),
            }));
        }

        if let Some(bit) = helper.water_mask.as_ref().and_then(|mask| mask.bit)
            && bit >= 32
        {
            return Err(D::Error::custom(ConfigError::MaskBit(bit)));
        }

        let water_clarity = match helper.water_clarity {
            Some(wc) => {
                let percentile = WaterClarity::from_percent(wc.percentile);
                if percentile.percent() != wc.percentile {
                    warn!(
                        "Unrecognised water clarity percentile {}, using {}",
                        wc.percentile, percentile
                    );
                }

                let sun = wc.sun_position().map_err(D::Error::custom)?;

                Some(WaterClarityConfig { percentile, sun })
            }
            None => None,
        };

        Ok(Config {
            sensor: helper.sensor,
            qaa: helper.qaa,
            input_directory: helper.input_directory,
            bands: helper.bands,
            water_mask: helper.water_mask,
            output_directory: helper.output_directory,
            water_clarity,
        })
    }
}

impl Config {
    pub fn new(
        sensor: Sensor,
        input_directory: impl Into<PathBuf>,
        bands: Vec<String>,
        output_directory: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let expected = sensor.config().input_bands();
        if bands.len() != expected {
            return Err(ConfigError::BandCount {
                expected,
                got: bands.len(),
            });
        }

        Ok(Self {
            sensor,
            qaa: QaaConfig::default(),
            input_directory: input_directory.into(),
            bands,
            water_mask: None,
            output_directory: output_directory.into(),
            water_clarity: None,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn with_qaa(mut self, qaa: QaaConfig) -> Result<Self, ConfigError> {
        if let Some(name) = qaa.first_unordered() {
            return Err(ConfigError::BoundsOrder(name));
        }
        self.qaa = qaa;
        Ok(self)
    }

    pub fn with_water_mask(mut self, water_mask: WaterMask) -> Self {
        self.water_mask = Some(water_mask);
        self
    }

    pub fn with_water_clarity(mut self, water_clarity: WaterClarityConfig) -> Self {
        self.water_clarity = Some(water_clarity);
        self
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    pub fn qaa(&self) -> &QaaConfig {
        &self.qaa
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    pub fn water_mask(&self) -> Option<&WaterMask> {
        self.water_mask.as_ref()
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn water_clarity(&self) -> Option<&WaterClarityConfig> {
        self.water_clarity.as_ref()
    }
}
