use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    BoundsOrder(&'static str),
    BandCount { expected: usize, got: usize },
    Latitude(f64),
    Longitude(f64),
    AcquisitionTime(chrono::ParseError),
    MissingSunPosition,
    MaskBit(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse JSON: {}", e),
            ConfigError::BoundsOrder(name) => {
                write!(f, "{name} lower bound is greater than its upper bound")
            }
            ConfigError::BandCount { expected, got } => {
                write!(f, "expected {expected} reflectance bands, got {got}")
            }
            ConfigError::Latitude(v) => write!(f, "latitude should be in [-90, 90], got {v}"),
            ConfigError::Longitude(v) => write!(f, "longitude should be in [-180, 180], got {v}"),
            ConfigError::AcquisitionTime(e) => write!(f, "Failed to parse acquisition_time: {e}"),
            ConfigError::MissingSunPosition => write!(
                f,
                "water_clarity needs either sun_zenith or acquisition_time, latitude and longitude"
            ),
            ConfigError::MaskBit(bit) => write!(f, "water_mask bit should be below 32, got {bit}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::AcquisitionTime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> ConfigError {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> ConfigError {
        ConfigError::Json(err)
    }
}

impl From<chrono::ParseError> for ConfigError {
    fn from(err: chrono::ParseError) -> ConfigError {
        ConfigError::AcquisitionTime(err)
    }
}
