use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;

use crate::iop::constants::{
    A_COEFFS_V5, A_COEFFS_V5_LEGACY, G0_LEE, G0_V5_C, G1_LEE, G1_V5_C, MAX_BANDS, MERIS_LEGACY_AW,
    MERIS_LEGACY_BBW, MERIS_LEGACY_WAVELENGTHS, NUM_A_TOTAL_BANDS, RED_RATIO_EXPONENT,
};

#[derive(Error, Debug, PartialEq)]
pub enum SensorError {
    #[error("tables differ: {wavelengths} wavelengths, {aw} aw, {bbw} bbw")]
    TableLength {
        wavelengths: usize,
        aw: usize,
        bbw: usize,
    },

    #[error("sensor needs between {min} and {max} bands, got {got}")]
    BandCount { min: usize, max: usize, got: usize },

    #[error("band index {name} = {index} is out of range")]
    BandIndex { name: &'static str, index: usize },
}

/// Positions of the bands the retrieval reads by role.
///
/// All but `red` must index into the sensor's wavelength table. `red` may
/// point one past it, to an input band used only for the red-band repair and
/// the reference-absorption ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandIndices {
    pub violet: usize, // ~410 nm
    pub blue: usize,   // ~440 nm
    pub cyan: usize,   // ~490 nm
    pub green: usize,  // ~555-560 nm, reference band
    pub red: usize,    // ~665-670 nm
}

/// Immutable per-instrument constants for the QAA kernel.
///
/// Built once per sensor and shared read-only across every pixel and worker.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    name: String,
    wavelengths: Vec<f64>,
    aw: Vec<f64>,
    bbw: Vec<f64>,
    a_coeffs: [f64; 3],
    g0: f64,
    g1: f64,
    indices: BandIndices,
    red_ratio_exponent: f64,
}

impl SensorConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        wavelengths: Vec<f64>,
        aw: Vec<f64>,
        bbw: Vec<f64>,
        a_coeffs: [f64; 3],
        g0: f64,
        g1: f64,
        indices: BandIndices,
    ) -> Result<Self, SensorError> {
        if wavelengths.len() != aw.len() || wavelengths.len() != bbw.len() {
            return Err(SensorError::TableLength {
                wavelengths: wavelengths.len(),
                aw: aw.len(),
                bbw: bbw.len(),
            });
        }

        // The red band may live past the table, and still needs a stack slot
        let n = wavelengths.len();
        if !(NUM_A_TOTAL_BANDS..MAX_BANDS).contains(&n) {
            return Err(SensorError::BandCount {
                min: NUM_A_TOTAL_BANDS,
                max: MAX_BANDS - 1,
                got: n,
            });
        }

        let named = [
            ("violet", indices.violet),
            ("blue", indices.blue),
            ("cyan", indices.cyan),
            ("green", indices.green),
        ];
        for (name, index) in named {
            if index >= n {
                return Err(SensorError::BandIndex { name, index });
            }
        }
        if indices.red > n {
            return Err(SensorError::BandIndex {
                name: "red",
                index: indices.red,
            });
        }
        Ok(Self {
            name: name.into(),
            wavelengths,
            aw,
            bbw,
            a_coeffs,
            g0,
            g1,
            indices,
            red_ratio_exponent: RED_RATIO_EXPONENT,
        })
    }

    /// Override the exponent of the 490/560 ratio in the red-band estimate.
    pub fn with_red_ratio_exponent(mut self, exponent: f64) -> Self {
        self.red_ratio_exponent = exponent;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Band centres (nm) of the bands absorption and backscatter are solved for
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Pure water absorption (m^-1) per band
    pub fn aw(&self) -> &[f64] {
        &self.aw
    }

    /// Pure water backscattering (m^-1) per band
    pub fn bbw(&self) -> &[f64] {
        &self.bbw
    }

    pub fn a_coeffs(&self) -> [f64; 3] {
        self.a_coeffs
    }

    pub fn g0(&self) -> f64 {
        self.g0
    }

    pub fn g1(&self) -> f64 {
        self.g1
    }

    pub fn indices(&self) -> BandIndices {
        self.indices
    }

    pub fn red_ratio_exponent(&self) -> f64 {
        self.red_ratio_exponent
    }

    pub fn num_bands(&self) -> usize {
        self.wavelengths.len()
    }

    /// Reflectance values a pixel must supply, in band order.
    pub fn input_bands(&self) -> usize {
        self.num_bands().max(self.indices.red + 1)
    }

    pub fn reference_wavelength(&self) -> f64 {
        self.wavelengths[self.indices.green]
    }

    /// Index of the band whose centre is closest to `target` nm.
    pub fn closest_band(&self, target: f64) -> usize {
        let distance = |w: f64| (w - target).abs();
        self.wavelengths
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| distance(**a).total_cmp(&distance(**b)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// The original MERIS kernel: seven inputs, 665 nm only used for repair.
    pub fn meris_legacy() -> Self {
        Self::from_static(
            "MERIS (legacy)",
            &MERIS_LEGACY_WAVELENGTHS,
            &MERIS_LEGACY_AW,
            &MERIS_LEGACY_BBW,
            A_COEFFS_V5_LEGACY,
            (G0_V5_C, G1_V5_C),
            6,
        )
    }

    pub fn meris() -> Self {
        Self::from_static(
            "MERIS",
            &[413.0, 443.0, 490.0, 510.0, 560.0, 665.0],
            &[0.00449607, 0.00706914, 0.015, 0.0325, 0.0619, 0.429],
            &[
                0.00573196,
                0.00424592,
                0.00276835,
                0.00233870,
                0.00157958,
                0.000772104,
            ],
            A_COEFFS_V5,
            (G0_LEE, G1_LEE),
            5,
        )
    }

    /// MERIS band set with the legacy regression coefficients
    pub fn meris_old_coeffs() -> Self {
        Self::from_static(
            "MERIS (old coefficients)",
            &[412.0, 443.0, 490.0, 510.0, 560.0, 665.0],
            &[0.00469, 0.00721, 0.015, 0.0325, 0.0619, 0.429],
            &MERIS_LEGACY_BBW,
            A_COEFFS_V5_LEGACY,
            (G0_LEE, G1_LEE),
            5,
        )
    }

    pub fn modis() -> Self {
        Self::from_static(
            "MODIS",
            &[412.0, 443.0, 488.0, 531.0, 547.0, 667.0],
            &[
                0.00455056, 0.00706914, 0.0145167, 0.0439153, 0.0531686, 0.434888,
            ],
            &[
                0.00579201,
                0.00424592,
                0.00281659,
                0.00197385,
                0.0017428,
                0.000762543,
            ],
            A_COEFFS_V5,
            (G0_LEE, G1_LEE),
            5,
        )
    }

    pub fn seawifs() -> Self {
        Self::from_static(
            "SeaWiFS",
            &[412.0, 443.0, 490.0, 510.0, 555.0, 667.0],
            &[0.00455056, 0.00706914, 0.015, 0.0325, 0.0596, 0.434888],
            &[
                0.00579201,
                0.00424592,
                0.00276835,
                0.0023387,
                0.00163999,
                0.000762543,
            ],
            A_COEFFS_V5,
            (G0_LEE, G1_LEE),
            5,
        )
    }

    // Presets share the 410/443/490/../560/red layout
    fn from_static(
        name: &str,
        wavelengths: &[f64],
        aw: &[f64],
        bbw: &[f64],
        a_coeffs: [f64; 3],
        (g0, g1): (f64, f64),
        red: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            wavelengths: wavelengths.to_vec(),
            aw: aw.to_vec(),
            bbw: bbw.to_vec(),
            a_coeffs,
            g0,
            g1,
            indices: BandIndices {
                violet: 0,
                blue: 1,
                cyan: 2,
                green: 4,
                red,
            },
            red_ratio_exponent: RED_RATIO_EXPONENT,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::meris_legacy()
    }
}

impl Display for SensorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sensor: {}, Wavelengths: {:?}, Reference: {} nm",
            self.name,
            self.wavelengths,
            self.reference_wavelength()
        )
    }
}

/// Named sensor presets selectable from configuration files and the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    #[default]
    MerisLegacy,
    Meris,
    MerisOldCoeffs,
    Modis,
    #[serde(rename = "seawifs")]
    SeaWiFS,
}

impl Sensor {
    pub fn config(self) -> SensorConfig {
        match self {
            Sensor::MerisLegacy => SensorConfig::meris_legacy(),
            Sensor::Meris => SensorConfig::meris(),
            Sensor::MerisOldCoeffs => SensorConfig::meris_old_coeffs(),
            Sensor::Modis => SensorConfig::modis(),
            Sensor::SeaWiFS => SensorConfig::seawifs(),
        }
    }
}

impl std::str::FromStr for Sensor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "meris_legacy" => Ok(Sensor::MerisLegacy),
            "meris" => Ok(Sensor::Meris),
            "meris_old_coeffs" => Ok(Sensor::MerisOldCoeffs),
            "modis" => Ok(Sensor::Modis),
            "seawifs" => Ok(Sensor::SeaWiFS),
            other => Err(format!("unknown sensor: {other}")),
        }
    }
}

impl Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::MerisLegacy => write!(f, "meris_legacy"),
            Sensor::Meris => write!(f, "meris"),
            Sensor::MerisOldCoeffs => write!(f, "meris_old_coeffs"),
            Sensor::Modis => write!(f, "modis"),
            Sensor::SeaWiFS => write!(f, "seawifs"),
        }
    }
}
