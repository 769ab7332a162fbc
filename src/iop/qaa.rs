//! Quasi-Analytical Algorithm (QAA v5) kernel
//!
//! Closed-form inversion of one remote sensing reflectance spectrum into
//! absorption and backscattering coefficients, parametrized by a
//! [`SensorConfig`] so the same steps serve MERIS, MODIS and SeaWiFS band sets.
//!
//! ## Algorithm Overview
//!
//! 1. **Step 0**: Repair the red band if it leaves the empirical envelope, then
//!    convert above-surface Rrs to below-surface rrs
//! 2. **Step 1**: Solve the u = bb/(a+bb) quadratic per band
//! 3. **Step 2**: Absorption at the reference band from a band-ratio regression
//! 4. **Step 3**: Particulate backscatter at the reference band
//! 5. **Step 4**: Spectral slope Y of particulate backscatter
//! 6. **Step 5-6**: Extrapolate bbp to every band and derive total absorption
//! 7. **Step 7-10**: Decompose absorption into phytoplankton and CDM parts
//!
//! Steps 0-6 live in [`Qaa::qaaf_v5`] and are the only ones that can fail.
//! Steps 7-10 live in [`Qaa::qaaf_decomp`].
//!
//! ## References
//!
//! - Lee, Z., Carder, K. L., & Arnone, R. A. (2002). Deriving inherent optical properties
//!   from water color: a multiband quasi-analytical algorithm for optically deep waters.
//!   *Applied Optics*, 41(27), 5755-5772.
//! - Lee, Z., Lubac, B., Werdell, J., & Arnone, R. (2009). An update of the
//!   quasi-analytical algorithm (QAA_v5). IOCCG software report.

use std::ops::{Deref, DerefMut};

use crate::iop::constants::MAX_BANDS;
use crate::iop::error::QaaError;
use crate::iop::sensor::SensorConfig;

/// Fixed-capacity per-band values, kept on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    values: [f64; MAX_BANDS],
    len: usize,
}

impl Bands {
    pub fn zeroed(len: usize) -> Self {
        assert!(len <= MAX_BANDS, "at most {MAX_BANDS} bands, got {len}");
        Self {
            values: [0.0; MAX_BANDS],
            len,
        }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        let mut bands = Self::zeroed(values.len());
        bands.values[..values.len()].copy_from_slice(values);
        bands
    }
}

impl Deref for Bands {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

impl DerefMut for Bands {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.values[..self.len]
    }
}

/// Output of steps 0-6
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forward {
    pub rrs: Bands, // Below-water reflectance, every input band [sr^-1]
    pub u: Bands,   // bb/(a+bb) [dimensionless]
    pub a: Bands,   // Total absorption [m^-1]
    pub bbp: Bands, // Particulate backscattering [m^-1]
    pub y: f64,     // Spectral slope of bbp
}

/// Output of steps 7-10
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub aph: Bands, // Phytoplankton absorption [m^-1]
    pub adg: Bands, // Dissolved + detrital absorption [m^-1]
    pub s: f64,     // Spectral slope of adg
}

#[derive(Debug, Clone, PartialEq)]
pub struct Qaa {
    sensor: SensorConfig,
}

impl Qaa {
    pub fn new(sensor: SensorConfig) -> Self {
        Self { sensor }
    }

    pub fn sensor(&self) -> &SensorConfig {
        &self.sensor
    }

    /// Steps 0-6: per-band absorption and particulate backscatter.
    ///
    /// `reflectance` is above-surface Rrs in the sensor's band order. Values past
    /// [`SensorConfig::input_bands`] are ignored.
    ///
    /// # Panics
    ///
    /// If fewer than [`SensorConfig::input_bands`] values are supplied.
    pub fn qaaf_v5(&self, reflectance: &[f64]) -> Result<Forward, QaaError> {
        let sensor = &self.sensor;
        let idx = sensor.indices();
        let n = sensor.num_bands();
        let inputs = sensor.input_bands();
        assert!(
            reflectance.len() >= inputs,
            "{} needs {} reflectance bands, got {}",
            sensor.name(),
            inputs,
            reflectance.len()
        );

        let aw = sensor.aw();
        let bbw = sensor.bbw();
        let wavelengths = sensor.wavelengths();
        let g0 = sensor.g0();
        let g1 = sensor.g1();

        // Step 0.1: reassign the red band when it is missing or outside the envelope
        let mut above = Bands::from_slice(&reflectance[..inputs]);
        let green = above[idx.green];
        let upper = 20.0 * green.powf(1.5);
        let lower = 0.9 * green.powf(1.7);
        if !(lower..=upper).contains(&above[idx.red]) {
            above[idx.red] = 1.27 * green.powf(1.47)
                + 0.00018 * (above[idx.cyan] / green).powf(sensor.red_ratio_exponent());
        }

        // Step 0.2: below-surface reflectance
        let mut rrs = above;
        rrs.iter_mut().for_each(|v| *v /= 0.52 + 1.7 * *v);

        // Step 1: u per band
        let mut u = Bands::zeroed(n);
        for b in 0..n {
            let nom = g0 * g0 + 4.0 * g1 * rrs[b];
            if nom.is_nan() || nom < 0.0 {
                return Err(QaaError::ImaginaryNumber { value: nom });
            }
            u[b] = (nom.sqrt() - g0) / (2.0 * g1);
        }

        // Step 2: absorption at the reference band
        let numer = rrs[idx.blue] + rrs[idx.cyan];
        let denom = rrs[idx.green] + 5.0 * rrs[idx.red] * (rrs[idx.red] / rrs[idx.cyan]);
        let quot = numer / denom;
        if quot.is_nan() || quot <= 0.0 {
            return Err(QaaError::ImaginaryNumber { value: quot });
        }
        let x = quot.log10();
        let [c0, c1, c2] = sensor.a_coeffs();
        let rho = c0 + c1 * x + c2 * x * x;
        let a_ref = aw[idx.green] + 10.0_f64.powf(rho);

        // Step 3: particulate backscatter at the reference band
        let u_ref = u[idx.green];
        let bbp_ref = u_ref * a_ref / (1.0 - u_ref) - bbw[idx.green];

        // Step 4
        let ratio = rrs[idx.blue] / rrs[idx.green];
        if !ratio.is_finite() {
            return Err(QaaError::ImaginaryNumber { value: ratio });
        }
        let y = 2.0 * (1.0 - 1.2 * (-0.9 * ratio).exp());

        // Step 5 & 6
        let reference_wl = sensor.reference_wavelength();
        let mut bbp = Bands::zeroed(n);
        let mut a = Bands::zeroed(n);
        for b in 0..n {
            bbp[b] = bbp_ref * (reference_wl / wavelengths[b]).powf(y);
            a[b] = (1.0 - u[b]) * (bbw[b] + bbp[b]) / u[b];
        }

        Ok(Forward { rrs, u, a, bbp, y })
    }

    /// Steps 7-10: split total absorption into phytoplankton and CDM parts.
    pub fn qaaf_decomp(&self, forward: &Forward) -> Decomposition {
        let sensor = &self.sensor;
        let idx = sensor.indices();
        let aw = sensor.aw();
        let wavelengths = sensor.wavelengths();
        let rrs = &forward.rrs;
        let a = &forward.a;

        // Step 7: aph(410)/aph(440)
        let ratio = rrs[idx.blue] / rrs[idx.green];
        let symbol = 0.74 + 0.2 / (0.8 + ratio);

        // Step 8: adg(410)/adg(440)
        let s = 0.015 + 0.002 / (0.6 + ratio);
        let spacing = wavelengths[idx.blue] - wavelengths[idx.violet];
        let zeta = (s * spacing).exp();

        // Step 9 & 10
        let denom = zeta - symbol;
        let dif1 = a[idx.violet] - symbol * a[idx.blue];
        let dif2 = aw[idx.violet] - symbol * aw[idx.blue];
        let ag440 = (dif1 - dif2) / denom;

        let n = sensor.num_bands();
        let mut adg = Bands::zeroed(n);
        let mut aph = Bands::zeroed(n);
        for b in 0..n {
            adg[b] = ag440 * (-s * (wavelengths[b] - wavelengths[idx.blue])).exp();
            aph[b] = a[b] - adg[b] - aw[b];
        }

        Decomposition { aph, adg, s }
    }

    /// Both phases, decomposition only on a successful forward step.
    pub fn retrieve(&self, reflectance: &[f64]) -> Result<(Forward, Decomposition), QaaError> {
        let forward = self.qaaf_v5(reflectance)?;
        let decomposition = self.qaaf_decomp(&forward);
        Ok((forward, decomposition))
    }
}

impl Default for Qaa {
    fn default() -> Self {
        Self::new(SensorConfig::default())
    }
}
