//! Per-pixel drivers around the QAA kernel.
//!
//! [`QaaAlgorithm`] is the flagging orchestrator used for product generation:
//! optional division by π, kernel run, recomposition of the reported
//! quantities, and per-class bound checks. [`ConfAlgorithm`] runs the same
//! kernel for an arbitrary sensor and reports raw values without any checks.

use std::f64::consts::PI;

use crate::iop::constants::{
    MAX_BANDS, NO_DATA_VALUE, NUM_A_PIG_BANDS, NUM_A_TOTAL_BANDS, NUM_A_YS_BANDS, NUM_BB_SPM_BANDS,
};
use crate::iop::error::QaaError;
use crate::iop::qaa::{Decomposition, Forward, Qaa};
use crate::iop::qaa_config::{Bounds, QaaConfig};
use crate::iop::result::{IopFlags, IopResult};
use crate::iop::sensor::SensorConfig;

/// Widen a reflectance spectrum to f64, optionally dividing by π.
fn widen(reflectance: &[f32], divide_by_pi: bool) -> ([f64; MAX_BANDS], usize) {
    let mut rrs = [0.0; MAX_BANDS];
    let len = reflectance.len().min(MAX_BANDS);
    for (dst, &src) in rrs.iter_mut().zip(&reflectance[..len]) {
        *dst = if divide_by_pi {
            src as f64 / PI
        } else {
            src as f64
        };
    }
    (rrs, len)
}

#[derive(Debug, Clone, Default)]
pub struct QaaAlgorithm {
    qaa: Qaa,
    config: QaaConfig,
}

impl QaaAlgorithm {
    pub fn new(sensor: SensorConfig, config: QaaConfig) -> Self {
        Self {
            qaa: Qaa::new(sensor),
            config,
        }
    }

    pub fn config(&self) -> &QaaConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: QaaConfig) {
        self.config = config;
    }

    pub fn sensor(&self) -> &SensorConfig {
        self.qaa.sensor()
    }

    /// Run the retrieval on one pixel, writing into the recycled `result`.
    ///
    /// `reflectance` holds one value per band in the sensor's order, e.g. for
    /// the legacy MERIS preset: 412, 443, 490, 510, 560, 620, 665 nm.
    ///
    /// On `Err` the result is already invalidated: every value is no-data and
    /// only [`IopFlags::IMAGINARY`] is set. Bound violations are not errors,
    /// they are flagged on the result.
    pub fn process(&self, reflectance: &[f32], result: &mut IopResult) -> Result<(), QaaError> {
        result.reset();

        let (rrs, len) = widen(reflectance, self.config.divide_by_pi);
        let (forward, decomp) = match self.qaa.retrieve(&rrs[..len]) {
            Ok(retrieval) => retrieval,
            Err(err) => {
                result.invalidate_imaginary();
                return Err(err);
            }
        };

        // Valid from here on, whatever the bound checks say
        result.set_flag(IopFlags::VALID, true);

        self.compute_a_total(&decomp, result);
        self.compute_bb_spm(&forward, result);
        self.compute_a_pig(&decomp, result);
        self.compute_a_ys(&decomp, result);

        Ok(())
    }

    fn compute_a_total(&self, decomp: &Decomposition, result: &mut IopResult) {
        let aw = self.sensor().aw();
        let mut oob = false;
        for i in 0..NUM_A_TOTAL_BANDS {
            let a = (aw[i] + decomp.aph[i] + decomp.adg[i]) as f32;
            result.set_a_total(check_bounds(a, &self.config.a_total, &mut oob), i);
        }
        if oob {
            result.set_flag(IopFlags::A_TOTAL_OOB, true);
        }
    }

    fn compute_bb_spm(&self, forward: &Forward, result: &mut IopResult) {
        let bbw = self.sensor().bbw();
        let mut oob = false;
        for i in 0..NUM_BB_SPM_BANDS {
            let bb = (bbw[i] + forward.bbp[i]) as f32;
            result.set_bb_spm(check_bounds(bb, &self.config.bb_spm, &mut oob), i);
        }
        if oob {
            result.set_flag(IopFlags::BB_SPM_OOB, true);
        }
    }

    fn compute_a_pig(&self, decomp: &Decomposition, result: &mut IopResult) {
        let mut oob = false;
        for i in 0..NUM_A_PIG_BANDS {
            let aph = decomp.aph[i] as f32;
            result.set_a_pig(check_bounds(aph, &self.config.a_pig, &mut oob), i);
        }
        if oob {
            result.set_flag(IopFlags::A_PIG_OOB, true);
        }
    }

    fn compute_a_ys(&self, decomp: &Decomposition, result: &mut IopResult) {
        let mut oob = false;
        let mut negative = false;
        for i in 0..NUM_A_YS_BANDS {
            let adg = decomp.adg[i] as f32;
            negative |= adg < 0.0;
            result.set_a_ys(check_bounds(adg, &self.config.a_ys, &mut oob), i);
        }
        if oob {
            result.set_flag(IopFlags::A_YS_OOB, true);
        }
        if negative {
            result.set_flag(IopFlags::NEGATIVE_AYS, true);
        }
    }
}

// Out-of-bounds values are nulled, never clamped
fn check_bounds(value: f32, bounds: &Bounds, oob: &mut bool) -> f32 {
    if bounds.is_out_of_bounds(value) {
        *oob = true;
        NO_DATA_VALUE
    } else {
        value
    }
}

/// Raw QAA retrieval for any sensor, without π scaling, bounds or flags.
#[derive(Debug, Clone)]
pub struct ConfAlgorithm {
    qaa: Qaa,
}

impl ConfAlgorithm {
    pub fn new(sensor: SensorConfig) -> Self {
        Self {
            qaa: Qaa::new(sensor),
        }
    }

    pub fn sensor(&self) -> &SensorConfig {
        self.qaa.sensor()
    }

    /// Writes a, bb (= bbp + bbw), aph and adg straight into `result`.
    ///
    /// On `Err` the result is invalidated the same way [`QaaAlgorithm::process`] does.
    pub fn process(&self, reflectance: &[f32], result: &mut IopResult) -> Result<(), QaaError> {
        result.reset();

        let (rrs, len) = widen(reflectance, false);
        let (forward, decomp) = match self.qaa.retrieve(&rrs[..len]) {
            Ok(retrieval) => retrieval,
            Err(err) => {
                result.invalidate_imaginary();
                return Err(err);
            }
        };

        let bbw = self.sensor().bbw();
        for i in 0..NUM_A_TOTAL_BANDS {
            result.set_a_total(forward.a[i] as f32, i);
        }
        for i in 0..NUM_BB_SPM_BANDS {
            result.set_bb_spm((forward.bbp[i] + bbw[i]) as f32, i);
        }
        for i in 0..NUM_A_PIG_BANDS {
            result.set_a_pig(decomp.aph[i] as f32, i);
        }
        for i in 0..NUM_A_YS_BANDS {
            result.set_a_ys(decomp.adg[i] as f32, i);
        }

        Ok(())
    }
}
