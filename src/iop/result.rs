use bitflags::bitflags;
use std::fmt::Display;

use crate::iop::constants::{
    NO_DATA_VALUE, NUM_A_PIG_BANDS, NUM_A_TOTAL_BANDS, NUM_A_YS_BANDS, NUM_BB_SPM_BANDS,
    NUM_IOP_BANDS,
};

bitflags! {
    /// Per-pixel retrieval status, written to the `analytical_flags` band.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IopFlags: u8 {
        /// Kernel ran to completion
        const VALID = 1 << 0;
        /// An intermediate value would have been imaginary
        const IMAGINARY = 1 << 1;
        /// At least one a_ys band was negative before the bound check
        const NEGATIVE_AYS = 1 << 2;
        /// Not a water pixel, kernel not run
        const INVALID = 1 << 3;
        const A_TOTAL_OOB = 1 << 4;
        const BB_SPM_OOB = 1 << 5;
        const A_PIG_OOB = 1 << 6;
        const A_YS_OOB = 1 << 7;
    }
}

impl IopFlags {
    /// Flag name and description, in bit order
    pub const CODING: [(IopFlags, &'static str, &'static str); 8] = [
        (IopFlags::VALID, "normal", "A valid water pixel."),
        (
            IopFlags::IMAGINARY,
            "Imaginary_number",
            "Classified as water, but an imaginary number would have been produced.",
        ),
        (
            IopFlags::NEGATIVE_AYS,
            "Negative_Adg",
            "Classified as water, but one or more of the bands contain a negative Adg value.",
        ),
        (
            IopFlags::INVALID,
            "non_water",
            "Not classified as a water pixel (land/cloud).",
        ),
        (
            IopFlags::A_TOTAL_OOB,
            "a_total_oob",
            "Total absorption out of bounds in one or more bands.",
        ),
        (
            IopFlags::BB_SPM_OOB,
            "bb_spm_oob",
            "Particulate backscatter out of bounds in one or more bands.",
        ),
        (
            IopFlags::A_PIG_OOB,
            "a_pig_oob",
            "Pigment absorption out of bounds in one or more bands.",
        ),
        (
            IopFlags::A_YS_OOB,
            "a_ys_oob",
            "Yellow substance absorption out of bounds in one or more bands.",
        ),
    ];

    /// Names of the set flags, in bit order
    pub fn names(&self) -> Vec<&'static str> {
        Self::CODING
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, name, _)| *name)
            .collect()
    }
}

/// Fixed-shape output of one pixel.
///
/// One instance is meant to live per worker and be recycled across pixels:
/// every `process` call resets it in place before writing.
#[derive(Debug, Clone, PartialEq)]
pub struct IopResult {
    a_total: [f32; NUM_A_TOTAL_BANDS],
    bb_spm: [f32; NUM_BB_SPM_BANDS],
    a_pig: [f32; NUM_A_PIG_BANDS],
    a_ys: [f32; NUM_A_YS_BANDS],
    flags: IopFlags,
}

impl IopResult {
    pub fn new() -> Self {
        Self {
            a_total: [0.0; NUM_A_TOTAL_BANDS],
            bb_spm: [0.0; NUM_BB_SPM_BANDS],
            a_pig: [0.0; NUM_A_PIG_BANDS],
            a_ys: [0.0; NUM_A_YS_BANDS],
            flags: IopFlags::VALID,
        }
    }

    /// Back to the freshly constructed state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Non-water pixel: every value is no-data, only the invalid flag is set
    pub fn invalidate(&mut self) {
        self.fill_no_data();
        self.flags = IopFlags::INVALID;
    }

    /// Kernel failure: every value is no-data, only the imaginary flag is set
    pub fn invalidate_imaginary(&mut self) {
        self.fill_no_data();
        self.flags = IopFlags::IMAGINARY;
    }

    fn fill_no_data(&mut self) {
        self.a_total.fill(NO_DATA_VALUE);
        self.bb_spm.fill(NO_DATA_VALUE);
        self.a_pig.fill(NO_DATA_VALUE);
        self.a_ys.fill(NO_DATA_VALUE);
    }

    pub fn a_total(&self) -> &[f32; NUM_A_TOTAL_BANDS] {
        &self.a_total
    }

    pub fn bb_spm(&self) -> &[f32; NUM_BB_SPM_BANDS] {
        &self.bb_spm
    }

    pub fn a_pig(&self) -> &[f32; NUM_A_PIG_BANDS] {
        &self.a_pig
    }

    pub fn a_ys(&self) -> &[f32; NUM_A_YS_BANDS] {
        &self.a_ys
    }

    pub fn set_a_total(&mut self, value: f32, band: usize) {
        self.a_total[band] = value;
    }

    pub fn set_bb_spm(&mut self, value: f32, band: usize) {
        self.bb_spm[band] = value;
    }

    pub fn set_a_pig(&mut self, value: f32, band: usize) {
        self.a_pig[band] = value;
    }

    pub fn set_a_ys(&mut self, value: f32, band: usize) {
        self.a_ys[band] = value;
    }

    pub fn flags(&self) -> IopFlags {
        self.flags
    }

    /// Raw flag word for the output band
    pub fn flag_bits(&self) -> u8 {
        self.flags.bits()
    }

    pub fn set_flag(&mut self, flag: IopFlags, on: bool) {
        self.flags.set(flag, on);
    }

    pub fn is_valid(&self) -> bool {
        self.flags.contains(IopFlags::VALID)
    }

    /// Copy every value out in band order: a_total, bb_spm, a_pig, a_ys
    pub fn write_to(&self, out: &mut [f32; NUM_IOP_BANDS]) {
        let (a_total, rest) = out.split_at_mut(NUM_A_TOTAL_BANDS);
        let (bb_spm, rest) = rest.split_at_mut(NUM_BB_SPM_BANDS);
        let (a_pig, a_ys) = rest.split_at_mut(NUM_A_PIG_BANDS);
        a_total.copy_from_slice(&self.a_total);
        bb_spm.copy_from_slice(&self.bb_spm);
        a_pig.copy_from_slice(&self.a_pig);
        a_ys.copy_from_slice(&self.a_ys);
    }
}

impl Default for IopResult {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for IopResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "a_total: {:?}", self.a_total)?;
        writeln!(f, "bb_spm:  {:?}", self.bb_spm)?;
        writeln!(f, "a_pig:   {:?}", self.a_pig)?;
        writeln!(f, "a_ys:    {:?}", self.a_ys)?;
        write!(
            f,
            "flags:   {} [{}]",
            self.flags.bits(),
            self.flags.names().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_no_data(result: &IopResult) {
        assert!(result.a_total().iter().all(|v| v.is_nan()));
        assert!(result.bb_spm().iter().all(|v| v.is_nan()));
        assert!(result.a_pig().iter().all(|v| v.is_nan()));
        assert!(result.a_ys().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_construction() {
        let result = IopResult::new();
        assert_eq!(result.a_total().len(), NUM_A_TOTAL_BANDS);
        assert_eq!(result.bb_spm().len(), NUM_BB_SPM_BANDS);
        assert_eq!(result.a_pig().len(), NUM_A_PIG_BANDS);
        assert_eq!(result.a_ys().len(), NUM_A_YS_BANDS);
        assert_eq!(result.flag_bits(), 1);
    }

    #[test]
    fn test_reset_matches_fresh() {
        let mut result = IopResult::new();
        result.set_a_total(0.45, 3);
        result.set_bb_spm(0.42, 4);
        result.set_a_pig(0.11, 0);
        result.set_a_ys(0.008, 1);
        result.set_flag(IopFlags::A_YS_OOB | IopFlags::NEGATIVE_AYS, true);

        result.reset();
        assert_eq!(result, IopResult::new());

        result.invalidate();
        result.reset();
        assert_eq!(result, IopResult::new());
    }

    #[test]
    fn test_invalidate() {
        let mut result = IopResult::new();
        result.set_flag(IopFlags::A_TOTAL_OOB, true);
        result.invalidate();
        assert_all_no_data(&result);
        assert_eq!(result.flags(), IopFlags::INVALID);
        assert_eq!(result.flag_bits(), 8);
    }

    #[test]
    fn test_invalidate_imaginary() {
        let mut result = IopResult::new();
        result.invalidate_imaginary();
        assert_all_no_data(&result);
        assert_eq!(result.flag_bits(), 2);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_flag_bit_layout() {
        let cases = [
            (IopFlags::VALID, 1),
            (IopFlags::IMAGINARY, 2),
            (IopFlags::NEGATIVE_AYS, 4),
            (IopFlags::INVALID, 8),
            (IopFlags::A_TOTAL_OOB, 16),
            (IopFlags::BB_SPM_OOB, 32),
            (IopFlags::A_PIG_OOB, 64),
            (IopFlags::A_YS_OOB, 128),
        ];
        for (flag, bits) in cases {
            let mut result = IopResult::new();
            result.set_flag(IopFlags::VALID, false);
            result.set_flag(flag, true);
            assert_eq!(result.flag_bits(), bits);
            result.set_flag(flag, false);
            assert_eq!(result.flag_bits(), 0);
        }
    }

    #[test]
    fn test_flag_names() {
        let flags = IopFlags::VALID | IopFlags::A_PIG_OOB;
        assert_eq!(flags.names(), vec!["normal", "a_pig_oob"]);
    }

    #[test]
    fn test_write_to_band_order() {
        let mut result = IopResult::new();
        result.set_a_total(1.0, 0);
        result.set_bb_spm(2.0, 0);
        result.set_a_pig(3.0, 0);
        result.set_a_ys(4.0, 2);

        let mut out = [0.0; NUM_IOP_BANDS];
        result.write_to(&mut out);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[5], 2.0);
        assert_eq!(out[10], 3.0);
        assert_eq!(out[15], 4.0);
    }
}
