use serde::Deserialize;

use crate::iop::constants::{
    A_PIG_LOWER_DEFAULT, A_PIG_UPPER_DEFAULT, A_TOTAL_LOWER_DEFAULT, A_TOTAL_UPPER_DEFAULT,
    A_YS_LOWER_DEFAULT, A_YS_UPPER_DEFAULT, BB_SPM_LOWER_DEFAULT, BB_SPM_UPPER_DEFAULT,
};

/// Closed validity range of one output quantity class
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub lower: f32,
    pub upper: f32,
}

impl Bounds {
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// Values on the bound itself are inside. NaN is never out of bounds.
    pub fn is_out_of_bounds(&self, value: f32) -> bool {
        value < self.lower || value > self.upper
    }

    pub fn is_ordered(&self) -> bool {
        self.lower <= self.upper
    }
}

/// Processing options of the QAA orchestrator.
///
/// Set once before a batch; shared read-only by every worker afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct QaaConfig {
    pub divide_by_pi: bool,
    pub a_total: Bounds,
    pub bb_spm: Bounds,
    pub a_pig: Bounds,
    pub a_ys: Bounds,
}

impl Default for QaaConfig {
    fn default() -> Self {
        Self {
            divide_by_pi: true,
            a_total: Bounds::new(A_TOTAL_LOWER_DEFAULT, A_TOTAL_UPPER_DEFAULT),
            bb_spm: Bounds::new(BB_SPM_LOWER_DEFAULT, BB_SPM_UPPER_DEFAULT),
            a_pig: Bounds::new(A_PIG_LOWER_DEFAULT, A_PIG_UPPER_DEFAULT),
            a_ys: Bounds::new(A_YS_LOWER_DEFAULT, A_YS_UPPER_DEFAULT),
        }
    }
}

impl QaaConfig {
    /// Name of the first bound pair whose lower end exceeds its upper end
    pub fn first_unordered(&self) -> Option<&'static str> {
        [
            ("a_total", self.a_total),
            ("bb_spm", self.bb_spm),
            ("a_pig", self.a_pig),
            ("a_ys", self.a_ys),
        ]
        .into_iter()
        .find(|(_, bounds)| !bounds.is_ordered())
        .map(|(name, _)| name)
    }
}
