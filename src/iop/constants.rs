//! Optical constants and coefficient data
//!
//! Pure-water tables, empirical QAA coefficients, and the validity-bound
//! defaults used by the per-pixel retrieval.

/// No-data value written for anything not computed or rejected by a bound check
pub const NO_DATA_VALUE: f32 = f32::NAN;

/// Upper limit on bands a sensor table may carry.
/// Kernel scratch space lives on the stack, sized by this.
pub const MAX_BANDS: usize = 16;

/// Number of bands reported for total absorption and particulate backscatter
pub const NUM_A_TOTAL_BANDS: usize = 5;
pub const NUM_BB_SPM_BANDS: usize = 5;

/// Number of bands reported for the decomposed pigment and yellow-substance absorption
pub const NUM_A_PIG_BANDS: usize = 3;
pub const NUM_A_YS_BANDS: usize = 3;

/// Total number of float output bands of one retrieval
pub const NUM_IOP_BANDS: usize =
    NUM_A_TOTAL_BANDS + NUM_BB_SPM_BANDS + NUM_A_PIG_BANDS + NUM_A_YS_BANDS;

/// Legacy MERIS band centres (nm), in input order.
/// The seventh input (665 nm) only feeds the red-band repair and the
/// reference absorption ratio, so it has no entry here.
pub const MERIS_LEGACY_WAVELENGTHS: [f64; 6] = [412.0, 443.0, 490.0, 510.0, 560.0, 620.0];

/// Pure water absorption (m^-1) at the legacy MERIS bands, from the QAA v5 IOP datafile
pub const MERIS_LEGACY_AW: [f64; 6] = [0.00469, 0.00721, 0.015, 0.0325, 0.0619, 0.2755];

/// Pure water backscattering (m^-1) at the legacy MERIS bands
pub const MERIS_LEGACY_BBW: [f64; 6] = [
    0.003328, 0.0023885, 0.001549, 0.0012992, 0.0008994, 0.0005996,
];

/// Coefficients for converting rrs to u = bb/(a+bb), as used by the C version of QAA v5
pub const G0_V5_C: f64 = 0.08945;
pub const G1_V5_C: f64 = 0.1245;

/// Coefficients for converting rrs to u, Gordon et al. (1988) as modified by Lee et al. (2002)
pub const G0_LEE: f64 = 0.089;
pub const G1_LEE: f64 = 0.125;

/// Reference-band absorption regression, original QAA v5 kernel
pub const A_COEFFS_V5_LEGACY: [f64; 3] = [-1.273, -1.163, -0.295];

/// Reference-band absorption regression, QAA v5 update (Lee et al. 2009)
/// https://oceancolor.gsfc.nasa.gov/docs/ocssw/qaa_8c_source.html
pub const A_COEFFS_V5: [f64; 3] = [-1.146, -1.366, -0.469];

/// Exponent of the 490/560 ratio term in the red-band estimate.
/// Earlier copies of the kernel used +3.19 for the same term.
pub const RED_RATIO_EXPONENT: f64 = -3.19;

/// Default validity bounds (m^-1) per output quantity class
pub const A_TOTAL_LOWER_DEFAULT: f32 = -0.02;
pub const A_TOTAL_UPPER_DEFAULT: f32 = 5.0;
pub const BB_SPM_LOWER_DEFAULT: f32 = -0.02;
pub const BB_SPM_UPPER_DEFAULT: f32 = 5.0;
pub const A_PIG_LOWER_DEFAULT: f32 = -0.02;
pub const A_PIG_UPPER_DEFAULT: f32 = 3.0;
pub const A_YS_LOWER_DEFAULT: f32 = 0.0;
pub const A_YS_UPPER_DEFAULT: f32 = 1.0;
