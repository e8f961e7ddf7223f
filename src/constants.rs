//! Physical and numerical constants shared by the composition layer.

/// Avogadro's number (atoms per mole).
pub const AVOGADRO: f64 = 6.02214076e23;

/// Conversion from cm² to barns; number densities are kept in atoms/(b·cm).
pub const BARNS_PER_CM2: f64 = 1.0e-24;

/// Tolerance used when checking that fractions sum to one.
pub const RELATIVE_TOLERANCE: f64 = 1.0e-9;

/// Sentinel material id. Every valid material id is strictly below it.
pub const INVALID_MATERIAL_ID: u32 = u32::MAX;
