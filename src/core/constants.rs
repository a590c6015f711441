//! Numeric constants shared by the simulator and the graph.

/// Constants used across the crate
pub mod zx_constants {
    /// Full turn; spider phases live in `[0, TAU)`.
    pub const TAU: f64 = std::f64::consts::TAU;
    /// Entry of the normalised Hadamard matrix.
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
    /// Default tolerance for normalization checks and matrix comparisons.
    pub const DEFAULT_TOLERANCE: f64 = 1e-9;
    /// State errors at or below this value are rounding noise and count as zero.
    pub const ERROR_FLOOR: f64 = 1e-9;
    /// Upper bound on draws for a single mutation before it is skipped.
    pub const MAX_MUTATION_ATTEMPTS: usize = 1_000;
}
