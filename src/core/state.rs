// src/core/state.rs

use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::Rng;
use std::fmt;
use std::ops::Sub;

use super::error::ZxError;
use super::matrix::ComplexMatrix;

/// A pure state over a fixed number of qubits.
///
/// Stored as a single-column `ComplexMatrix` of length `2^qubits`. Qubit 0 is
/// the most significant bit of a basis index, so `|100>` is index 4.
///
/// States are not required to be normalised. ZX circuits may be trace
/// reducing (destructors, projections), and the reduced mass is information
/// a caller may want to keep, so nothing here renormalises implicitly except
/// the measurement collapse.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    amplitudes: ComplexMatrix,
}

impl QuantumState {
    /// Creates a state from raw amplitudes.
    ///
    /// # Panics
    /// Panics if `amplitudes` is empty.
    pub fn new(amplitudes: Vec<Complex64>) -> Self {
        Self { amplitudes: ComplexMatrix::column_vector(amplitudes) }
    }

    /// Wraps a single-column matrix.
    pub fn from_matrix(matrix: ComplexMatrix) -> Result<Self, ZxError> {
        if matrix.width() != 1 {
            return Err(ZxError::DimensionMismatch {
                message: format!("a state must be a single column, got a {}x{} matrix", matrix.height(), matrix.width()),
            });
        }
        Ok(Self { amplitudes: matrix })
    }

    /// The computational basis state `|index>` over `qubits` qubits.
    pub fn basis(qubits: usize, index: usize) -> Self {
        let dim = 1usize << qubits;
        assert!(index < dim, "basis index {} out of range for {} qubits", index, qubits);
        let mut amplitudes = vec![Complex64::zero(); dim];
        amplitudes[index] = Complex64::one();
        Self::new(amplitudes)
    }

    /// `|0...0>` over `qubits` qubits.
    pub fn zero(qubits: usize) -> Self {
        Self::basis(qubits, 0)
    }

    /// Amplitudes in basis order.
    pub fn amplitudes(&self) -> &[Complex64] {
        self.amplitudes.entries()
    }

    /// The underlying column matrix.
    pub fn matrix(&self) -> &ComplexMatrix {
        &self.amplitudes
    }

    /// Number of amplitudes.
    pub fn dim(&self) -> usize {
        self.amplitudes.height()
    }

    /// `log2(dim)`, rounded down.
    pub fn num_qubits(&self) -> usize {
        self.dim().ilog2() as usize
    }

    /// `self ⊗ other`; `self` takes the leading qubits.
    pub fn tensor(&self, other: &QuantumState) -> QuantumState {
        Self { amplitudes: self.amplitudes.tensor(&other.amplitudes) }
    }

    /// Returns `op · self`.
    ///
    /// # Panics
    /// Panics unless `op.width() == self.dim()`.
    pub fn apply_operator(&self, op: &ComplexMatrix) -> QuantumState {
        Self { amplitudes: op.multiply(&self.amplitudes) }
    }

    /// Normalises with the complex square sum (see `ComplexMatrix::normalize`).
    pub fn normalize(&self) -> QuantumState {
        Self { amplitudes: self.amplitudes.normalize() }
    }

    /// `|sqrt(Σ z²)|` of the amplitudes.
    pub fn magnitude(&self) -> f64 {
        self.amplitudes.magnitude()
    }

    /// `Σ |z|²`, the total probability carried by the state.
    pub fn probability_mass(&self) -> f64 {
        self.amplitudes().iter().map(|z| z.norm_sqr()).sum()
    }

    /// Amplitude-wise difference.
    pub fn subtract(&self, other: &QuantumState) -> QuantumState {
        Self { amplitudes: self.amplitudes.subtract(&other.amplitudes) }
    }

    fn check_qubit(&self, qubit: usize) -> Result<usize, ZxError> {
        let num_qubits = self.num_qubits();
        if qubit >= num_qubits {
            return Err(ZxError::InvalidQubit { qubit, num_qubits });
        }
        Ok(num_qubits - 1 - qubit)
    }

    /// Probability mass of the `|0>` and `|1>` branches of `qubit`.
    fn branch_masses(&self, bit: usize) -> (f64, f64) {
        self.amplitudes().iter().enumerate().fold((0.0, 0.0), |(zero, one), (k, z)| {
            if (k >> bit) & 1 == 0 {
                (zero + z.norm_sqr(), one)
            } else {
                (zero, one + z.norm_sqr())
            }
        })
    }

    /// Keeps the amplitudes where `qubit` equals `value`, divided by `sqrt(mass)`.
    fn collapse(&self, bit: usize, value: bool, mass: f64) -> QuantumState {
        let wanted = usize::from(value);
        let root = mass.sqrt();
        let amplitudes = self
            .amplitudes()
            .iter()
            .enumerate()
            .map(|(k, z)| {
                if (k >> bit) & 1 == wanted && root > 0.0 {
                    *z / root
                } else {
                    Complex64::zero()
                }
            })
            .collect();
        QuantumState::new(amplitudes)
    }

    /// Measures `qubit` in the computational basis.
    ///
    /// Draws one uniform sample against the total probability mass, keeps the
    /// chosen branch and divides it by the square root of that branch's mass.
    /// The result is only unit-normalised when the input was.
    pub fn measure_qubit<R: Rng + ?Sized>(&self, qubit: usize, rng: &mut R) -> Result<QuantumState, ZxError> {
        let bit = self.check_qubit(qubit)?;
        let (zero_mass, one_mass) = self.branch_masses(bit);
        let sample = rng.random::<f64>() * (zero_mass + one_mass);
        if sample < zero_mass {
            Ok(self.collapse(bit, false, zero_mass))
        } else {
            Ok(self.collapse(bit, true, one_mass))
        }
    }

    /// Collapses `qubit` onto `value` without drawing randomness.
    ///
    /// Returns the collapsed state and the probability mass of the branch.
    /// An empty branch yields the zero state with probability 0.
    pub fn measure_qubit_to_value(&self, qubit: usize, value: bool) -> Result<(QuantumState, f64), ZxError> {
        let bit = self.check_qubit(qubit)?;
        let (zero_mass, one_mass) = self.branch_masses(bit);
        let mass = if value { one_mass } else { zero_mass };
        Ok((self.collapse(bit, value, mass), mass))
    }
}

impl Sub for &QuantumState {
    type Output = QuantumState;

    fn sub(self, other: &QuantumState) -> QuantumState {
        self.subtract(other)
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes().iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_basis_and_num_qubits() {
        let s = QuantumState::basis(3, 4);
        assert_eq!(s.dim(), 8);
        assert_eq!(s.num_qubits(), 3);
        assert_eq!(s.amplitudes()[4], c(1.0));
    }

    #[test]
    fn test_hadamard_on_first_qubit() {
        let h = ComplexMatrix::from_rows(vec![
            vec![c(FRAC_1_SQRT_2), c(FRAC_1_SQRT_2)],
            vec![c(FRAC_1_SQRT_2), c(-FRAC_1_SQRT_2)],
        ]);
        let op = h.tensor(&ComplexMatrix::identity(2));
        let out = QuantumState::zero(2).apply_operator(&op);
        // (|00> + |10>) / sqrt(2)
        let expected = QuantumState::new(vec![c(FRAC_1_SQRT_2), c(0.0), c(FRAC_1_SQRT_2), c(0.0)]);
        assert!(out.matrix().approx_eq(expected.matrix(), TEST_TOLERANCE));
    }

    #[test]
    fn test_measure_basis_state_is_certain() -> Result<(), ZxError> {
        let mut rng = StdRng::seed_from_u64(7);
        let s = QuantumState::basis(2, 2); // |10>
        for _ in 0..20 {
            let m0 = s.measure_qubit(0, &mut rng)?;
            assert_eq!(m0, s);
            let m1 = s.measure_qubit(1, &mut rng)?;
            assert_eq!(m1, s);
        }
        Ok(())
    }

    #[test]
    fn test_measure_rescales_by_branch_mass() -> Result<(), ZxError> {
        // Un-normalised state: mass 0.25 on |0>, 0.25 on |1>
        let s = QuantumState::new(vec![c(0.5), c(0.5)]);
        let mut rng = StdRng::seed_from_u64(11);
        let m = s.measure_qubit(0, &mut rng)?;
        assert!((m.probability_mass() - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_measure_statistics() -> Result<(), ZxError> {
        // 1/4 on |0>, 3/4 on |1>
        let s = QuantumState::new(vec![c(0.5), c(0.75f64.sqrt())]);
        let mut rng = StdRng::seed_from_u64(1234);
        let trials = 4000;
        let mut ones = 0;
        for _ in 0..trials {
            let m = s.measure_qubit(0, &mut rng)?;
            if m.amplitudes()[1].norm() > 0.5 {
                ones += 1;
            }
        }
        let ratio = ones as f64 / trials as f64;
        assert!((ratio - 0.75).abs() < 0.05, "observed ratio {}", ratio);
        Ok(())
    }

    #[test]
    fn test_measure_to_value_reports_branch_mass() -> Result<(), ZxError> {
        let s = QuantumState::new(vec![c(0.5), c(0.0), c(0.0), c(0.75f64.sqrt())]);
        let (zero, p0) = s.measure_qubit_to_value(0, false)?;
        let (one, p1) = s.measure_qubit_to_value(0, true)?;
        assert!((p0 - 0.25).abs() < TEST_TOLERANCE);
        assert!((p1 - 0.75).abs() < TEST_TOLERANCE);
        assert!((zero.amplitudes()[0].re - 1.0).abs() < TEST_TOLERANCE);
        assert!((one.amplitudes()[3].re - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_measure_to_value_partitions_mass() -> Result<(), ZxError> {
        for qubits in 1..=4usize {
            let dim = 1usize << qubits;
            let amplitudes: Vec<Complex64> =
                (0..dim).map(|k| Complex64::new((k as f64 + 1.0).sin(), (k as f64 * 0.5).cos())).collect();
            let state = QuantumState::new(amplitudes);
            let total = state.probability_mass();

            let mut branches = vec![(state, 1.0)];
            for qubit in 0..qubits {
                let mut next = Vec::new();
                for (s, p) in &branches {
                    for value in [false, true] {
                        let (collapsed, mass) = s.measure_qubit_to_value(qubit, value)?;
                        next.push((collapsed, p * mass));
                    }
                }
                branches = next;
            }
            assert_eq!(branches.len(), dim);
            let sum: f64 = branches.iter().map(|(_, p)| p).sum();
            assert!((sum - total).abs() < 1e-9, "qubits={} sum={} total={}", qubits, sum, total);
        }
        Ok(())
    }

    #[test]
    fn test_measure_empty_branch_yields_zero_state() -> Result<(), ZxError> {
        let s = QuantumState::basis(1, 0);
        let (collapsed, p) = s.measure_qubit_to_value(0, true)?;
        assert_eq!(p, 0.0);
        assert_eq!(collapsed.probability_mass(), 0.0);
        Ok(())
    }

    #[test]
    fn test_measure_out_of_range_qubit() {
        let s = QuantumState::zero(2);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(s.measure_qubit(2, &mut rng), Err(ZxError::InvalidQubit { qubit: 2, num_qubits: 2 }));
    }

    #[test]
    fn test_subtract_and_magnitude() {
        let a = QuantumState::new(vec![c(0.6), c(0.8)]);
        let b = QuantumState::new(vec![c(0.6), c(0.8)]);
        assert!((&a - &b).magnitude() < TEST_TOLERANCE);
        assert!((a.magnitude() - 1.0).abs() < TEST_TOLERANCE);
    }

    #[test]
    fn test_from_matrix_rejects_wide_matrix() {
        assert!(QuantumState::from_matrix(ComplexMatrix::identity(2)).is_err());
        assert!(QuantumState::from_matrix(ComplexMatrix::column_vector(vec![c(1.0)])).is_ok());
    }
}
