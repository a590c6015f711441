// tests/simulation_tests.rs

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{PI, TAU};

use zxcgp::{
    CircuitBuilder, EdgePointer, LayeredCircuit, QuantumState, Simulator, ZxError, connection_matrix, controlled,
    enumerate_branches, fidelity, green, hadamard_gate, red, validate_state, wire,
};

const TEST_TOLERANCE: f64 = 1e-9;

fn cnot() -> Result<zxcgp::ComplexMatrix, ZxError> {
    Ok(controlled(1, &red(1, 1, PI)?))
}

fn swap() -> Result<zxcgp::ComplexMatrix, ZxError> {
    let a = EdgePointer::new(0, 0, 0);
    let b = EdgePointer::new(0, 1, 0);
    connection_matrix(&[a, b], &[b, a])
}

// Message on qubit 0, Bell pair on qubits 1 and 2. Ends in |m0 m1> ⊗ message.
fn teleportation() -> Result<LayeredCircuit, ZxError> {
    Ok(CircuitBuilder::new()
        .operators([wire(), hadamard_gate(), wire()])
        .operators([wire(), cnot()?])
        .operators([cnot()?, wire()])
        .operators([hadamard_gate(), wire(), wire()])
        .measure(vec![0, 1])
        .operators([wire(), cnot()?])
        .operators([swap()?, wire()])
        .operators([wire(), controlled(1, &green(1, 1, PI)?)])
        .operators([swap()?, wire()])
        .build_compiled())
}

fn random_qubit(rng: &mut StdRng) -> QuantumState {
    let theta: f64 = rng.random_range(0.0..PI);
    let phi: f64 = rng.random_range(0.0..TAU);
    QuantumState::new(vec![
        Complex64::new((theta / 2.0).cos(), 0.0),
        Complex64::from_polar((theta / 2.0).sin(), phi),
    ])
}

fn teleported_fidelity(out: &QuantumState, message: &QuantumState) -> Result<f64, ZxError> {
    let mut best: f64 = 0.0;
    for bits in 0..4 {
        best = best.max(fidelity(out, &QuantumState::basis(2, bits).tensor(message))?);
    }
    Ok(best)
}

#[test]
fn test_teleportation_sampled() -> Result<(), ZxError> {
    let circuit = teleportation()?;
    let mut rng = StdRng::seed_from_u64(11);
    let mut sim = Simulator::seeded(12);
    for _ in 0..1000 {
        let message = random_qubit(&mut rng);
        let out = sim.run(&circuit, &message.tensor(&QuantumState::zero(2)))?;
        validate_state(&out, Some(1e-6))?;
        let f = teleported_fidelity(&out, &message)?;
        assert!(f > 0.999, "fidelity {} for message {}", f, message);
    }
    Ok(())
}

#[test]
fn test_teleportation_every_branch() -> Result<(), ZxError> {
    let circuit = teleportation()?;
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let message = random_qubit(&mut rng);
        let result = enumerate_branches(&circuit, &message.tensor(&QuantumState::zero(2)))?;
        assert_eq!(result.len(), 4);
        assert!((result.total_probability() - 1.0).abs() < TEST_TOLERANCE);
        for branch in result.branches() {
            assert!((branch.probability() - 0.25).abs() < TEST_TOLERANCE);
            assert!(teleported_fidelity(branch.state(), &message)? > 0.999);
        }
    }
    Ok(())
}

#[test]
fn test_uncompiled_and_compiled_agree_without_measurement() -> Result<(), ZxError> {
    let build = || -> Result<CircuitBuilder, ZxError> {
        Ok(CircuitBuilder::new()
            .operators([hadamard_gate(), wire()])
            .operators([cnot()?])
            .operators([wire(), red(1, 1, PI / 3.0)?]))
    };
    let plain = build()?.build();
    let compiled = build()?.build_compiled();
    let input = QuantumState::basis(2, 0b01);
    let a = plain.apply(&input)?;
    let b = compiled.apply(&input)?;
    assert!(a.matrix().approx_eq(b.matrix(), TEST_TOLERANCE));
    Ok(())
}

#[test]
fn test_ghz_statistics() -> Result<(), ZxError> {
    let circuit = CircuitBuilder::new()
        .operators([hadamard_gate(), wire(), wire()])
        .operators([cnot()?, wire()])
        .operators([wire(), cnot()?])
        .measure(vec![0, 1, 2])
        .build_compiled();
    let input = QuantumState::zero(3);

    let result = enumerate_branches(&circuit, &input)?;
    assert_eq!(result.len(), 2);
    let likely = result.most_likely().map(|b| b.probability());
    assert!(likely.is_some_and(|p| (p - 0.5).abs() < TEST_TOLERANCE));

    let shots = Simulator::seeded(3).sample(&circuit, &input, 400)?;
    let ones = shots.iter().filter(|s| s.amplitudes()[0b111].norm() > 0.5).count();
    let zeros = shots.iter().filter(|s| s.amplitudes()[0b000].norm() > 0.5).count();
    assert_eq!(ones + zeros, 400);
    assert!(ones > 120 && zeros > 120, "{} ones, {} zeros", ones, zeros);
    Ok(())
}
