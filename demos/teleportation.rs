//! Teleports a random single-qubit state with a layered circuit and checks the
//! result, first by sampling with a seeded simulator and then by expanding
//! every measurement branch.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{PI, TAU};

use zxcgp::{
    CircuitBuilder, EdgePointer, LayeredCircuit, QuantumState, Simulator, ZxError, connection_matrix,
    controlled, enumerate_branches, fidelity, green, hadamard_gate, red, wire,
};

/// Teleports qubit 0 onto qubit 2, using qubit 1 as Alice's half of the pair.
fn teleportation_circuit() -> Result<LayeredCircuit, ZxError> {
    let cnot = controlled(1, &red(1, 1, PI)?);
    let cz = controlled(1, &green(1, 1, PI)?);
    let a = EdgePointer::new(0, 0, 0);
    let b = EdgePointer::new(0, 1, 0);
    let swap = connection_matrix(&[a, b], &[b, a])?;

    Ok(CircuitBuilder::new()
        // Bell pair on qubits 1 and 2
        .operators([wire(), hadamard_gate(), wire()])
        .operators([wire(), cnot.clone()])
        // Bell basis rotation on the message and Alice's qubit
        .operators([cnot.clone(), wire()])
        .operators([hadamard_gate(), wire(), wire()])
        .measure(vec![0, 1])
        // X correction from qubit 1, Z correction from qubit 0
        .operators([wire(), cnot])
        .operators([swap.clone(), wire()])
        .operators([wire(), cz])
        .operators([swap, wire()])
        .build_compiled())
}

fn random_qubit<R: Rng>(rng: &mut R) -> QuantumState {
    let theta = rng.random_range(0.0..PI);
    let phi = rng.random_range(0.0..TAU);
    QuantumState::new(vec![
        Complex64::new((theta / 2.0).cos(), 0.0),
        Complex64::from_polar((theta / 2.0).sin(), phi),
    ])
}

/// Best fidelity of `out` against `|m0 m1> ⊗ message` over the four outcomes.
fn teleported_fidelity(out: &QuantumState, message: &QuantumState) -> Result<f64, ZxError> {
    let mut best: f64 = 0.0;
    for bits in 0..4 {
        best = best.max(fidelity(out, &QuantumState::basis(2, bits).tensor(message))?);
    }
    Ok(best)
}

fn main() -> Result<(), ZxError> {
    println!("--- zxcgp Example: Quantum Teleportation ---");

    let circuit = teleportation_circuit()?;
    println!("\nCircuit Definition:\n{}", circuit);

    let mut rng = StdRng::seed_from_u64(2024);
    let mut simulator = Simulator::seeded(7);
    let trials = 1000;
    let mut worst: f64 = 1.0;

    for _ in 0..trials {
        let message = random_qubit(&mut rng);
        let input = message.tensor(&QuantumState::zero(2));
        let out = simulator.run(&circuit, &input)?;
        worst = worst.min(teleported_fidelity(&out, &message)?);
    }
    println!("Worst fidelity over {} sampled runs: {:.9}", trials, worst);

    let message = random_qubit(&mut rng);
    let result = enumerate_branches(&circuit, &message.tensor(&QuantumState::zero(2)))?;
    println!("\nMessage: {}", message);
    println!("{}", result);
    for branch in result.branches() {
        println!(
            "  outcomes {:?}: fidelity {:.9}",
            branch.outcomes(),
            teleported_fidelity(branch.state(), &message)?
        );
    }
    println!("Total branch probability: {:.9}", result.total_probability());
    Ok(())
}
