// tests/graph_tests.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::f64::consts::TAU;

use zxcgp::{
    CircuitGraph, ComplexMatrix, ComplexityPolicy, EdgePointer, GraphShape, MutationConfig, MutationKind,
    MutationWeights, NodeId, QuantumState, SpiderKind, ZxError, connection_matrix, state_error, validate_edges,
};

fn n(layer: usize, index: usize) -> NodeId {
    NodeId::new(layer, index)
}

// True when `phase` is some `k · TAU / granularity`.
fn on_reset_grid(phase: f64, granularity: u32) -> bool {
    let steps = phase * f64::from(granularity) / TAU;
    (steps - steps.round()).abs() < 1e-9
}

// Copy spider on the control line feeding an XOR spider on the target line.
fn cnot_graph() -> Result<CircuitGraph, ZxError> {
    let mut graph = CircuitGraph::new(GraphShape::new(2, 2, 1, 2, 2, 2, 4))?;
    graph.connect(n(0, 0), 0, n(1, 0), 0)?;
    graph.connect(n(1, 0), 0, n(3, 0), 0)?;
    graph.connect(n(1, 0), 1, n(2, 0), 1)?;
    graph.connect(n(0, 1), 0, n(2, 0), 0)?;
    graph.connect(n(2, 0), 0, n(3, 1), 0)?;
    graph.set_kind(n(2, 0), SpiderKind::Red)?;
    Ok(graph)
}

#[test]
fn test_hand_built_cnot() -> Result<(), ZxError> {
    let mut graph = cnot_graph()?;
    validate_edges(&graph)?;
    let circuit = graph.generate_circuit()?;
    assert!(graph.nodes().all(|node| node.is_active()));
    assert_eq!(graph.count_inactive_inputs(), 0.0);

    for (input, expected) in [(0b00, 0b00), (0b01, 0b01), (0b10, 0b11), (0b11, 0b10)] {
        let out = circuit.apply(&QuantumState::basis(2, input))?;
        assert_eq!(state_error(&out, &QuantumState::basis(2, expected))?, 0.0, "input {:02b}", input);
    }
    Ok(())
}

#[test]
fn test_control_flag_changes_nothing_on_non_square_nodes() -> Result<(), ZxError> {
    let mut graph = cnot_graph()?;
    graph.set_controlled(n(1, 0), true)?;
    graph.set_controlled(n(2, 0), true)?;
    let circuit = graph.generate_circuit()?;
    let out = circuit.apply(&QuantumState::basis(2, 0b10))?;
    assert_eq!(state_error(&out, &QuantumState::basis(2, 0b11))?, 0.0);
    Ok(())
}

#[test]
fn test_random_graphs_keep_their_invariants() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(2718);
    let config = MutationConfig::default();
    let weights = MutationWeights::default();

    for round in 0..25 {
        let shape = GraphShape::new(
            rng.random_range(1..=3),
            rng.random_range(1..=3),
            rng.random_range(1..=3),
            rng.random_range(1..=3),
            rng.random_range(1..=3),
            rng.random_range(1..=3),
            4,
        );
        let mut graph = CircuitGraph::random(shape, 40, &config, &weights, &mut rng)?;
        graph.mutate(10, &config, &mut rng)?;

        validate_edges(&graph)?;
        assert!(graph.check_complexity(), "round {}: width {}", round, graph.active_edge_width());

        let circuit = graph.generate_circuit()?;
        assert_eq!(circuit.input_dim(), Some(1 << shape.inputs), "round {}", round);
        assert_eq!(circuit.output_dim(), Some(1 << shape.outputs), "round {}", round);
        assert!(circuit.is_compiled());
    }
    Ok(())
}

#[test]
fn test_accept_policy_may_exceed_bound() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(31);
    let config = MutationConfig { policy: ComplexityPolicy::Accept, ..MutationConfig::default() };
    let weights = MutationWeights { rewire: 1.0, disconnect: 0.0, function: 0.0, perturb: 0.0, reset: 0.0, control: 0.0 };
    let mut graph = CircuitGraph::random(GraphShape::new(3, 3, 3, 3, 2, 2, 1), 200, &config, &weights, &mut rng)?;
    validate_edges(&graph)?;
    // whatever the width, the circuit still has the right shape
    let circuit = graph.generate_circuit()?;
    assert_eq!(circuit.input_dim(), Some(8));
    assert_eq!(circuit.output_dim(), Some(8));
    Ok(())
}

#[test]
fn test_rewire_revert_restores_random_graph() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(99);
    let shape = GraphShape::default();
    let original =
        CircuitGraph::random(shape, 60, &MutationConfig::default(), &MutationWeights::default(), &mut rng)?;

    for _ in 0..100 {
        let mut graph = original.clone();
        let layer = rng.random_range(1..=shape.layers + 1);
        let index = rng.random_range(0..graph.layer(layer).map_or(0, |l| l.len()));
        let target = n(layer, index).slot(rng.random_range(0..graph.node(n(layer, index)).map_or(1, |x| x.arity_in())));
        let source_layer = rng.random_range(0..layer);
        let source_index = rng.random_range(0..graph.layer(source_layer).map_or(0, |l| l.len()));
        let source_node = n(source_layer, source_index);
        let source = source_node.slot(rng.random_range(0..graph.node(source_node).map_or(1, |x| x.arity_out())));

        let undo = graph.rewire(target, source);
        validate_edges(&graph)?;
        graph.revert_rewire(undo);
        assert_eq!(graph, original);
    }
    Ok(())
}

#[test]
fn test_copies_evolve_independently() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(4);
    let config = MutationConfig::default();
    let parent = CircuitGraph::random(GraphShape::default(), 30, &config, &MutationWeights::default(), &mut rng)?;
    let snapshot = parent.clone();
    let mut child = parent.copy();
    child.mutate(30, &config, &mut rng)?;
    assert_eq!(parent, snapshot);
    validate_edges(&child)
}

#[test]
fn test_connection_matrices() -> Result<(), ZxError> {
    let a = EdgePointer::new(0, 0, 0);
    let b = EdgePointer::new(0, 1, 0);
    assert_eq!(connection_matrix(&[a, b], &[a, b])?, ComplexMatrix::identity(4));
    let swap = connection_matrix(&[a, b], &[b, a])?;
    for (input, expected) in [(0b00, 0b00), (0b01, 0b10), (0b10, 0b01), (0b11, 0b11)] {
        assert_eq!(QuantumState::basis(2, input).apply_operator(&swap), QuantumState::basis(2, expected));
    }
    assert!(matches!(connection_matrix(&[a], &[b]), Err(ZxError::ConnectionMismatch { .. })));
    Ok(())
}

#[test]
fn test_uniform_scheme_always_resets_at_full_rate() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(300);
    let config = MutationConfig { phase_reset_rate: 1.0, ..MutationConfig::default() };
    let mut graph = CircuitGraph::new(GraphShape::default())?;
    let counts = graph.mutate(300, &config, &mut rng)?;

    assert_eq!(counts.get(MutationKind::PhasePerturb), 0);
    assert!(counts.get(MutationKind::PhaseReset) > 0);
    for node in graph.nodes() {
        assert!(on_reset_grid(node.phase(), config.phase_reset_granularity), "{} has phase {}", node.id(), node.phase());
    }
    Ok(())
}

#[test]
fn test_uniform_scheme_never_resets_at_zero_rate() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(301);
    let config = MutationConfig { phase_reset_rate: 0.0, ..MutationConfig::default() };
    let mut graph = CircuitGraph::new(GraphShape::default())?;
    let counts = graph.mutate(300, &config, &mut rng)?;

    assert_eq!(counts.get(MutationKind::PhaseReset), 0);
    assert!(counts.get(MutationKind::PhasePerturb) > 0);
    Ok(())
}

#[test]
fn test_weighted_function_change_keeps_phase() -> Result<(), ZxError> {
    let mut rng = StdRng::seed_from_u64(302);
    let shape = GraphShape::new(1, 1, 3, 1, 1, 1, 4);
    let mut graph = CircuitGraph::new(shape)?;
    let mutable: Vec<NodeId> = graph.nodes().map(|node| node.id()).filter(|id| id.layer > 0).collect();
    for &id in &mutable {
        graph.set_phase(id, 0.3)?;
    }

    // the default config resets at full rate, which only applies to the uniform scheme
    let weights = MutationWeights { rewire: 0.0, disconnect: 0.0, function: 1.0, perturb: 0.0, reset: 0.0, control: 0.0 };
    let counts = graph.mutate_weighted(10, &MutationConfig::default(), &weights, &mut rng)?;

    assert_eq!(counts.get(MutationKind::FunctionChange), 10);
    for &id in &mutable {
        assert_eq!(graph.node(id).map(|node| node.phase()), Some(0.3), "{}", id);
    }
    Ok(())
}

#[test]
fn test_rewire_leaves_activity_to_active_pass() -> Result<(), ZxError> {
    let mut graph = CircuitGraph::new(GraphShape::new(1, 1, 1, 1, 1, 1, 2))?;
    graph.connect(n(0, 0), 0, n(1, 0), 0)?;
    graph.connect(n(1, 0), 0, n(2, 0), 0)?;
    assert_eq!(graph.count_inactive_inputs(), 0.0);

    // the input now feeds the output directly and the hidden node is cut off
    let undo = graph.rewire(n(2, 0).slot(0), n(0, 0).slot(0));
    assert!(graph.node(n(1, 0)).is_some_and(|node| node.is_active()));
    graph.active_pass();
    assert!(graph.node(n(1, 0)).is_some_and(|node| !node.is_active()));
    assert_eq!(graph.count_inactive_inputs(), 0.0);

    graph.revert_rewire(undo);
    graph.active_pass();
    assert!(graph.node(n(1, 0)).is_some_and(|node| node.is_active()));
    validate_edges(&graph)
}
