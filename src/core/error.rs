//! Error handling logic

use std::fmt;

use super::edge::NodeId;

/// Error types raised by the simulator and the circuit graph.
///
/// Arithmetic between internally generated matrices does not go through this
/// type: a dimension mismatch there is a broken invariant and panics. The
/// variants below cover inputs that come from a caller and bookkeeping
/// failures that a caller can report and recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZxError {
    /// A caller supplied state or matrix does not fit the operator it is used with.
    DimensionMismatch {
        /// DimensionMismatch failure message
        message: String
    },

    /// A spider was asked for a matrix it cannot have (zero inputs and zero outputs).
    InvalidOperator {
        /// InvalidOperator failure message
        message: String
    },

    /// Two edge orderings handed to connection matrix construction do not
    /// describe the same edge set.
    ConnectionMismatch {
        /// ConnectionMismatch failure message
        message: String
    },

    /// A measurement addressed a qubit outside the state.
    InvalidQubit {
        /// Requested qubit index
        qubit: usize,
        /// Number of qubits in the measured state
        num_qubits: usize,
    },

    /// Graph shape or mutation parameters are unusable.
    InvalidConfiguration {
        /// InvalidConfiguration failure message
        message: String
    },

    /// An edge is not mirrored on the node at its other end.
    EdgeInconsistency {
        /// Node holding the dangling pointer
        node: NodeId,
        /// EdgeInconsistency failure message
        message: String
    },

    /// A state failed a normalization check.
    Incoherence {
        /// Incoherence failure message
        message: String
    },
}

impl fmt::Display for ZxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZxError::DimensionMismatch { message } => write!(f, "Dimension Mismatch: {}", message),
            ZxError::InvalidOperator { message } => write!(f, "Invalid Operator: {}", message),
            ZxError::ConnectionMismatch { message } => write!(f, "Connection Mismatch: {}", message),
            ZxError::InvalidQubit { qubit, num_qubits } => {
                write!(f, "Invalid Qubit: index {} on a {}-qubit state", qubit, num_qubits)
            }
            ZxError::InvalidConfiguration { message } => write!(f, "Invalid Configuration: {}", message),
            ZxError::EdgeInconsistency { node, message } => write!(f, "Edge Inconsistency ({}): {}", node, message),
            ZxError::Incoherence { message } => write!(f, "Incoherence: {}", message),
        }
    }
}

impl std::error::Error for ZxError {}
