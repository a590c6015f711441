// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod edge;
pub mod matrix;
pub mod state;

// Re-export public types for convenient access via `zxcgp::core::TypeName`
pub use error::ZxError;
pub use edge::{EdgePointer, NodeId};
pub use matrix::ComplexMatrix;
pub use state::QuantumState;

pub mod constants;
pub use constants::zx_constants::{DEFAULT_TOLERANCE, ERROR_FLOOR, TAU};
