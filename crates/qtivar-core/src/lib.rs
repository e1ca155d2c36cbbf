//! qtivar-core — Response variable type system and state serialization.
//!
//! This crate models candidate answers as typed, cardinality-constrained
//! values, persists interaction edit-state in a compact textual notation and
//! encodes answers to and from the wire element read by a scoring service.

pub mod codec;
pub mod config;
pub mod declarations;
pub mod engine;
pub mod error;
pub mod literal;
pub mod model;
pub mod registry;
pub mod state;
pub mod status;
pub mod variable;

pub use engine::{Engine, EngineEvent, EventSink};
pub use error::{Result, VariableError};
