//! `engine` crate — the workflow execution engine: DAG parsing, topological
//! scheduling, the skip/gate evaluator, the execution controller, and the
//! report aggregator.

pub mod dag;
pub mod error;
pub mod executor;
pub mod gate;
pub mod models;
pub mod parser;
pub mod report;

pub use error::EngineError;
pub use executor::{enqueue, run_in_memory};
pub use models::{Edge, ExecutionStatus, NodeDefinition, Workflow};
pub use parser::parse;
