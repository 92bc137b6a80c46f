//! `nodes` crate — the `ExecutableNode` trait and built-in node implementations.
//!
//! Every node — built-in and plugin alike — must implement [`ExecutableNode`].
//! The engine crate dispatches execution through this trait object.

pub mod error;
pub mod handlers;
pub mod mock;
pub mod registry;
pub mod result;
pub mod traits;

pub use error::NodeError;
pub use result::NodeResult;
pub use traits::{ExecutableNode, ExecutionContext, HandlerDeps, NodeDefinition, ResultStore};
pub use registry::Registry;
