//! Built-in handler implementations for every node-type tag in the closed
//! set.

pub mod analysis;
pub mod auto_fix;
pub mod decision;
pub mod notify;
pub mod scanner;
pub mod trigger;
