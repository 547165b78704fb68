//! The node vocabulary for Gauntlet (Layer 1).
//!
//! `gauntlet_node` defines what a tree of executable work is made of,
//! independently of how it is executed:
//!
//! - [`node`] - Container/leaf capabilities and the closed node union
//! - [`context`] - Immutable execution contexts and the typed value set
//! - [`skip`] - Skip decisions returned by a node's skip check
//! - [`error`] - Hook errors and their closed severity classification
//! - [`outcome`] - The terminal result vocabulary for executed nodes
//!
//! # Architecture
//!
//! This crate is Layer 1 of the Gauntlet architecture:
//!
//! - **Layer 1** (`gauntlet_node`): node capabilities and result
//!   vocabulary (this crate)
//! - **Layer 2** (`gauntlet_engine`): tree storage, the recursive
//!   executor, listeners, and scheduling
//!
//! # Example
//!
//! ```
//! use gauntlet_node::context::ValueSet;
//! use gauntlet_node::node::{FunctionLeaf, Leaf};
//!
//! #[derive(Debug)]
//! struct Endpoint(&'static str);
//!
//! let leaf = FunctionLeaf::new(|context: ValueSet| {
//!     let endpoint = context.try_get::<Endpoint>()?;
//!     assert_eq!(endpoint.0, "localhost:9200");
//!     Ok(())
//! });
//!
//! let context = ValueSet::new().with(Endpoint("localhost:9200"));
//! assert!(leaf.execute(context).is_ok());
//! ```

/// Immutable execution contexts and the typed value set.
pub mod context;

/// Hook errors and their closed severity classification.
pub mod error;

/// Node capabilities and the closed container/leaf union.
pub mod node;

/// The terminal result vocabulary for executed nodes.
pub mod outcome;

/// Skip decisions returned by a node's skip check.
pub mod skip;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::context::*;
    pub use crate::error::*;
    pub use crate::node::*;
    pub use crate::outcome::*;
    pub use crate::skip::*;
}
