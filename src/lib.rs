//! A hierarchical test-execution engine in Rust.
//!

/// Layer 1: node capabilities and result vocabulary.
pub use gauntlet_node;

/// Layer 2: tree storage, execution, listeners, and scheduling.
pub use gauntlet_engine;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use gauntlet_engine::prelude::*;
    pub use gauntlet_node::prelude::*;
}
