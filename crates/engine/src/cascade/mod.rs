//! Cascading field coordination.
//!
//! Dependent fields are declared as edges of a directed acyclic graph
//! (`channel -> provider_id`, `channel -> subscription_id`). When an upstream
//! field changes, every affected edge is re-evaluated with the same rule:
//! recompute the pool from the full catalog, then keep the current pick if it
//! is still in the pool or elect the pool's first element.

mod graph;
mod pool;

pub use graph::{CascadeCoordinator, CascadeEdge, CascadeError, CascadeGraph};
pub use pool::{DependentPool, EdgeOutcome, PoolState};
