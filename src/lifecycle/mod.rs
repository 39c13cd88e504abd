//! Destructive and state-changing operations, gated by precondition
//! checks and per-resource mutual exclusion

pub mod locks;
pub mod orchestrator;

pub use locks::ResourceLocks;
pub use orchestrator::LifecycleOrchestrator;
