//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod session_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use session_hub::SessionHub;
pub use test_dependencies::TestDependencies;
pub use traits::*;
