//! AI systems (обвязка ядра поведения в FixedUpdate)

pub mod context;
pub mod decision;
pub mod reactions;
pub mod registry;

// Re-export all systems
pub use context::*;
pub use decision::*;
pub use reactions::*;
pub use registry::*;
