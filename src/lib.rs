// Library exports for goal-breaker
// This allows the modules to be imported in tests and by the binary

pub mod config;
pub mod decomposition;
pub mod llm;
pub mod persistence;
pub mod server;
