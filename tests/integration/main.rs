//! Integration tests for goal-breaker
//!
//! These tests drive the decomposition pipeline with scripted backends, the
//! HTTP backend clients against mock servers, and the full router in-process.


mod llm_tests;
mod server_tests;

// Re-export common utilities for use by test modules
pub use common::*;
