//! Utility functions shared across the codebase

pub mod logging;

pub use logging::init_tracing;
