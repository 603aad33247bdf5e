//! Utility functions and helpers
//!
//! Small building blocks shared by the engine and the shell.

pub mod debouncer;
pub mod logging;
