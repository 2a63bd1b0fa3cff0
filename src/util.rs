//! Utility types for error handling.
//!
//! This module provides the common result type used throughout the program.

/// Custom result type for error handling throughout the program.
pub type Result<T> = anyhow::Result<T>;
