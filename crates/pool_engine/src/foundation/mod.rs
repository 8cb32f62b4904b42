//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the pool engine:
//! - Math types for spawn placement
//! - Logging utilities

pub mod math;
pub mod logging;
