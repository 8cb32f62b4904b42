//! Cross-module scenario tests for the pool registry
