//! Property-based tests for aggregation.
