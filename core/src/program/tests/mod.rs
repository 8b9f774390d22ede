//! Tests for the Sequence Store
//!
//! Organized by operation

mod helpers;
