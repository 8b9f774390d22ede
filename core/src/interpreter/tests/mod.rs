//! Tests for the execution engine
//!
//! Organized by feature area

mod helpers;

mod handler_tests;
