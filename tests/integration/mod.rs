//! Integration test modules.

mod narration_test;
