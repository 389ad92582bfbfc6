//! Unit test modules.

mod queue_test;
mod utterance_test;
