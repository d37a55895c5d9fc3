//! Backend integration tests

mod memory_tests;
mod persistence_tests;
