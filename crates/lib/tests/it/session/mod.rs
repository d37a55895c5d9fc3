//! Session controller integration tests

mod lifecycle_tests;
mod reload_tests;
