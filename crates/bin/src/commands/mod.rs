//! Command implementations for the Dramatis CLI.

pub mod account;
pub mod library;
