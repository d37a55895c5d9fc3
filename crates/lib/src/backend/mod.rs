//! First-party implementations of the collaborator contracts
//!
//! Two backends ship with the library, each implementing all three contracts
//! ([`crate::auth::AuthService`], [`crate::directory::ProfileDirectory`],
//! [`crate::store::CharacterStore`]):
//!
//! * [`memory::InMemory`]: process-local accounts and characters with
//!   optional JSON file persistence. The "local storage" mode, and the
//!   backend used by the test suite.
//! * [`remote::Remote`]: client for a Supabase-style hosted backend
//!   (requires the `remote` feature, enabled by default).

pub mod memory;

#[cfg(feature = "remote")]
pub mod remote;
