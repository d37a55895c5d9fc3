/*! Integration tests for Dramatis.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - session: Tests for the SessionController state machine, including the
 *   async interleavings (duplicate submissions, reordered reloads)
 * - backend: Tests for the backend implementations of the collaborator
 *   contracts
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dramatis=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod helpers;
mod session;
