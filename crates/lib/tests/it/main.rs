/*! Integration tests for authdir.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - store: store root handle, document round-trips, format selection
 * - users: the users repository and its document
 * - pubkey: layered key file resolution against a real store
 * - groups: the groups repository and member resolution
 * - auth: authorization scopes, device users and grants
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("authdir=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod auth;
mod groups;
mod helpers;
mod pubkey;
mod store;
mod users;
