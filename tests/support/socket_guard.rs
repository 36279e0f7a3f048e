//! Skip guard for tests that need a localhost mock server.
//!
//! Sandboxed build environments sometimes forbid binding sockets; in that
//! case the wiremock-backed tests skip with a notice instead of failing on an
//! unrelated permission error. Set `MONLYCEE_REQUIRE_SOCKET_TESTS=1` to turn
//! the skip into a hard failure where sockets are known to be available.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

fn sockets_required() -> bool {
    matches!(
        std::env::var("MONLYCEE_REQUIRE_SOCKET_TESTS").as_deref(),
        Ok("1" | "true" | "yes" | "TRUE" | "YES")
    )
}

/// Starts a mock server, or returns `None` when this environment cannot bind
/// localhost sockets. Callers early-return on `None`, skipping the test body.
#[track_caller]
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }

    let caller = Location::caller();
    let notice = format!(
        "[socket-bound-test] cannot bind a localhost socket at {}:{}",
        caller.file(),
        caller.line()
    );
    assert!(
        !sockets_required(),
        "{notice}; MONLYCEE_REQUIRE_SOCKET_TESTS is set, failing instead of skipping"
    );
    eprintln!("{notice}; skipping (set MONLYCEE_REQUIRE_SOCKET_TESTS=1 to fail-fast instead)");
    None
}
