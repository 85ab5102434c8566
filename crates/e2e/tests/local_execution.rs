//! End-to-end flows over the local transport
//!
//! These exercise the same code paths scenarios use against SSH targets, but
//! through `sh -c` on the harness host so they run anywhere.

use std::time::Duration;

use mgrts_common::duration::channel_sync_seconds;
use mgrts_common::error::Error;
use mgrts_common::retry::RetryOpts;
use mgrts_remote::{Node, OsFamily, RunOpts};

fn local_server() -> Node {
    Node::local("server", OsFamily::Suse)
}

fn fast_retry(timeout_ms: u64) -> RetryOpts {
    RetryOpts::new(Duration::from_millis(timeout_ms)).with_interval(Duration::from_millis(20))
}

#[tokio::test]
async fn zypper_style_exit_codes_pass_the_package_success_set() {
    let node = local_server();
    let opts = RunOpts::default().with_success_codes(node.os_family.package_success_codes());

    // 106 is a soft repo-refresh failure for zypper; accepted.
    let output = node.run("exit 106", &opts).await.unwrap();
    assert_eq!(output.exit_code, 106);

    // 1 is a real failure on every family.
    let err = node.run("exit 1", &opts).await.unwrap_err();
    assert!(matches!(err, Error::CommandFailed { exit_code: 1, .. }));
}

#[tokio::test]
async fn waiting_for_a_file_to_appear_behaves_like_a_service_wait() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("up");
    let marker_str = marker.to_string_lossy().to_string();

    let node = local_server();
    let create_cmd = format!("sleep 0.2 && touch {marker_str}");
    let create_opts = RunOpts::default();
    let creator = node.run(&create_cmd, &create_opts);
    let wait_cmd = format!("test -f {marker_str}");
    let waiter = node.run_until_ok(&wait_cmd, fast_retry(5_000));

    let (created, waited) = tokio::join!(creator, waiter);
    created.unwrap();
    assert_eq!(waited.unwrap().exit_code, 0);
}

#[tokio::test]
async fn wait_timeout_reports_command_and_host() {
    let node = local_server();
    let err = node
        .run_until_ok("false", fast_retry(100))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(err.is_timeout());
    assert!(message.contains("`false`"));
    assert!(message.contains("server"));
}

#[tokio::test]
async fn reposync_log_fetched_over_the_node_yields_durations() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("reposync.log");
    std::fs::write(
        &log_path,
        "Channel: sle-pool\nSync completed.\nTotal time: 0:03:20\n",
    )
    .unwrap();

    let node = local_server();
    let log = node
        .run(
            &format!("cat {}", log_path.to_string_lossy()),
            &RunOpts::default(),
        )
        .await
        .unwrap()
        .stdout;

    let report = channel_sync_seconds(&log, &["sle-pool"]).unwrap();
    assert_eq!(report.seconds, 200);
    assert_eq!(report.matches, 1);
}

#[tokio::test]
async fn extract_round_trips_a_remote_file() {
    let dir = tempfile::tempdir().unwrap();
    let remote = dir.path().join("remote.txt");
    let local = dir.path().join("local.txt");
    std::fs::write(&remote, b"log contents").unwrap();

    local_server()
        .extract(&remote.to_string_lossy(), &local)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&local).unwrap(), b"log contents");
}
