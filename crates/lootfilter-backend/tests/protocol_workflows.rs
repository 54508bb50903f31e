//! Protocol envelope behavior: exit-code lifecycle, diagnostic logging,
//! response file discipline.

mod common;

use std::fs;

use lootfilter_backend::protocol::{run_request, ExitCode, Workspace};

use common::{args, make_profile, FakeHost};

fn setup() -> (tempfile::TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path().join("work"));
    fs::create_dir_all(workspace.dir()).unwrap();
    (dir, workspace)
}

#[test]
fn successful_request_ends_with_success_marker() {
    let (dir, ws) = setup();
    let profile = make_profile(dir.path(), "League");
    let mut host = FakeHost::with_fresh("Show\n");

    run_request(
        &ws,
        &mut host,
        Some(&profile),
        "get_tier_of_currency",
        &args(&["Chaos Orb"]),
    )
    .unwrap();

    assert_eq!(ws.read_exit_code().unwrap(), Some(ExitCode::Success));
}

#[test]
fn failed_request_ends_with_error_marker_and_logged_chain() {
    let (dir, ws) = setup();
    let profile = make_profile(dir.path(), "League");
    let mut host = FakeHost::with_fresh("Show\n");
    host.fail_on = Some("set_gem_min_quality".to_string());

    run_request(
        &ws,
        &mut host,
        Some(&profile),
        "set_gem_min_quality",
        &args(&["14"]),
    )
    .unwrap_err();

    assert_eq!(ws.read_exit_code().unwrap(), Some(ExitCode::Error));
    let log = fs::read_to_string(ws.log_path()).unwrap();
    assert!(log.contains("request [League]: set_gem_min_quality 14"));
    assert!(log.contains("filter rejected set_gem_min_quality"));
}

#[test]
fn every_request_is_logged() {
    let (dir, ws) = setup();
    let profile = make_profile(dir.path(), "League");
    let mut host = FakeHost::with_fresh("Show\n");

    run_request(&ws, &mut host, Some(&profile), "get_gem_min_quality", &[]).unwrap();
    run_request(&ws, &mut host, None, "is_first_launch", &[]).unwrap();

    let log = fs::read_to_string(ws.log_path()).unwrap();
    assert!(log.contains("request [League]: get_gem_min_quality"));
    assert!(log.contains("request: is_first_launch"));
}

#[test]
fn single_call_response_replaces_previous_output() {
    let (dir, ws) = setup();
    let profile = make_profile(dir.path(), "League");
    let mut host = FakeHost::with_fresh("Show\n");

    run_request(
        &ws,
        &mut host,
        Some(&profile),
        "get_tier_of_currency",
        &args(&["Chaos Orb"]),
    )
    .unwrap();
    run_request(&ws, &mut host, Some(&profile), "get_gem_min_quality", &[]).unwrap();

    // No remnants of the first response.
    assert_eq!(
        fs::read_to_string(ws.output_path()).unwrap(),
        "get_gem_min_quality:"
    );
}

#[test]
fn failed_request_leaves_previous_output_untouched() {
    let (dir, ws) = setup();
    let profile = make_profile(dir.path(), "League");
    let mut host = FakeHost::with_fresh("Show\n");

    run_request(
        &ws,
        &mut host,
        Some(&profile),
        "get_tier_of_currency",
        &args(&["Chaos Orb"]),
    )
    .unwrap();
    run_request(&ws, &mut host, Some(&profile), "no_such_operation", &[]).unwrap_err();

    // The failed call wrote no partial response.
    assert_eq!(
        fs::read_to_string(ws.output_path()).unwrap(),
        "get_tier_of_currency:Chaos Orb"
    );
    assert_eq!(ws.read_exit_code().unwrap(), Some(ExitCode::Error));
}

#[test]
fn batch_response_keeps_trailing_separator_line() {
    let (dir, ws) = setup();
    let profile = make_profile(dir.path(), "League");
    let mut host = FakeHost::with_fresh("Show\n");
    fs::write(ws.input_path(), "get_gem_min_quality\n").unwrap();

    run_request(&ws, &mut host, Some(&profile), "run_batch", &[]).unwrap();

    assert_eq!(
        fs::read_to_string(ws.output_path()).unwrap(),
        "get_gem_min_quality:\n@\n"
    );
}
