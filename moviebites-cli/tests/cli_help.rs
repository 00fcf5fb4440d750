use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn help_text(args: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("moviebites");
    let output = cmd
        .args(args)
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn top_level_help_lists_resources() {
    let text = help_text(&[]);
    for command in [
        "webseries",
        "categories",
        "favorites",
        "likes",
        "users",
        "upsert",
        "login",
        "logout",
        "whoami",
    ] {
        assert!(text.contains(command), "help missing '{command}'");
    }
    assert!(text.contains("--base-url"), "help missing --base-url");
}

#[test]
fn webseries_help_lists_operations() {
    let text = help_text(&["webseries"]);
    for action in ["list", "get", "slug", "search", "create", "update", "delete"] {
        assert!(text.contains(action), "webseries help missing '{action}'");
    }
    let list = help_text(&["webseries", "list"]);
    assert!(list.contains("--page"), "list help missing --page");
    assert!(list.contains("--filter"), "list help missing --filter");
}

#[test]
fn reaction_commands_accept_episode() {
    let text = help_text(&["favorites", "add"]);
    assert!(text.contains("--episode"), "favorites add missing --episode");
    let text = help_text(&["likes", "remove"]);
    assert!(text.contains("--episode"), "likes remove missing --episode");
}

#[test]
fn invalid_json_payload_is_rejected() {
    let mut cmd = cargo_bin_cmd!("moviebites");
    cmd.args(["categories", "create", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn malformed_filter_is_rejected() {
    let mut cmd = cargo_bin_cmd!("moviebites");
    cmd.args(["webseries", "list", "--filter", "genre"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}
