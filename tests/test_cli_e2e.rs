mod common;

use common::CmdTreeProcess;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// version command
// ============================================================================

#[test]
fn version_human() {
    let output = CmdTreeProcess::spawn_command(&["version"]);
    assert!(output.status.success(), "version should exit 0: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.starts_with("cmdtree "), "unexpected version output: {stdout}");
    assert!(stdout.contains('.'), "missing version number: {stdout}");
}

#[test]
fn version_json() {
    let output = CmdTreeProcess::spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "cmdtree");
    assert!(parsed["version"].is_string());
}

// ============================================================================
// exec command
// ============================================================================

#[test]
fn exec_prints_handler_output() {
    let output = CmdTreeProcess::spawn_command(&["exec", "give", "bob", "5"]);
    assert!(output.status.success(), "exec failed: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Gave 5 item(s) to bob");
}

#[test]
fn exec_binds_defaults_and_flags() {
    let output = CmdTreeProcess::spawn_command(&[
        "exec", "--format", "json", "ban", "carol", "--reason", "\"spam bot\"", "-s",
    ]);
    assert!(output.status.success(), "exec failed: {}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["outcome"], "success");
    assert_eq!(parsed["value"]["banned"], "carol");
    assert_eq!(parsed["value"]["days"], 1);
    assert_eq!(parsed["value"]["reason"], "spam bot");
    assert_eq!(parsed["value"]["announced"], false);
}

#[test]
fn exec_unknown_command_is_rejected() {
    let output = CmdTreeProcess::spawn_command(&["exec", "gvie", "bob"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("give"), "should suggest 'give': {}", stderr(&output));
}

#[test]
fn exec_argument_error_reports_index() {
    let output = CmdTreeProcess::spawn_command(&["exec", "--format", "json", "give", "bob", "99"]);
    assert_eq!(output.status.code(), Some(5));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["outcome"], "argument_error");
    assert_eq!(parsed["index"], 2);
}

#[test]
fn exec_respects_sender_permissions() {
    let output = CmdTreeProcess::spawn_command(&[
        "--as",
        "alice",
        "--permission",
        "game.give",
        "exec",
        "--format",
        "json",
        "ban",
        "bob",
    ]);
    assert_eq!(output.status.code(), Some(5));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["outcome"], "permission_denied");
}

#[test]
fn exec_sender_type_is_checked() {
    let output = CmdTreeProcess::spawn_command(&["exec", "--format", "json", "me", "waves"]);
    assert_eq!(output.status.code(), Some(5));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["outcome"], "wrong_sender_type");

    let output =
        CmdTreeProcess::spawn_command(&["--as", "alice", "exec", "me", "waves", "hello"]);
    assert!(output.status.success(), "exec failed: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "* alice waves hello");
}

#[test]
fn exec_async_handler_on_concurrent_coordinator() {
    let output = CmdTreeProcess::spawn_command(&[
        "--coordinator",
        "concurrent",
        "exec",
        "--format",
        "json",
        "ping",
    ]);
    assert!(output.status.success(), "exec failed: {}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["value"]["pong"], true);
    assert!(parsed["value"]["execution"].is_string());
}

// ============================================================================
// suggest and list commands
// ============================================================================

#[test]
fn suggest_root_prefix() {
    let output = CmdTreeProcess::spawn_command(&["suggest", "ga"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().collect::<Vec<_>>(), ["gamemode"]);
}

#[test]
fn suggest_json_after_trailing_space() {
    let output = CmdTreeProcess::spawn_command(&["suggest", "--format", "json", "time "]);
    assert!(output.status.success());
    let parsed: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed, ["set", "query"]);
}

#[test]
fn suggest_excludes_the_sender_from_players() {
    let output = CmdTreeProcess::spawn_command(&[
        "--as",
        "bob",
        "--permission",
        "game.*",
        "suggest",
        "tp ",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().collect::<Vec<_>>(), ["alice", "carol", "dave"]);
}

#[test]
fn list_hides_inaccessible_commands() {
    let output = CmdTreeProcess::spawn_command(&["--as", "alice", "list", "--format", "json"]);
    assert!(output.status.success());
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    let syntaxes: Vec<&str> = entries.iter().filter_map(|e| e["syntax"].as_str()).collect();
    assert!(syntaxes.contains(&"say <message>"), "{syntaxes:?}");
    assert!(syntaxes.iter().all(|s| !s.starts_with("ban")), "{syntaxes:?}");
}

// ============================================================================
// configuration
// ============================================================================

#[test]
fn config_file_sets_prefix_and_case() {
    let config = CmdTreeProcess::fixture_path("slash_prefix.yaml");
    let output = CmdTreeProcess::spawn_command(&[
        "--config",
        config.to_str().unwrap(),
        "exec",
        "/GIVE",
        "bob",
    ]);
    assert!(output.status.success(), "exec failed: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Gave 1 item(s) to bob");
}

#[test]
fn invalid_config_exits_with_config_error() {
    let config = CmdTreeProcess::fixture_path("invalid_prefixes.yaml");
    let output = CmdTreeProcess::spawn_command(&["--config", config.to_str().unwrap(), "list"]);
    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
}

#[test]
fn missing_config_exits_with_config_error() {
    let output =
        CmdTreeProcess::spawn_command(&["--config", "/nonexistent/cmdtree.yaml", "list"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// console
// ============================================================================

#[test]
fn console_runs_lines_until_exit() {
    let output = CmdTreeProcess::console(&[], &["give alice 2", "?tim", "", "exit", "say never"]);
    assert!(output.status.success(), "console failed: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("Gave 2 item(s) to alice"), "{stdout}");
    assert!(stdout.contains("time"), "{stdout}");
    assert!(!stdout.contains("never"), "{stdout}");
}

#[test]
fn console_reports_rejections_and_continues() {
    let output = CmdTreeProcess::console(&[], &["time set day", "time query"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("invalid input"), "{stdout}");
    assert!(stdout.contains("It is 6000"), "{stdout}");
}
