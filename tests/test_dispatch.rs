mod common;

use std::sync::Arc;

use cmdtree::error::{ArgumentParseError, ExecutionError, ParseError, ParseErrorKind};
use cmdtree::execution::{ExecutionOutcome, InlineCoordinator, OutcomeKind};
use cmdtree::manager::CommandManager;
use cmdtree::walker::Rejection;
use common::{Player, inline_manager, success};
use serde_json::json;

fn argument_error(outcome: ExecutionOutcome) -> ParseError {
    match outcome {
        ExecutionOutcome::ArgumentError(err) => err,
        other => panic!("expected an argument error, got {other:?}"),
    }
}

// ============================================================================
// Successful dispatch
// ============================================================================

#[test]
fn optional_argument_takes_default() {
    let (manager, counters) = inline_manager();
    let value = success(manager.parse_and_execute(Player::admin(), "give bob"));
    assert_eq!(value, json!({"player": "bob", "amount": 1, "silent": false}));
    let value = success(manager.parse_and_execute(Player::admin(), "give bob 64"));
    assert_eq!(value["amount"], 64);
    assert_eq!(counters.give(), 2);
}

#[test]
fn flags_in_long_and_short_form() {
    let (manager, _) = inline_manager();
    let long = success(manager.parse_and_execute(Player::admin(), "give bob 3 --silent"));
    let short = success(manager.parse_and_execute(Player::admin(), "give bob -s"));
    assert_eq!(long["silent"], true);
    assert_eq!(short["silent"], true);
    assert_eq!(short["amount"], 1);
}

#[test]
fn valued_flag_reads_quoted_text() {
    let (manager, _) = inline_manager();
    let value = success(manager.parse_and_execute(
        Player::admin(),
        r#"ban carol 7 -r "spamming chat" --silent"#,
    ));
    assert_eq!(value, json!({"player": "carol", "days": 7, "reason": "spamming chat"}));
}

#[test]
fn aliases_reach_the_same_command() {
    let (manager, _) = inline_manager();
    let a = success(manager.parse_and_execute(Player::guest(), "tp alice"));
    let b = success(manager.parse_and_execute(Player::guest(), "teleport alice"));
    assert_eq!(a, b);
}

#[test]
fn greedy_argument_keeps_the_rest() {
    let (manager, _) = inline_manager();
    let value = success(manager.parse_and_execute(Player::guest(), "say  hello   there world"));
    assert_eq!(value, "hello there world");
}

#[test]
fn optional_argument_may_be_skipped() {
    let (manager, _) = inline_manager();
    assert_eq!(
        success(manager.parse_and_execute(Player::guest(), "gamemode creative")),
        "creative"
    );
    assert_eq!(
        success(manager.parse_and_execute(Player::guest(), "gamemode survival bob")),
        "survival"
    );
}

#[test]
fn command_prefix_is_stripped() {
    let (tree, _) = common::tree();
    let manager =
        CommandManager::new(tree, InlineCoordinator).with_command_prefix(Some("/".to_string()));
    assert_eq!(success(manager.parse_and_execute(Player::admin(), "/time set 100")), 100);
    assert_eq!(success(manager.parse_and_execute(Player::admin(), "time query")), 6000);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn out_of_range_argument_points_at_token() {
    let (manager, counters) = inline_manager();
    let err = argument_error(manager.parse_and_execute(Player::admin(), "give bob 65"));
    assert_eq!(err.index, 2);
    assert!(matches!(
        err.kind,
        ParseErrorKind::Argument {
            ref argument,
            source: ArgumentParseError::OutOfRange { .. },
        } if argument == "amount"
    ));
    assert_eq!(counters.give(), 0);
}

#[test]
fn missing_required_argument() {
    let (manager, _) = inline_manager();
    let err = argument_error(manager.parse_and_execute(Player::admin(), "time set"));
    assert_eq!(
        err,
        ParseError::new(
            2,
            ParseErrorKind::MissingArgument {
                argument: "ticks".to_string()
            }
        )
    );
}

#[test]
fn wrong_literal_lists_expected_syntax() {
    let (manager, _) = inline_manager();
    let err = argument_error(manager.parse_and_execute(Player::admin(), "time reset"));
    assert_eq!(err.index, 1);
    assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
}

#[test]
fn trailing_tokens_are_rejected() {
    let (manager, _) = inline_manager();
    let err = argument_error(manager.parse_and_execute(Player::admin(), "time query now"));
    assert_eq!(
        err,
        ParseError::new(
            2,
            ParseErrorKind::UnexpectedToken {
                token: "now".to_string()
            }
        )
    );
}

#[test]
fn flag_errors() {
    let (manager, _) = inline_manager();
    let err = argument_error(manager.parse_and_execute(Player::admin(), "give bob --loud"));
    assert!(matches!(err.kind, ParseErrorKind::UnknownFlag { .. }));

    let err = argument_error(manager.parse_and_execute(Player::admin(), "give bob -s --silent"));
    assert_eq!(err.index, 3);
    assert!(matches!(err.kind, ParseErrorKind::DuplicateFlag { .. }));

    let err = argument_error(manager.parse_and_execute(Player::admin(), "ban bob --reason"));
    assert!(matches!(err.kind, ParseErrorKind::MissingFlagValue { .. }));
}

#[test]
fn unknown_command_suggests_closest() {
    let (manager, _) = inline_manager();
    match manager.parse_and_execute(Player::admin(), "gvie bob") {
        ExecutionOutcome::NoSuchCommand { closest } => {
            assert_eq!(closest.as_deref(), Some("give"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    match manager.parse_and_execute(Player::admin(), "xyzzyplugh") {
        ExecutionOutcome::NoSuchCommand { closest } => assert_eq!(closest, None),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn closest_never_names_inaccessible_commands() {
    let (manager, _) = inline_manager();
    match manager.parse_and_execute(Player::guest(), "bam bob") {
        ExecutionOutcome::NoSuchCommand { closest } => {
            assert_ne!(closest.as_deref(), Some("ban"));
        }
        ExecutionOutcome::PermissionDenied => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn permission_denial_hides_the_argument_shape() {
    let (manager, counters) = inline_manager();
    for input in ["give bob", "give", "give bob notanumber", "give bob --nope"] {
        assert_eq!(
            manager.parse_and_execute(Player::guest(), input).kind(),
            OutcomeKind::PermissionDenied,
            "input: {input}"
        );
    }
    assert_eq!(counters.give(), 0);
}

#[test]
fn permission_is_per_branch() {
    let (manager, _) = inline_manager();
    let timekeeper = Player::with_permissions("tk", &["game.time"]);
    assert!(manager.parse_and_execute(Arc::clone(&timekeeper), "time query").is_success());
    assert_eq!(
        manager.parse_and_execute(timekeeper, "ban bob").kind(),
        OutcomeKind::PermissionDenied
    );
}

#[test]
fn sender_type_is_enforced() {
    let (manager, _) = inline_manager();
    assert_eq!(
        manager.parse_and_execute(Player::console(), "me waves").kind(),
        OutcomeKind::WrongSenderType
    );
    assert_eq!(
        success(manager.parse_and_execute(Player::guest(), "me waves")),
        "waves"
    );
}

// ============================================================================
// Handler failures
// ============================================================================

#[test]
fn handler_error_is_an_execution_failure() {
    let (manager, _) = inline_manager();
    match manager.parse_and_execute(Player::guest(), "fail") {
        ExecutionOutcome::ExecutionFailure(ExecutionError::Handler(cause)) => {
            assert_eq!(cause.to_string(), "out of stock");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn handler_panic_is_contained() {
    let (manager, _) = inline_manager();
    match manager.parse_and_execute(Player::guest(), "boom") {
        ExecutionOutcome::ExecutionFailure(ExecutionError::Panicked(message)) => {
            assert!(message.contains("handler exploded"), "{message}");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    // The manager keeps working afterwards.
    assert!(manager.parse_and_execute(Player::guest(), "tp bob").is_success());
}

// ============================================================================
// Resolution without execution
// ============================================================================

#[test]
fn resolve_is_repeatable() {
    let (manager, counters) = inline_manager();
    let first = manager.resolve(Player::admin(), "ban bob 3 -s").unwrap();
    let second = manager.resolve(Player::admin(), "ban bob 3 -s").unwrap();
    assert_eq!(first.command().syntax(), second.command().syntax());
    assert_eq!(first.context().arguments_json(), second.context().arguments_json());
    assert!(first.context().flags().contains("silent"));
    assert_eq!(counters.give(), 0);
}

#[test]
fn resolve_reports_rejections() {
    let (manager, _) = inline_manager();
    assert!(matches!(
        manager.resolve(Player::guest(), "ban bob"),
        Err(Rejection::PermissionDenied)
    ));
    assert!(matches!(
        manager.resolve(Player::guest(), ""),
        Err(Rejection::NoSuchCommand { .. })
    ));
}

#[test]
fn help_follows_access() {
    let (manager, _) = inline_manager();
    let guest: Vec<String> = manager
        .help(&Player::guest())
        .into_iter()
        .map(|entry| entry.syntax)
        .collect();
    assert!(guest.contains(&"tp <player>".to_string()));
    assert!(!guest.iter().any(|s| s.starts_with("give") || s.starts_with("time")));
    assert!(manager.help(&Player::admin()).len() > guest.len());
}
