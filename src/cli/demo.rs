//! Demo sender and command set used by the console adapter.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::context::CommandContext;
use crate::error::{ArgumentParseError, ConstructionError, HandlerError};
use crate::parser::{ArgumentParser, ChoiceParser, DurationParser, IntegerParser, StringParser};
use crate::sender::Sender;
use crate::tokenizer::TokenCursor;
use crate::tree::{CommandBuilder, CommandTree, FlagSpec};
use crate::value::{Value, ValueKind};

/// Players the demo pretends are online.
pub const ONLINE_PLAYERS: &[&str] = &["alice", "bob", "carol", "dave"];

/// Sender built from command-line options.
#[derive(Debug, Clone)]
pub struct ConsoleSender {
    name: String,
    permissions: Vec<String>,
    capabilities: Vec<String>,
}

impl ConsoleSender {
    /// Creates a sender.
    ///
    /// The sender named `console` declares the `console` capability and holds
    /// every permission; any other name is a `player` holding only what is
    /// passed in.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        mut permissions: Vec<String>,
        mut capabilities: Vec<String>,
    ) -> Self {
        let name = name.into();
        let is_console = name == "console";
        let implied = if is_console { "console" } else { "player" };
        if !capabilities.iter().any(|c| c == implied) {
            capabilities.push(implied.to_string());
        }
        if is_console && permissions.is_empty() {
            permissions.push("*".to_string());
        }
        Self {
            name,
            permissions,
            capabilities,
        }
    }
}

impl Sender for ConsoleSender {
    fn name(&self) -> &str {
        &self.name
    }

    /// Exact nodes, `*`, and trailing wildcards such as `game.*`.
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|granted| {
            granted == "*"
                || granted == permission
                || granted.strip_suffix(".*").is_some_and(|prefix| {
                    permission
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('.'))
                })
        })
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// A single token naming a player; suggests online players other than the
/// sender.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerParser;

impl<S: Sender> ArgumentParser<S> for PlayerParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = cursor.peek().ok_or(ArgumentParseError::NoInput)?;
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ArgumentParseError::InvalidFormat {
                input: token.to_string(),
                expected: "player name",
            });
        }
        cursor.next_token();
        Ok(Value::String(token.to_string()))
    }

    fn suggestions(&self, context: &CommandContext<S>, _partial: &str) -> Vec<String> {
        ONLINE_PLAYERS
            .iter()
            .filter(|player| **player != context.sender().name())
            .map(|player| (*player).to_string())
            .collect()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::String
    }
}

fn silent() -> FlagSpec<ConsoleSender> {
    FlagSpec::presence("silent").alias("s")
}

/// Registers the demo commands.
///
/// # Errors
///
/// Returns a [`ConstructionError`] if a registration clashes.
pub fn register(tree: &mut CommandTree<ConsoleSender>) -> Result<(), ConstructionError> {
    tree.insert(
        CommandBuilder::new("give")
            .argument("player", PlayerParser)
            .optional_with_default("amount", IntegerParser::range(1, 64), 1)
            .flag(silent())
            .permission_node("game.give")
            .description("Give items to a player")
            .handler(|ctx| {
                let player: String = ctx.get("player")?;
                let amount: i64 = ctx.get("amount")?;
                Ok(json!(format!("Gave {amount} item(s) to {player}")))
            }),
    )?;

    tree.insert(
        CommandBuilder::new("tp")
            .alias("teleport")
            .argument("player", PlayerParser)
            .flag(silent())
            .permission_node("game.tp")
            .description("Teleport to a player")
            .handler(|ctx| {
                let player: String = ctx.get("player")?;
                if ctx.flags().contains("silent") {
                    Ok(serde_json::Value::Null)
                } else {
                    Ok(json!(format!("{} teleported to {player}", ctx.sender().name())))
                }
            }),
    )?;

    tree.insert(
        CommandBuilder::<ConsoleSender>::new("gamemode")
            .alias("gm")
            .argument(
                "mode",
                ChoiceParser::new(["survival", "creative", "adventure", "spectator"]).ignore_case(),
            )
            .optional("player", PlayerParser)
            .permission_node("game.gamemode")
            .description("Change a game mode")
            .handler(|ctx| {
                let mode: String = ctx.get("mode")?;
                let player = ctx.get_or("player", ctx.sender().name().to_string());
                Ok(json!(format!("Set {player}'s game mode to {mode}")))
            }),
    )?;

    tree.insert(
        CommandBuilder::new("time")
            .literal("set")
            .argument("ticks", IntegerParser::range(0, 24_000))
            .permission_node("game.time")
            .description("Set the time of day")
            .handler(|ctx| {
                let ticks: i64 = ctx.get("ticks")?;
                Ok(json!(format!("Time set to {ticks}")))
            }),
    )?;

    tree.insert(
        CommandBuilder::new("time")
            .literal("query")
            .permission_node("game.time")
            .description("Show the time of day")
            .handler(|_| Ok(json!("It is 6000"))),
    )?;

    tree.insert(
        CommandBuilder::<ConsoleSender>::new("say")
            .argument("message", StringParser::greedy())
            .description("Broadcast a message")
            .handler(|ctx| {
                let message: String = ctx.get("message")?;
                Ok(json!(format!("[{}] {message}", ctx.sender().name())))
            }),
    )?;

    tree.insert(
        CommandBuilder::<ConsoleSender>::new("me")
            .argument("action", StringParser::greedy())
            .requires_capability("player")
            .description("Describe an action")
            .handler(|ctx| {
                let action: String = ctx.get("action")?;
                Ok(json!(format!("* {} {action}", ctx.sender().name())))
            }),
    )?;

    tree.insert(
        CommandBuilder::new("ban")
            .argument("player", PlayerParser)
            .optional_with_default("days", IntegerParser::range(1, 365), 1)
            .flag(silent())
            .flag(FlagSpec::valued("reason", Arc::new(StringParser::quoted())).alias("r"))
            .permission_node("admin.ban")
            .description("Ban a player")
            .handler(|ctx| {
                let player: String = ctx.get("player")?;
                let days: i64 = ctx.get("days")?;
                let reason = ctx
                    .flags()
                    .get::<String>("reason")
                    .unwrap_or_else(|_| "no reason given".to_string());
                Ok(json!({
                    "banned": player,
                    "days": days,
                    "reason": reason,
                    "announced": !ctx.flags().contains("silent"),
                }))
            }),
    )?;

    tree.insert(
        CommandBuilder::new("ping")
            .description("Check that the engine responds")
            .async_handler(|ctx| async move {
                let id = ctx.execution_id().map(|id| id.to_string());
                Ok::<_, HandlerError>(json!({ "pong": true, "execution": id }))
            }),
    )?;

    tree.insert(
        CommandBuilder::new("wait")
            .argument(
                "duration",
                DurationParser::new().with_max(Duration::from_secs(60)),
            )
            .permission_node("debug.wait")
            .description("Sleep, then report")
            .async_handler(|ctx| async move {
                let duration: Duration = ctx.get("duration")?;
                tokio::time::sleep(duration).await;
                Ok::<_, HandlerError>(json!(format!(
                    "Waited {}",
                    humantime::format_duration(duration)
                )))
            }),
    )?;

    Ok(())
}

/// A tree holding the demo commands.
///
/// # Errors
///
/// Returns a [`ConstructionError`] if a registration clashes.
pub fn tree() -> Result<CommandTree<ConsoleSender>, ConstructionError> {
    let mut tree = CommandTree::new();
    register(&mut tree)?;
    Ok(tree)
}
