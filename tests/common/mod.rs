//! Shared integration-test fixtures: a sender type, a registered tree, and a
//! harness for running the `cmdtree` binary as a child process.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cmdtree::error::HandlerError;
use cmdtree::execution::{ConcurrentCoordinator, ExecutionOutcome, InlineCoordinator};
use cmdtree::manager::CommandManager;
use cmdtree::parser::{ChoiceParser, DurationParser, IntegerParser, StringParser};
use cmdtree::sender::Sender;
use cmdtree::tree::{CommandBuilder, CommandTree, FlagSpec};
use serde_json::json;

/// Players the fixture parsers suggest.
pub const PLAYERS: &[&str] = &["alice", "bob", "carol"];

/// A sender with explicit permission nodes and capabilities.
#[derive(Debug, Clone, Default)]
pub struct Player {
    pub name: String,
    pub permissions: Vec<String>,
    pub capabilities: Vec<String>,
}

impl Player {
    /// A player holding `permissions`.
    pub fn with_permissions(name: &str, permissions: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            permissions: permissions.iter().map(ToString::to_string).collect(),
            capabilities: vec!["player".to_string()],
        })
    }

    /// A player holding every fixture permission.
    pub fn admin() -> Arc<Self> {
        Self::with_permissions("admin", &["game.give", "game.time", "admin.ban"])
    }

    /// A player holding no permission.
    pub fn guest() -> Arc<Self> {
        Self::with_permissions("guest", &[])
    }

    /// A non-player sender holding every permission.
    pub fn console() -> Arc<Self> {
        Arc::new(Self {
            name: "console".to_string(),
            permissions: vec!["*".to_string()],
            capabilities: vec!["console".to_string()],
        })
    }
}

impl Sender for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == "*" || p == permission)
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Invocation counters shared with the fixture handlers.
#[derive(Debug, Default)]
pub struct Counters {
    pub give: AtomicUsize,
    pub slow: AtomicUsize,
}

impl Counters {
    pub fn give(&self) -> usize {
        self.give.load(Ordering::SeqCst)
    }

    pub fn slow(&self) -> usize {
        self.slow.load(Ordering::SeqCst)
    }
}

pub fn players() -> StringParser {
    StringParser::single().with_suggestions(PLAYERS.iter().copied())
}

/// Registers the fixture commands into `tree`.
pub fn register(tree: &mut CommandTree<Player>, counters: &Arc<Counters>) {
    let give_counter = Arc::clone(counters);
    tree.insert(
        CommandBuilder::new("give")
            .argument("player", players())
            .optional_with_default("amount", IntegerParser::range(1, 64), 1)
            .flag(FlagSpec::presence("silent").alias("s"))
            .permission_node("game.give")
            .description("Give items")
            .handler(move |ctx| {
                give_counter.give.fetch_add(1, Ordering::SeqCst);
                Ok(json!({
                    "player": ctx.get::<String>("player")?,
                    "amount": ctx.get::<i64>("amount")?,
                    "silent": ctx.flags().contains("silent"),
                }))
            }),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("tp")
            .alias("teleport")
            .argument("player", players())
            .handler(|ctx| Ok(json!(ctx.get::<String>("player")?))),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("time")
            .literal("set")
            .argument("ticks", IntegerParser::range(0, 24_000))
            .permission_node("game.time")
            .handler(|ctx| Ok(json!(ctx.get::<i64>("ticks")?))),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("time")
            .literal("query")
            .permission_node("game.time")
            .handler(|_| Ok(json!(6000))),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("ban")
            .argument("player", players())
            .optional_with_default("days", IntegerParser::range(1, 365), 1)
            .flag(FlagSpec::presence("silent").alias("s"))
            .flag(FlagSpec::valued("reason", Arc::new(StringParser::quoted())).alias("r"))
            .permission_node("admin.ban")
            .handler(|ctx| {
                Ok(json!({
                    "player": ctx.get::<String>("player")?,
                    "days": ctx.get::<i64>("days")?,
                    "reason": ctx.flags().get::<String>("reason").ok(),
                }))
            }),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("gamemode")
            .argument("mode", ChoiceParser::new(["survival", "creative"]))
            .optional("target", players())
            .handler(|ctx| Ok(json!(ctx.get::<String>("mode")?))),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("say")
            .argument("message", StringParser::greedy())
            .handler(|ctx| Ok(json!(ctx.get::<String>("message")?))),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("me")
            .argument("action", StringParser::greedy())
            .requires_capability("player")
            .handler(|ctx| Ok(json!(ctx.get::<String>("action")?))),
    )
    .unwrap();
    tree.insert(
        CommandBuilder::new("fail").handler(|_| Err(HandlerError::from("out of stock"))),
    )
    .unwrap();
    tree.insert(CommandBuilder::new("boom").handler(|_| panic!("handler exploded")))
        .unwrap();
    let slow_counter = Arc::clone(counters);
    tree.insert(
        CommandBuilder::new("slow")
            .argument("duration", DurationParser::new())
            .async_handler(move |ctx| {
                let counter = Arc::clone(&slow_counter);
                async move {
                    let duration: Duration = ctx.get("duration")?;
                    tokio::time::sleep(duration).await;
                    counter.slow.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, HandlerError>(json!("done"))
                }
            }),
    )
    .unwrap();
}

/// The fixture tree and the counters its handlers bump.
pub fn tree() -> (CommandTree<Player>, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let mut tree = CommandTree::new();
    register(&mut tree, &counters);
    (tree, counters)
}

/// A manager running handlers inline.
pub fn inline_manager() -> (CommandManager<Player>, Arc<Counters>) {
    let (tree, counters) = tree();
    (CommandManager::new(tree, InlineCoordinator), counters)
}

/// A manager running handlers on the current tokio runtime.
///
/// Panics outside a runtime.
pub fn concurrent_manager() -> (CommandManager<Player>, Arc<Counters>) {
    let (tree, counters) = tree();
    let coordinator = ConcurrentCoordinator::try_current().expect("no tokio runtime");
    (CommandManager::new(tree, coordinator), counters)
}

/// The JSON payload of a successful outcome.
#[allow(clippy::missing_panics_doc)]
pub fn success(outcome: ExecutionOutcome) -> serde_json::Value {
    match outcome {
        ExecutionOutcome::Success(value) => value,
        other => panic!("expected success, got {other:?}"),
    }
}

/// Runs the `cmdtree` binary as a child process.
pub struct CmdTreeProcess;

impl CmdTreeProcess {
    fn command(args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_cmdtree"));
        command
            .arg("--quiet")
            .args(args)
            .env_remove("CMDTREE_CONFIG")
            .env_remove("CMDTREE_COORDINATOR")
            .env_remove("CMDTREE_COMMAND_PREFIX");
        command
    }

    /// Runs a one-shot subcommand and collects its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args)
            .stdin(Stdio::null())
            .output()
            .expect("failed to run cmdtree")
    }

    /// Runs the interactive console, feeding it `lines` on stdin.
    #[allow(clippy::missing_panics_doc)]
    pub fn console(args: &[&str], lines: &[&str]) -> Output {
        let mut child = Self::command(&[&["console", "--prompt", ""], args].concat())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn cmdtree console");
        {
            let mut stdin = child.stdin.take().expect("stdin not captured");
            for line in lines {
                writeln!(stdin, "{line}").expect("write to console");
            }
        }
        child.wait_with_output().expect("console did not exit")
    }

    /// Path of a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
