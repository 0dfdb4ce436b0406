//! `cmdtree` - platform-agnostic command tree engine
//!
//! Commands are registered as paths of literals, typed arguments and flags
//! into a [`CommandTree`](tree::CommandTree). A
//! [`CommandManager`](manager::CommandManager) freezes the tree and offers
//! parsing, suggestions and dispatch through a pluggable
//! [`ExecutionCoordinator`](execution::ExecutionCoordinator).
//!
//! ```
//! use std::sync::Arc;
//! use cmdtree::execution::{ExecutionOutcome, InlineCoordinator};
//! use cmdtree::manager::CommandManager;
//! use cmdtree::parser::{IntegerParser, StringParser};
//! use cmdtree::sender::Sender;
//! use cmdtree::tree::{CommandBuilder, CommandTree};
//!
//! struct Console;
//!
//! impl Sender for Console {
//!     fn name(&self) -> &str {
//!         "console"
//!     }
//!
//!     fn has_permission(&self, _permission: &str) -> bool {
//!         true
//!     }
//! }
//!
//! let mut tree = CommandTree::new();
//! tree.insert(
//!     CommandBuilder::new("give")
//!         .argument("player", StringParser::single())
//!         .optional_with_default("amount", IntegerParser::range(1, 64), 1)
//!         .handler(|ctx| Ok(ctx.get::<i64>("amount")?.into())),
//! )
//! .unwrap();
//!
//! let manager = CommandManager::new(tree, InlineCoordinator);
//! let outcome = manager.parse_and_execute(Arc::new(Console), "give bob");
//! assert!(matches!(outcome, ExecutionOutcome::Success(v) if v == 1));
//! assert_eq!(manager.suggest(Arc::new(Console), "gi"), ["give"]);
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod manager;
pub mod observability;
pub mod parser;
pub mod sender;
pub mod suggestion;
pub mod tokenizer;
pub mod tree;
pub mod value;
pub mod walker;

pub use context::CommandContext;
pub use error::{CmdTreeError, Result};
pub use execution::{ExecutionOutcome, OutcomeKind};
pub use manager::CommandManager;
pub use sender::Sender;
pub use tree::{CommandBuilder, CommandTree};
