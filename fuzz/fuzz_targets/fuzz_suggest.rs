#![no_main]

use std::sync::{Arc, LazyLock};

use cmdtree::cli::demo::{self, ConsoleSender};
use cmdtree::execution::InlineCoordinator;
use cmdtree::manager::CommandManager;
use libfuzzer_sys::fuzz_target;

static MANAGER: LazyLock<CommandManager<ConsoleSender>> = LazyLock::new(|| {
    let tree = demo::tree().expect("demo tree builds");
    CommandManager::new(tree, InlineCoordinator)
});

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let sender = Arc::new(ConsoleSender::new("alice", Vec::new(), Vec::new()));
        let _ = MANAGER.suggest(sender, input);
    }
});
