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
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // `wait` sleeps on a tokio timer; nothing here drives one.
    if input.trim_start().starts_with("wait") {
        return;
    }
    let sender = Arc::new(ConsoleSender::new("fuzzer", vec!["*".to_string()], Vec::new()));
    let _ = MANAGER.parse_and_execute(sender, input);
});
