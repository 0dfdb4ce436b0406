#![no_main]

use std::path::Path;

use cmdtree::config::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = ConfigLoader::default().with_env(|_| None);
        let _ = loader.load_str(yaml_str, Path::new("fuzz.yaml"));
    }
});
