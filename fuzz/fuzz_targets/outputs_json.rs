#![no_main]

use libfuzzer_sys::fuzz_target;
use regcheck_verifier::parse_outputs;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(outputs) = parse_outputs("fuzz-outputs.json", content) {
            for value in outputs.values() {
                let _ = value.as_names();
                let _ = value.as_tags();
            }
        }
    }
});
