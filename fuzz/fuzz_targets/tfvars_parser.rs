#![no_main]

use libfuzzer_sys::fuzz_target;
use regcheck_verifier::DeclaredConfig;

fuzz_target!(|data: &[u8]| {
    // 변수 파일은 UTF-8 텍스트만 받는다
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(declared) = DeclaredConfig::parse("fuzz.tfvars", content) {
            for name in declared.variables() {
                let _ = declared.string(name);
            }
        }
    }
});
