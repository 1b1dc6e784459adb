#![no_main]

use libfuzzer_sys::fuzz_target;
use regcheck_verifier::ScenarioSpec;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(spec) = toml::from_str::<ScenarioSpec>(content) {
            // 잘못된 정규식이나 중복 이름은 패닉이 아니라 에러여야 한다
            let _ = spec.validate();
            let _ = spec.declared_variables();
        }
    }
});
