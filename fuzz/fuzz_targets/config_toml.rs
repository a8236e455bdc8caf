#![no_main]

use libfuzzer_sys::fuzz_target;

use breachsim_core::config::BreachsimConfig;
use breachsim_engine::EngineConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(config) = BreachsimConfig::parse(content) {
            // core 검증을 통과한 설정은 엔진도 받아들여야 함
            if config.validate().is_ok() {
                assert!(EngineConfig::from_core(&config).is_ok());
            }
        }
    }
});
