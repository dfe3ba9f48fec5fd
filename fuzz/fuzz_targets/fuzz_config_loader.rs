#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validate arbitrary TOML; errors are fine, panics are not.
    if let Ok(cfg) = finwatch_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let _ = cfg.timing.effective_arrival_offset_secs();
        }
        let _ = cfg.credentials_with(|k| (k == "DISCORD_USER_ID").then(|| data.to_string()));
    }
});
