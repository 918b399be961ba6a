#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    // Arbitrary config strings must decode or error, never panic
    if let Ok(bytes) = shield_preflight::decode_payload(input) {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        assert_eq!(bytes.len() * 2, digits.len());
        assert_eq!(hex::encode(&bytes), digits.to_ascii_lowercase());
    }

    let _ = shield_preflight::PreflightConfig::from_json(input);
});
