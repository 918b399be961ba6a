#![no_main]
use libfuzzer_sys::fuzz_target;
use shield_preflight::classifier::{
    batch_contains_initiation, classify, is_handshake_initiation, MessageKind,
    MESSAGE_INITIATION_SIZE,
};

fuzz_target!(|data: &[u8]| {
    // Must not panic on any input, including empty and 1–3 byte buffers
    let kind = classify(data);
    let init = is_handshake_initiation(data);

    // Both entry points must agree on initiations
    assert_eq!(init, kind == Some(MessageKind::Initiation));

    if init {
        assert!(data.len() >= MESSAGE_INITIATION_SIZE);
        assert_eq!(&data[..4], &[1, 0, 0, 0]);
    }

    // Splitting the input into a batch: matches iff some chunk matches
    let chunks: Vec<Vec<u8>> = data.chunks(MESSAGE_INITIATION_SIZE).map(|c| c.to_vec()).collect();
    let expected = chunks.iter().any(|c| is_handshake_initiation(c));
    assert_eq!(batch_contains_initiation(&chunks), expected);
});
