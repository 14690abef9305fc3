#![no_main]
use hushtex_log::tokenize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The tokenizer must never panic, and the concatenated literal text of
    // the tokens for a line must reconstruct the line exactly.
    let s = String::from_utf8_lossy(data);
    for line in s.lines() {
        let tokens = tokenize(line);
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, line);
    }
});
