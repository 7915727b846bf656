#![no_main]

use fgl_syntax::{LineState, Token};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 4096;

fn texts(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

fuzz_target!(|data: &[u8]| {
    let capped = &data[..data.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped);

    let bulk = fgl_syntax::scan(&source);
    let mut previous_end = 0;
    for token in &bulk {
        let start = usize::from(token.range.start());
        let end = usize::from(token.range.end());
        assert!(start >= previous_end && end <= source.len());
        assert_eq!(&source[start..end], token.text.as_str());
        previous_end = end;
    }

    let mut state = LineState::NEUTRAL;
    for line in source.split('\n') {
        let scanned = fgl_syntax::scan_line(line, state);
        let again = fgl_syntax::scan_line(line, state);
        assert_eq!(scanned, again);
        assert!(texts(&scanned.tokens).len() <= line.len());
        state = scanned.state;
    }
});
