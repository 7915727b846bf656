#![no_main]

use fgl_ide::Document;
use libfuzzer_sys::fuzz_target;
use text_size::TextSize;

const MAX_SOURCE_BYTES: usize = 8192;

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fn source_offset(seed: u8, source: &str) -> TextSize {
    if source.is_empty() {
        return TextSize::from(0);
    }
    let mut offset = usize::from(seed) % source.len();
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    TextSize::from(offset as u32)
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let source = decode_source(&data[1..]);
    let tree = fgl_syntax::parse(&source);
    assert_eq!(tree.source(), source);
    for diagnostic in tree.diagnostics() {
        assert!(diagnostic.line >= 1 && diagnostic.column >= 1);
        assert!(usize::from(diagnostic.range.end()) <= source.len());
    }
    if let Some(root) = tree.root() {
        assert!(usize::from(root.range().end()) <= source.len());
        for node in root.descendants() {
            assert!(root.range().contains_range(node.range()) || node.range().is_empty());
        }
    }

    // Wrapped in a main block so statement-level input reaches deeper rules.
    let wrapped = format!("MAIN\n{source}\nEND MAIN\n");
    let document = Document::new();
    let first = document.parse(&wrapped);
    let second = document.parse(&wrapped);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    let _ = document.completion_candidates(source_offset(data[0], &wrapped));
    let _ = document.global_variable_names();
});
