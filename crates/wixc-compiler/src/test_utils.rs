//! Test utilities and snapshot macros.

use std::sync::Once;

use crate::compile::{CompileOutput, Compiler};
use crate::document::Document;

static INIT: Once = Once::new();

/// Route `tracing` output to the test harness, once per process.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .with_target(false)
            .try_init();
    });
}

/// Wrap fragment content in a `Wix` root carrying the core namespace.
pub fn wix(body: &str) -> String {
    format!("<Wix xmlns=\"{}\">\n{body}\n</Wix>", crate::WXS_NAMESPACE)
}

/// Parse and compile with a default compiler.
pub fn compile(source: &str) -> CompileOutput {
    init_tracing();
    let document = Document::parse(source).expect("test input must be well-formed");
    Compiler::new()
        .compile(&document)
        .expect("test input must stay within the recursion limit")
}

/// Compile a document that must not produce errors; returns the dump with
/// synthesized identifiers redacted.
pub fn expect_valid(source: &str) -> String {
    let output = compile(source);
    assert!(
        output.is_success(),
        "expected no errors, got:\n{}",
        output.diagnostics()
    );
    redact(&output.intermediate().dump())
}

/// Replace the hash part of synthesized identifiers (`rba` + 32 hex digits)
/// with `*`, keeping the prefix.
pub fn redact(text: &str) -> String {
    fn flush(out: &mut String, word: &mut String) {
        let split = word.len().saturating_sub(32);
        let (prefix, hash) = word.split_at(split);
        let synthesized = (2..=3).contains(&prefix.len())
            && prefix.bytes().all(|b| b.is_ascii_lowercase())
            && hash.len() == 32
            && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if synthesized {
            out.push_str(prefix);
            out.push('*');
        } else {
            out.push_str(word);
        }
        word.clear();
    }

    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            word.push(c);
        } else {
            flush(&mut out, &mut word);
            out.push(c);
        }
    }
    flush(&mut out, &mut word);
    out
}

/// One `severity: message` line per diagnostic, without positions.
pub fn messages(output: &CompileOutput) -> String {
    output
        .diagnostics()
        .iter()
        .map(|d| format!("{}: {}", d.severity(), d.message()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compile a document that must produce errors; returns the diagnostics.
pub fn expect_invalid(source: &str) -> String {
    let output = compile(source);
    assert!(
        !output.is_success(),
        "expected errors, got:\n{}",
        output.intermediate().dump()
    );
    assert!(
        output.intermediate().is_empty(),
        "a failed compile must not leave an intermediate behind"
    );
    messages(&output)
}

/// Snapshot test for the intermediate dump of a valid document.
#[macro_export]
macro_rules! shot_intermediate {
    ($body:literal, @$snapshot:literal) => {{
        let source = $crate::test_utils::wix(indoc::indoc!($body).trim());
        let output = $crate::test_utils::expect_valid(&source);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Snapshot test for the diagnostics of an invalid document.
#[macro_export]
macro_rules! shot_error {
    ($body:literal, @$snapshot:literal) => {{
        let source = $crate::test_utils::wix(indoc::indoc!($body).trim());
        let output = $crate::test_utils::expect_invalid(&source);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}
