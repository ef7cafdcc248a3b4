//! Plain-text extraction from (X)HTML chapter documents.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::epub::package::{local_name, resolve_entity};

/// Elements whose entire subtree is non-content.
const SKIPPED_ELEMENTS: [&[u8]; 6] = [b"head", b"script", b"style", b"nav", b"header", b"footer"];

/// HTML void elements. Chapters served as `text/html` leave these unclosed
/// (`<meta charset="utf-8">`, `<br>`), so the parser reports them as start
/// tags with no matching end tag; they must not affect subtree depth.
const VOID_ELEMENTS: [&[u8]; 13] = [
    b"meta", b"link", b"br", b"hr", b"img", b"input", b"base", b"area", b"col", b"embed",
    b"source", b"track", b"wbr",
];

/// Convert one chapter document into normalized plain text.
///
/// Streams through the markup collecting text nodes in document order,
/// skipping non-content subtrees, resolving character entities, then
/// collapsing all whitespace runs to single spaces. Malformed markup is not
/// an error: the scan stops at the first unrecoverable parse failure and
/// returns whatever text was collected up to that point. An empty result
/// means "no text", which callers treat as a skippable chapter.
pub fn extract_text(markup: &str) -> String {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut out = String::new();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if skip_depth > 0 {
                    if !is_void(local) {
                        skip_depth += 1;
                    }
                } else if is_skipped(local) {
                    skip_depth += 1;
                } else {
                    out.push(' ');
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if skip_depth > 0 {
                    if !is_void(local) {
                        skip_depth -= 1;
                    }
                } else {
                    out.push(' ');
                }
            }
            Ok(Event::Empty(_)) => {
                if skip_depth == 0 {
                    out.push(' ');
                }
            }
            Ok(Event::Text(e)) if skip_depth == 0 => {
                out.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) if skip_depth == 0 => {
                out.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if skip_depth == 0 => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    out.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "stopping extraction on malformed markup");
                break;
            }
            _ => {}
        }
    }

    collapse_whitespace(&out)
}

fn is_skipped(local: &[u8]) -> bool {
    SKIPPED_ELEMENTS
        .iter()
        .any(|skipped| local.eq_ignore_ascii_case(skipped))
}

fn is_void(local: &[u8]) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| local.eq_ignore_ascii_case(void))
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
