//! Record normalizer: turns the accumulator state at a flush into an output
//! record, or reports why the section is not emitted.

use crate::config::DocumentConfig;
use crate::rules::accumulator::ParserState;
use crate::rules::heading::numeral_to_number;
use crate::types::{DocumentMetadata, Record};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_HORIZONTAL: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref RE_LINE_BREAK: Regex = Regex::new(r"\s*\n\s*").unwrap();
    static ref RE_HYPHENATED: Regex = Regex::new(r"(\w\w)- ([a-zäöü]\w\w)").unwrap();
}

/// Separator that stands in for a paragraph break inside a TSV field.
pub const PARAGRAPH_SEPARATOR: &str = "   ";

/// Words after a hyphen that mark an elided compound ("Arbeit- und
/// Sozialrecht") rather than a line-break hyphenation.
const CONJUNCTIONS: [&str; 2] = ["und", "oder"];

/// Why a flushed section produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoContent,
    NoHeader,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContent => f.write_str("no content"),
            Self::NoHeader => f.write_str("no header"),
        }
    }
}

/// Build the record for the section held in `state`.
pub fn build_record(
    state: &ParserState,
    config: &DocumentConfig,
    metadata: &DocumentMetadata,
) -> Result<Record, SkipReason> {
    if is_blank_content(&state.content) && !config.output_empty_content_sections {
        return Err(SkipReason::NoContent);
    }
    if state.h1_text.is_empty() && !config.output_headerless_sections {
        return Err(SkipReason::NoHeader);
    }

    let mut content = normalize_content(&state.content);
    if config.join_hyphenated_words {
        content = join_hyphenated_words(&content);
    }

    Ok(Record {
        path: metadata.path.clone(),
        page_number: state.content_start_page,
        title: metadata.title.clone(),
        date: metadata.date.clone(),
        h1_text: collapse_whitespace(&state.h1_text),
        h1_number: parse_numeral(&state.h1_number, &state.h1_text),
        h2_text: collapse_whitespace(&state.h2_text),
        h2_number: parse_numeral(&state.h2_number, &state.h2_text),
        content,
    })
}

fn parse_numeral(numeral: &str, heading: &str) -> Option<u32> {
    if numeral.is_empty() {
        return None;
    }
    let number = numeral_to_number(numeral);
    if number.is_none() {
        log::warn!(
            "Heading number \"{}\" of \"{}\" is not a number, leaving it empty",
            numeral,
            heading.trim()
        );
    }
    number
}

/// Empty or whitespace only.
pub fn is_blank_content(content: &str) -> bool {
    content.trim().is_empty()
}

/// Single spaces, no leading or trailing whitespace.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Single spaces within lines; line breaks (and the whitespace around
/// them) become `PARAGRAPH_SEPARATOR`.
pub fn normalize_content(content: &str) -> String {
    let collapsed = RE_HORIZONTAL.replace_all(content, " ");
    RE_LINE_BREAK
        .replace_all(collapsed.trim(), PARAGRAPH_SEPARATOR)
        .into_owned()
}

/// Join words split by a hyphen at a line end ("inter- essant"), unless the
/// second fragment starts with a conjunction.
pub fn join_hyphenated_words(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(caps) = RE_HYPHENATED.captures_at(text, search) {
        let (Some(whole), Some(left), Some(right)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };

        let tail = &text[right.start()..];
        if CONJUNCTIONS.iter().any(|word| tail.starts_with(word)) {
            // A match may still start one character later
            search = whole.start() + text[whole.start()..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        joined.push_str(&text[copied..whole.start()]);
        joined.push_str(left.as_str());
        joined.push_str(right.as_str());
        copied = whole.end();
        search = whole.end();
    }

    joined.push_str(&text[copied..]);
    joined
}

/// Title column: `#` removed.
pub fn sanitize_title(title: &str) -> String {
    title.replace('#', "")
}

/// Path column: `#` percent-encoded.
pub fn encode_path(path: &str) -> String {
    path.replace('#', "%23")
}
