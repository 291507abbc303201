//! Section accumulator: the per-document state machine that groups scanned
//! lines into sections and flushes a record at every heading boundary.
//!
//! Rules are tried in strict priority order for each line:
//!
//! 1. level-1 heading that may start here: flush, open a new section
//! 2. level-2 heading: flush, the heading line starts the new content
//! 3. paragraph start: replace the content buffer without flushing
//! 4. ordinary line in an open section: extend the heading or the content
//! 5. ordinary line before any level-1 heading: headerless content or dropped
//!
//! A level-1 match that may not start a heading falls through to rule 2.

use crate::config::DocumentConfig;
use crate::rules::heading::{match_heading, HeadingGates};
use crate::rules::normalizer::build_record;
use crate::rules::scanner::LineScanner;
use crate::types::{DocumentMetadata, RawLine, Record, ScanEvent};

/// Mutable parse state of one document. Empty strings mean "unset".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    pub current_page: u32,
    pub h1_text: String,
    pub h1_number: String,
    pub h2_text: String,
    pub h2_number: String,
    pub content: String,
    /// Page in effect when the current content buffer began
    pub content_start_page: u32,
    pub start_of_new_paragraph: bool,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            current_page: 1,
            h1_text: String::new(),
            h1_number: String::new(),
            h2_text: String::new(),
            h2_number: String::new(),
            content: String::new(),
            content_start_page: 1,
            start_of_new_paragraph: true,
        }
    }
}

impl ParserState {
    /// Replace the content buffer with `line`, starting on the current page.
    fn start_content(&mut self, line: &str) {
        self.content = line.to_string();
        self.content_start_page = self.current_page;
    }
}

/// Consumes scan events for one document and collects its records.
pub struct SectionAccumulator<'a> {
    config: &'a DocumentConfig,
    metadata: &'a DocumentMetadata,
    state: ParserState,
    records: Vec<Record>,
    finished: bool,
}

impl<'a> SectionAccumulator<'a> {
    pub fn new(config: &'a DocumentConfig, metadata: &'a DocumentMetadata) -> Self {
        Self {
            config,
            metadata,
            state: ParserState::default(),
            records: Vec::new(),
            finished: false,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// True once the end of the document has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one scan event. Events after the end of the document are ignored.
    pub fn push(&mut self, event: ScanEvent) {
        if self.finished {
            return;
        }

        match event {
            ScanEvent::Blank => {
                self.state.start_of_new_paragraph = true;
                if !self.state.content.is_empty() {
                    self.state.content.push('\n');
                }
            }
            ScanEvent::Line(line) => self.on_line(line),
            ScanEvent::EndOfDocument => {
                self.flush();
                self.finished = true;
            }
        }
    }

    /// Records emitted so far, flushing the open section if the end of the
    /// document was never pushed.
    pub fn finish(mut self) -> Vec<Record> {
        if !self.finished {
            self.push(ScanEvent::EndOfDocument);
        }
        self.records
    }

    fn flush(&mut self) {
        match build_record(&self.state, self.config, self.metadata) {
            Ok(record) => self.records.push(record),
            Err(reason) => log::debug!("Previous section not output ({reason})"),
        }
    }

    fn on_line(&mut self, line: RawLine) {
        let state = &mut self.state;
        if line.is_page_break {
            state.current_page = line.page;
            state.start_of_new_paragraph = true;
        }

        let gates = HeadingGates::evaluate(self.config, line.is_bold, state.start_of_new_paragraph);
        let text = line.text;

        if let Some(h1) = match_heading(&self.config.h1, &text) {
            log::debug!(
                "H1 match: \"{}\" [start ok = {}]",
                h1.text,
                gates.h1_start_ok
            );
            if gates.h1_start_ok {
                self.flush();
                let state = &mut self.state;
                state.h1_text = h1.text;
                state.h1_number = h1.number;
                state.h2_text.clear();
                state.h2_number.clear();
                state.start_content("");
                state.start_of_new_paragraph = false;
                return;
            }
        }

        if let Some(h2) = self.config.h2.as_ref().and_then(|p| match_heading(p, &text)) {
            log::debug!("H2 match: \"{}\"", h2.text);
            self.flush();
            let state = &mut self.state;
            state.h2_text = h2.text;
            state.h2_number = h2.number;
            state.start_content(&text);
            state.start_of_new_paragraph = false;
            return;
        }

        let state = &mut self.state;
        if self
            .config
            .paragraph
            .as_ref()
            .is_some_and(|p| p.is_match(&text))
        {
            log::debug!("P match: \"{}\"", text);
            state.start_content(&text);
            state.start_of_new_paragraph = false;
            return;
        }

        if !state.h1_text.is_empty() {
            if state.h2_text.is_empty() && state.content.is_empty() {
                if gates.h1_continuation_ok {
                    state.h1_text.push(' ');
                    state.h1_text.push_str(&text);
                    log::debug!("H1 continued: \"{}\"", state.h1_text);
                } else {
                    state.start_content(&text);
                }
            } else {
                state.content.push(' ');
                state.content.push_str(&text);
            }
            state.start_of_new_paragraph = false;
        } else if self.config.output_headerless_sections {
            if state.content.is_empty() {
                state.start_content(&text);
            } else {
                state.content.push(' ');
                state.content.push_str(&text);
            }
            state.start_of_new_paragraph = false;
        }
    }
}

/// Parse a whole extracted text into records.
pub fn parse_text(
    text: &str,
    config: &DocumentConfig,
    metadata: &DocumentMetadata,
) -> Vec<Record> {
    let mut accumulator = SectionAccumulator::new(config, metadata);
    for event in LineScanner::new(text) {
        accumulator.push(event);
    }
    accumulator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FamilyRules;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            path: "data/x.pdf".to_string(),
            title: "X".to_string(),
            date: "2020-01-01".to_string(),
        }
    }

    fn satzungen() -> DocumentConfig {
        DocumentConfig::from_rules(&FamilyRules::satzungen()).unwrap()
    }

    fn line(text: &str, bold: bool) -> ScanEvent {
        ScanEvent::Line(RawLine {
            text: text.to_string(),
            is_bold: bold,
            is_page_break: false,
            page: 1,
        })
    }

    #[test]
    fn test_initial_state() {
        let state = ParserState::default();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.content_start_page, 1);
        assert!(state.start_of_new_paragraph);
    }

    #[test]
    fn test_h1_opens_section_and_clears_paragraph_flag() {
        let config = satzungen();
        let meta = metadata();
        let mut acc = SectionAccumulator::new(&config, &meta);
        acc.push(line("§ 2 Ziele", true));
        assert_eq!(acc.state().h1_text, "§ 2 Ziele");
        assert_eq!(acc.state().h1_number, "2");
        assert!(!acc.state().start_of_new_paragraph);
    }

    #[test]
    fn test_non_bold_h1_falls_through_to_content() {
        let config = satzungen();
        let meta = metadata();
        let mut acc = SectionAccumulator::new(&config, &meta);
        acc.push(line("§ 2 Ziele", true));
        acc.push(line("Der Text.", false));
        acc.push(line("§ 5 gilt entsprechend.", false));
        assert_eq!(acc.state().h1_text, "§ 2 Ziele");
        assert_eq!(acc.state().content, "Der Text. § 5 gilt entsprechend.");

        let records = acc.finish();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_bold_continuation_extends_h1() {
        let config = satzungen();
        let meta = metadata();
        let mut acc = SectionAccumulator::new(&config, &meta);
        acc.push(line("§ 3 Prüfungs-", true));
        acc.push(line("ausschuss", true));
        assert_eq!(acc.state().h1_text, "§ 3 Prüfungs- ausschuss");
        assert!(acc.state().content.is_empty());
    }

    #[test]
    fn test_blank_line_appends_newline_only_to_content() {
        let config = satzungen();
        let meta = metadata();
        let mut acc = SectionAccumulator::new(&config, &meta);
        acc.push(ScanEvent::Blank);
        assert!(acc.state().content.is_empty());

        acc.push(line("§ 1 Zweck", true));
        acc.push(line("Erster Satz.", false));
        acc.push(ScanEvent::Blank);
        assert_eq!(acc.state().content, "Erster Satz.\n");
        assert!(acc.state().start_of_new_paragraph);
    }

    #[test]
    fn test_dropped_leading_line_keeps_paragraph_flag() {
        let mut rules = FamilyRules::satzungen();
        rules.h1_must_start_paragraph = true;
        let config = DocumentConfig::from_rules(&rules).unwrap();
        let meta = metadata();
        let mut acc = SectionAccumulator::new(&config, &meta);
        acc.push(line("Präambel", false));
        assert!(acc.state().start_of_new_paragraph);
        assert!(acc.state().content.is_empty());
    }

    #[test]
    fn test_events_after_end_are_ignored() {
        let config = satzungen();
        let meta = metadata();
        let mut acc = SectionAccumulator::new(&config, &meta);
        acc.push(line("§ 1 Zweck", true));
        acc.push(line("Text.", false));
        acc.push(ScanEvent::EndOfDocument);
        assert!(acc.is_finished());
        acc.push(line("§ 2 Danach", true));
        acc.push(line("Mehr.", false));
        assert_eq!(acc.finish().len(), 1);
    }

    #[test]
    fn test_page_break_sets_content_start_page() {
        let config = satzungen();
        let records = parse_text(
            "\x01§ 1 Zweck\nSatz auf Seite eins.\n\x0c(1) Absatz auf Seite zwei.\n\x0c\x0c\n",
            &config,
            &metadata(),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].page_number, 1);
        assert_eq!(records[1].page_number, 2);
        assert_eq!(records[1].h2_text, "(1)");
    }
}
