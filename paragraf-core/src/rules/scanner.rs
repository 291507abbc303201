//! Control-marker line scanner.
//!
//! Splits extracted text into lines and turns the markers of the input
//! text contract into flags:
//!
//! ```text
//! \x0c<line>   first line of a new page
//! \x0c\x0c     end of document
//! \x01<line>   line in bold face (after an optional \x0c)
//! <blank>      paragraph boundary
//! ```

use crate::types::{RawLine, ScanEvent};
use lazy_static::lazy_static;
use regex::Regex;

/// Form feed: starts a new page.
pub const PAGE_BREAK: char = '\x0c';
/// Start of heading: line is in bold face.
pub const BOLD: char = '\x01';
/// A line consisting of exactly this marks the end of the document.
pub const END_OF_DOCUMENT: &str = "\x0c\x0c";

lazy_static! {
    // \x1c-\x1f are whitespace for Python-style `isspace` but not for `\s`.
    static ref RE_WHITESPACE: Regex = Regex::new(r"[\s\x1c-\x1f]+").unwrap();
    static ref RE_CONTROL: Regex = Regex::new(r"[\x00-\x1f]").unwrap();
}

/// Iterator over the scan events of one extracted text.
///
/// Always yields exactly one `ScanEvent::EndOfDocument` as its last item,
/// synthesizing it when the text ends without the marker.
pub struct LineScanner<'a> {
    lines: std::str::Split<'a, char>,
    page: u32,
    finished: bool,
}

impl<'a> LineScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n'),
            page: 1,
            finished: false,
        }
    }
}

impl Iterator for LineScanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        if self.finished {
            return None;
        }

        let Some(line) = self.lines.next() else {
            log::debug!("End of input without end-of-document marker");
            self.finished = true;
            return Some(ScanEvent::EndOfDocument);
        };

        if is_blank(line) {
            return Some(ScanEvent::Blank);
        }

        let (line, is_page_break) = match line.strip_prefix(PAGE_BREAK) {
            Some(_) if line == END_OF_DOCUMENT => {
                log::debug!("End of document");
                self.finished = true;
                return Some(ScanEvent::EndOfDocument);
            }
            Some(rest) => {
                self.page += 1;
                log::debug!("Starting new page: {}", self.page);
                (rest, true)
            }
            None => (line, false),
        };

        Some(ScanEvent::Line(RawLine {
            text: clean_line(line),
            is_bold: line.starts_with(BOLD),
            is_page_break,
            page: self.page,
        }))
    }
}

/// Blank means empty or spaces only; a line of tabs is not blank.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ')
}

/// Collapse whitespace runs to one space, then drop the remaining control
/// bytes (markers included). Leading and trailing spaces are kept.
pub fn clean_line(line: &str) -> String {
    let collapsed = RE_WHITESPACE.replace_all(line, " ");
    RE_CONTROL.replace_all(&collapsed, "").into_owned()
}
