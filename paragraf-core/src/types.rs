use serde::{Deserialize, Serialize};

/// Title used when the family's title pattern does not match the path.
pub const NO_TITLE: &str = "NO_TITLE";
/// Date used when the family's date pattern does not match the path.
pub const NO_DATE: &str = "NO_DATE";

// ===== SCANNER OUTPUT =====

/// One logical line of extracted text after control-marker processing.
///
/// `text` is already cleaned: whitespace runs are single spaces and no
/// control bytes remain. The flags carry what the stripped markers said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub text: String,
    /// Line started with the bold marker.
    pub is_bold: bool,
    /// Line started with a page-break marker (the page counter was bumped).
    pub is_page_break: bool,
    /// Page number in effect for this line (1-indexed).
    pub page: u32,
}

/// What the line scanner reports for each raw input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Blank line: paragraph boundary.
    Blank,
    /// A text line (possibly empty after a page-break marker).
    Line(RawLine),
    /// End-of-document marker, or end of input. Nothing follows.
    EndOfDocument,
}

// ===== DOCUMENT METADATA =====

/// Per-document fields copied into every record of that document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Value of the `path` column (already `#`-encoded).
    pub path: String,
    /// Title from the filename (`#` removed), or `NO_TITLE`.
    pub title: String,
    /// Date from the filename, or `NO_DATE`.
    pub date: String,
}

// ===== RECORDS =====

/// One output row: a piece of content with the headers it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub path: String,
    /// Page on which the content began.
    pub page_number: u32,
    pub title: String,
    pub date: String,
    pub h1_text: String,
    /// Numeric value of the level-1 heading numeral, when it has one.
    pub h1_number: Option<u32>,
    pub h2_text: String,
    pub h2_number: Option<u32>,
    pub content: String,
}

impl Record {
    /// Fields in TSV column order: path, page, title, date, h1, h2, text.
    pub fn tsv_fields(&self) -> [String; 7] {
        [
            self.path.clone(),
            self.page_number.to_string(),
            self.title.clone(),
            self.date.clone(),
            self.h1_text.clone(),
            self.h2_text.clone(),
            self.content.clone(),
        ]
    }

    pub fn to_tsv_row(&self) -> String {
        self.tsv_fields().join("\t")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_row_has_seven_columns_in_order() {
        let record = Record {
            path: "data/x.pdf".to_string(),
            page_number: 3,
            title: "Ordnung".to_string(),
            date: "2021-01-01".to_string(),
            h1_text: "§ 2 Ziele".to_string(),
            h1_number: Some(2),
            h2_text: "(1)".to_string(),
            h2_number: Some(1),
            content: "(1) Text.".to_string(),
        };

        assert_eq!(
            record.to_tsv_row(),
            "data/x.pdf\t3\tOrdnung\t2021-01-01\t§ 2 Ziele\t(1)\t(1) Text."
        );
    }
}
