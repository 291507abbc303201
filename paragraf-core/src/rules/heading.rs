//! Heading rule set: the gates that decide whether a line may open or
//! continue a level-1 heading, and extraction of heading text and number
//! from a pattern match.

use crate::config::DocumentConfig;
use regex::Regex;

/// Per-line permissions derived from the bold flag, the paragraph flag and
/// the family's level-1 policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingGates {
    /// Line may be a level-1 heading at all.
    pub h1_ok: bool,
    /// Line may extend the text of an open level-1 heading.
    pub h1_continuation_ok: bool,
    /// Line may start a new level-1 heading.
    pub h1_start_ok: bool,
}

impl HeadingGates {
    pub fn evaluate(config: &DocumentConfig, is_bold: bool, start_of_new_paragraph: bool) -> Self {
        let h1_ok = is_bold || !config.h1_must_be_bold;
        Self {
            h1_ok,
            h1_continuation_ok: h1_ok && !config.h1_single_line_only,
            h1_start_ok: h1_ok && (start_of_new_paragraph || !config.h1_must_start_paragraph),
        }
    }
}

/// Text and numeral captured by a heading pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    pub text: String,
    /// Raw numeral, empty when the pattern captures none.
    pub number: String,
}

/// Match `line` against a heading pattern.
///
/// The heading text is the `text` group, else group 1, else the whole
/// match; the numeral is the `number` group, else group 2, else empty.
pub fn match_heading(pattern: &Regex, line: &str) -> Option<HeadingMatch> {
    let caps = pattern.captures(line)?;
    let text = caps
        .name("text")
        .or_else(|| caps.get(1))
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default();
    let number = caps
        .name("number")
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default();

    Some(HeadingMatch {
        text: text.to_string(),
        number: number.to_string(),
    })
}

/// Normalize a heading numeral to its value: "3", "3a", "3." and "1.2"
/// (first component) are decimal, a single letter is its alphabet position
/// ("c" is 3), anything longer is read as a Roman numeral ("III", "iii").
pub fn numeral_to_number(numeral: &str) -> Option<u32> {
    let numeral = numeral.trim().trim_end_matches('.');
    if numeral.is_empty() {
        return None;
    }

    let first = numeral.split('.').next().unwrap_or(numeral);
    let digits: String = first.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let suffix = &first[digits.len()..];
        let plain_suffix = suffix.is_empty()
            || (suffix.chars().count() == 1 && suffix.chars().all(|c| c.is_ascii_lowercase()));
        return if plain_suffix { digits.parse().ok() } else { None };
    }

    let mut chars = numeral.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(c.to_ascii_lowercase() as u32 - 'a' as u32 + 1)
        }
        _ => roman_to_number(numeral),
    }
}

fn roman_to_number(numeral: &str) -> Option<u32> {
    let upper = numeral.chars().all(|c| c.is_ascii_uppercase());
    let lower = numeral.chars().all(|c| c.is_ascii_lowercase());
    if !upper && !lower {
        return None;
    }

    let values: Vec<i64> = numeral
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'I' => Some(1),
            'V' => Some(5),
            'X' => Some(10),
            'L' => Some(50),
            'C' => Some(100),
            'D' => Some(500),
            'M' => Some(1000),
            _ => None,
        })
        .collect::<Option<_>>()?;

    let mut total = 0i64;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total -= value,
            _ => total += value,
        }
    }
    u32::try_from(total).ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentConfig, FamilyRules};

    fn config(must_be_bold: bool, must_start_paragraph: bool, single_line: bool) -> DocumentConfig {
        let mut rules = FamilyRules::satzungen();
        rules.h1_must_be_bold = must_be_bold;
        rules.h1_must_start_paragraph = must_start_paragraph;
        rules.h1_single_line_only = single_line;
        DocumentConfig::from_rules(&rules).unwrap()
    }

    #[test]
    fn test_bold_required_for_h1() {
        let cfg = config(true, false, false);
        assert!(!HeadingGates::evaluate(&cfg, false, true).h1_ok);
        assert!(HeadingGates::evaluate(&cfg, true, false).h1_start_ok);
    }

    #[test]
    fn test_bold_not_required() {
        let cfg = config(false, false, false);
        let gates = HeadingGates::evaluate(&cfg, false, false);
        assert!(gates.h1_ok && gates.h1_start_ok && gates.h1_continuation_ok);
    }

    #[test]
    fn test_new_paragraph_requirement() {
        let cfg = config(true, true, false);
        assert!(!HeadingGates::evaluate(&cfg, true, false).h1_start_ok);
        // Blank line followed by a bold line
        assert!(HeadingGates::evaluate(&cfg, true, true).h1_start_ok);
    }

    #[test]
    fn test_single_line_blocks_continuation() {
        let cfg = config(true, false, true);
        let gates = HeadingGates::evaluate(&cfg, true, true);
        assert!(gates.h1_start_ok);
        assert!(!gates.h1_continuation_ok);
    }

    #[test]
    fn test_match_heading_uses_named_groups() {
        let cfg = config(true, false, false);
        let h1 = match_heading(&cfg.h1, "§ 14 Prüfungsausschuss").unwrap();
        assert_eq!(h1.text, "§ 14 Prüfungsausschuss");
        assert_eq!(h1.number, "14");

        let h2 = match_heading(cfg.h2.as_ref().unwrap(), " (3a) Der Ausschuss").unwrap();
        assert_eq!(h2.text, "(3a)");
        assert_eq!(h2.number, "3a");
    }

    #[test]
    fn test_match_heading_falls_back_to_numbered_groups() {
        let pattern = Regex::new(r"^(Teil\s+(\d+)).*$").unwrap();
        let found = match_heading(&pattern, "Teil 2 Prüfungen").unwrap();
        assert_eq!(found.text, "Teil 2");
        assert_eq!(found.number, "2");

        let bare = Regex::new(r"^Anhang").unwrap();
        let found = match_heading(&bare, "Anhang A").unwrap();
        assert_eq!(found.text, "Anhang");
        assert_eq!(found.number, "");
    }

    #[test]
    fn test_numeral_to_number() {
        assert_eq!(numeral_to_number("3"), Some(3));
        assert_eq!(numeral_to_number("3a"), Some(3));
        assert_eq!(numeral_to_number("12."), Some(12));
        assert_eq!(numeral_to_number("1.2"), Some(1));
        assert_eq!(numeral_to_number("c"), Some(3));
        assert_eq!(numeral_to_number("III"), Some(3));
        assert_eq!(numeral_to_number("iii"), Some(3));
        assert_eq!(numeral_to_number("XIV"), Some(14));
        assert_eq!(numeral_to_number(""), None);
        assert_eq!(numeral_to_number("§"), None);
        assert_eq!(numeral_to_number("Artikel"), None);
        assert_eq!(numeral_to_number("3abc"), None);
    }
}
