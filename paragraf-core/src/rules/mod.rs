// Main rules module - the parsing pipeline for one extracted text:
// - scanner.rs: control markers to scan events
// - heading.rs: heading gates, heading matches and numerals
// - accumulator.rs: section state machine, flushes at heading boundaries
// - normalizer.rs: flushed state to output record

pub mod accumulator;
pub mod heading;
pub mod normalizer;
pub mod scanner;

pub use accumulator::{parse_text, ParserState, SectionAccumulator};
pub use heading::{numeral_to_number, HeadingGates, HeadingMatch};
pub use normalizer::SkipReason;
pub use scanner::LineScanner;
