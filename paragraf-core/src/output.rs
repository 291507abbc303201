use crate::error::Error;
use crate::types::Record;
use anyhow::Result;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Header row of the TSV output
pub const TSV_HEADER: [&str; 7] = ["path", "page", "title", "date", "h1", "h2", "text"];

/// How records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tab-separated, header row first
    #[default]
    Tsv,
    /// One JSON object per line, with parsed heading numbers
    JsonLines,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::JsonLines => "jsonl",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "jsonl" | "json-lines" => Ok(Self::JsonLines),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Sink for the records of a whole run
pub trait RecordWriter {
    /// Called once before the first record
    fn write_header(&mut self) -> Result<()>;
    fn write_record(&mut self, record: &Record) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

pub struct TsvWriter<W: Write> {
    out: W,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordWriter for TsvWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", TSV_HEADER.join("\t"))?;
        Ok(())
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        writeln!(self.out, "{}", record.to_tsv_row())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordWriter for JsonLinesWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.out, record).map_err(Error::from)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

pub fn writer_for<'a>(format: OutputFormat, out: Box<dyn Write + 'a>) -> Box<dyn RecordWriter + 'a> {
    match format {
        OutputFormat::Tsv => Box::new(TsvWriter::new(out)),
        OutputFormat::JsonLines => Box::new(JsonLinesWriter::new(out)),
    }
}
