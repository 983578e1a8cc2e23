//! Tab-separated alignment report, one line per alignment.
//!
//! Columns: qseqid sseqid pident length mismatch gapopen qstart qend sstart
//! send evalue bitscore. Coordinates are written 1-based.

use std::io::{self, Write};

use anyhow::Result;

use crate::algorithm::search::AlignmentVisitor;
use crate::common::Alignment;
use crate::sequence::SequenceDatabase;

pub const TABULAR_FIELDS: &str =
    "query id, subject id, % identity, alignment length, mismatches, gap opens, q. start, q. end, s. start, s. end, evalue, bit score";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabularStyle {
    /// Plain lines
    #[default]
    Plain,
    /// Lines preceded by `#` comment blocks per query
    Commented,
}

/// Write `value` in scientific notation with a signed, two-digit exponent
/// (`1.00e-05`, `3e-120`).
fn format_scientific(value: f64, precision: usize) -> String {
    let raw = format!("{:.*e}", precision, value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exponent.trim_start_matches('+')),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// E-value with the precision ladder of tabular BLAST reports.
pub fn format_evalue(evalue: f64) -> String {
    if evalue < 1.0e-180 {
        "0.0".to_string()
    } else if evalue < 0.0009 {
        format_scientific(evalue, 2)
    } else if evalue < 0.1 {
        format!("{:.3}", evalue)
    } else if evalue < 1.0 {
        format!("{:.2}", evalue)
    } else if evalue < 10.0 {
        format!("{:.1}", evalue)
    } else {
        format!("{:.0}", evalue)
    }
}

pub fn format_bit_score(bit_score: f64) -> String {
    if bit_score > 99999.0 {
        format_scientific(bit_score, 3)
    } else if bit_score > 99.9 {
        format!("{:.0}", bit_score)
    } else {
        format!("{:.1}", bit_score)
    }
}

/// Write one alignment line.
pub fn write_alignment<W: Write>(
    writer: &mut W,
    query_id: &str,
    subject_id: &str,
    a: &Alignment,
) -> io::Result<()> {
    writeln!(
        writer,
        "{}\t{}\t{:.3}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        query_id,
        subject_id,
        a.stats.identity(),
        a.stats.length,
        a.stats.mismatches,
        a.stats.gap_opens,
        a.q_start + 1,
        a.q_end + 1,
        a.s_start + 1,
        a.s_end + 1,
        format_evalue(a.evalue),
        format_bit_score(a.bit_score)
    )
}

/// [`AlignmentVisitor`] streaming a container into a tabular report.
pub struct TabularWriter<'d, W: Write> {
    writer: W,
    queries: &'d SequenceDatabase,
    subjects: &'d SequenceDatabase,
    style: TabularStyle,
    current_query: Option<u32>,
    pending: Vec<String>,
    written: usize,
}

impl<'d, W: Write> TabularWriter<'d, W> {
    pub fn new(writer: W, queries: &'d SequenceDatabase, subjects: &'d SequenceDatabase, style: TabularStyle) -> Self {
        Self {
            writer,
            queries,
            subjects,
            style,
            current_query: None,
            pending: Vec::new(),
            written: 0,
        }
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn flush_query_block(&mut self) -> io::Result<()> {
        let Some(query) = self.current_query.take() else {
            return Ok(());
        };
        if self.style == TabularStyle::Commented {
            writeln!(self.writer, "# Query: {}", self.queries.id(query as usize).unwrap_or("?"))?;
            writeln!(self.writer, "# Fields: {}", TABULAR_FIELDS)?;
            writeln!(self.writer, "# {} hits found", self.pending.len())?;
        }
        for line in self.pending.drain(..) {
            self.writer.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> AlignmentVisitor for TabularWriter<'_, W> {
    fn visit_query(&mut self, query: u32) -> Result<()> {
        self.flush_query_block()?;
        self.current_query = Some(query);
        Ok(())
    }

    fn visit_alignment(&mut self, alignment: &Alignment) -> Result<()> {
        let mut line = Vec::with_capacity(128);
        write_alignment(
            &mut line,
            self.queries.id(alignment.query as usize).unwrap_or("?"),
            self.subjects.id(alignment.subject as usize).unwrap_or("?"),
            alignment,
        )?;
        self.pending.push(String::from_utf8_lossy(&line).into_owned());
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.flush_query_block()?;
        self.writer.flush()?;
        Ok(())
    }
}
