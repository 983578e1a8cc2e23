use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::report::{TabularStyle, TabularWriter};
use crate::sequence::SequenceDatabase;

use super::args::SearchArgs;
use super::engine::SearchEngine;

/// Load both FASTA files, search, and write the tabular report.
pub fn run(args: SearchArgs) -> Result<()> {
    let query = Arc::new(SequenceDatabase::from_fasta(&args.query)?);
    let subject = Arc::new(SequenceDatabase::from_fasta(&args.subject)?);
    log::info!(
        "loaded {} query and {} subject sequences",
        query.len(),
        subject.len()
    );

    let mut engine = SearchEngine::new(args.to_params())?;
    if args.diagnostics {
        engine.set_diagnostics(true);
    }
    if args.verbose {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} seeds")
                .context("invalid progress template")?,
        );
        engine.set_progress(bar);
    }
    let _timer = args
        .timeout
        .map(|secs| engine.cancellation_token().cancel_after(Duration::from_secs(secs)));

    let mut output = engine.run(Arc::clone(&query), Arc::clone(&subject))?;
    if output.cancelled {
        log::warn!("search stopped early, the report holds partial results");
    }

    let style = if args.comments {
        TabularStyle::Commented
    } else {
        TabularStyle::Plain
    };
    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(File::create(path).with_context(|| format!("Failed to create {:?}", path))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = TabularWriter::new(BufWriter::new(sink), &query, &subject, style);
    output.container.accept(&mut writer)?;
    log::info!("wrote {} alignments", writer.written());
    Ok(())
}
