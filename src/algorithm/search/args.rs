//! Command-line arguments for the protein search

use clap::Args;
use std::path::PathBuf;

use crate::config::{ScoringMatrix, SearchParams};

/// Command-line arguments for `lasp search` (protein vs protein)
#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(short, long)]
    pub query: PathBuf,
    #[arg(short, long)]
    pub subject: PathBuf,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(short, long, default_value_t = 10.0)]
    pub evalue: f64,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    #[arg(long, default_value = "BLOSUM62")]
    pub matrix: ScoringMatrix,
    #[arg(long, default_value_t = 11)]
    pub gap_open: i32,
    #[arg(long, default_value_t = 1)]
    pub gap_extend: i32,

    /// Seed length in residues
    #[arg(short = 'w', long, default_value_t = 4)]
    pub seed_span: usize,
    /// Residue classes used by seeds (first N of ARNDCQEGHILKMFPSTWYV)
    #[arg(long, default_value_t = 20)]
    pub seed_alphabet: usize,
    /// Fraction of the seed space to visit
    #[arg(long, default_value_t = 1.0)]
    pub seeds_use_ratio: f64,
    /// Per-seed occurrence cap on each side (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_seed_occurrences: usize,
    /// Keep the natural seed order instead of heaviest-first
    #[arg(long)]
    pub no_reorder: bool,

    #[arg(long, default_value_t = 22)]
    pub ungap_neighbourhood: usize,
    #[arg(long, default_value_t = 38)]
    pub ungap_threshold: i32,
    #[arg(long, default_value_t = 32)]
    pub small_gap_neighbourhood: usize,
    #[arg(long, default_value_t = 8)]
    pub band_width: usize,
    #[arg(long, default_value_t = 46)]
    pub small_gap_threshold: i32,

    #[arg(long, default_value_t = 20)]
    pub xdrop_ungapped: i32,
    #[arg(long, default_value_t = 38)]
    pub xdrop_gapped: i32,
    #[arg(long, default_value_t = 65)]
    pub xdrop_final: i32,

    /// Gate on per-query cutoff scores instead of per-candidate E-values
    #[arg(long)]
    pub cutoff_table: bool,
    /// Subject residues indexed at once (0 = all)
    #[arg(long, default_value_t = 20_000_000)]
    pub max_database_size: usize,
    /// Reject alignments overlapping a better one by at least this fraction
    #[arg(long)]
    pub overlap_fraction: Option<f64>,

    #[arg(long, default_value_t = 500)]
    pub max_target_seqs: usize,
    /// Alignments kept per query/subject pair (0 = all)
    #[arg(long, default_value_t = 0)]
    pub max_hsps: usize,
    /// Write `#` comment lines before each query block
    #[arg(long)]
    pub comments: bool,

    /// Stop the search after this many seconds, keeping what was found
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Show a progress bar
    #[arg(short, long)]
    pub verbose: bool,
    /// Log per-stage pipeline counters
    #[arg(long)]
    pub diagnostics: bool,
}

impl SearchArgs {
    pub fn to_params(&self) -> SearchParams {
        SearchParams {
            matrix: self.matrix,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
            seed_span: self.seed_span,
            seed_alphabet: self.seed_alphabet,
            seeds_use_ratio: self.seeds_use_ratio,
            max_occurrences_per_seed: self.max_seed_occurrences,
            reorder_seeds: !self.no_reorder,
            ungap_neighbourhood: self.ungap_neighbourhood,
            ungap_score_threshold: self.ungap_threshold,
            small_gap_neighbourhood: self.small_gap_neighbourhood,
            small_gap_band_width: self.band_width,
            small_gap_threshold: self.small_gap_threshold,
            xdrop_ungapped: self.xdrop_ungapped,
            xdrop_gapped: self.xdrop_gapped,
            xdrop_final: self.xdrop_final,
            evalue: self.evalue,
            use_cutoff_table: self.cutoff_table,
            max_database_size: self.max_database_size,
            num_threads: self.num_threads,
            overlap_fraction: self.overlap_fraction,
            max_hits_per_query: self.max_target_seqs,
            max_hsps_per_hit: self.max_hsps,
            ..SearchParams::default()
        }
    }
}
