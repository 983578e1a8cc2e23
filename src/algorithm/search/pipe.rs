//! One serial pipeline instance: hit source plus the three extension stages.
//!
//! Each worker drives exactly one pipe end to end. The Hit is reused for
//! every seed batch, and the stage objects keep their scratch buffers across
//! batches.

use crate::dispatch::Command;

use super::context::SearchContext;
use super::full_gap::FullGapExtender;
use super::hit::{Hit, PairCursor};
use super::hit_source::HitSource;
use super::small_gap::SmallGapExtender;
use super::ungapped::UngapExtender;

pub struct Pipe<'a> {
    source: HitSource<'a>,
    ctx: &'a SearchContext<'a>,
    ungapped: UngapExtender,
    small_gap: SmallGapExtender,
    full_gap: FullGapExtender,
    hit: Hit<'a>,
}

impl<'a> Pipe<'a> {
    /// The stages read fixed windows around every occurrence, so the
    /// source always prefetches the layout's neighborhood.
    pub fn new(mut source: HitSource<'a>, ctx: &'a SearchContext<'a>) -> Self {
        source.set_neighborhood(ctx.layout.neighborhood());
        Self {
            source,
            ctx,
            ungapped: UngapExtender::new(ctx),
            small_gap: SmallGapExtender::new(ctx),
            full_gap: FullGapExtender::new(ctx),
            hit: Hit::new(),
        }
    }

    /// Drain the source. Stops early once the run is cancelled.
    pub fn run(&mut self) {
        let ctx = self.ctx;
        while !ctx.cancel.is_cancelled() && self.source.next_hit(&mut self.hit) {
            let mut cursor = PairCursor::default();
            loop {
                let more = self.ungapped.next_batch(&mut self.hit, &mut cursor, ctx);
                if !self.hit.pairs.is_empty() {
                    self.small_gap.filter(&mut self.hit, ctx);
                }
                if !self.hit.pairs.is_empty() {
                    self.full_gap.extend(&self.hit, ctx);
                }
                if !more || ctx.cancel.is_cancelled() {
                    break;
                }
            }
        }
    }
}

impl Command for Pipe<'_> {
    fn execute(&mut self) {
        self.run();
    }
}
