//! Lossy-Counting collector for most-common-element statistics.
//!
//! Runs the Lossy Counting algorithm (Manku & Motwani, VLDB 2002) over the
//! short grams (1..=3 characters) of sampled rows and produces the bounded
//! MCELEM table the Markov selectivity estimator consumes.
//!
//! With bucket width `w`, every tracked gram's count is exact from its
//! insertion bucket onward: the true count is underestimated by at most
//! `delta <= tokens / w`. The final cutoff `9 * tokens / w` drops entries
//! whose estimate cannot distinguish them from pruning noise, and the
//! survivors are truncated to the target table size by descending count.
//!
//! Counts are per-row document frequencies (the same touched-list dedup as
//! the exact collector), so dividing by the non-null row count turns them
//! into the per-row match probabilities the estimator expects.

use ahash::AHashMap;

use crate::selectivity::{ColumnStats, McelemStats, MAX_STAT_Q};
use crate::stats::for_each_qgram;

/// Counter snapshot for observing a collection run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LossyStats {
    /// Bucket width `w` derived from the target table size.
    pub bucket_width: i64,
    /// Deduplicated gram observations processed so far.
    pub tokens: i64,
    /// Bucket boundaries crossed so far.
    pub buckets_crossed: i64,
    /// Entries removed by boundary pruning.
    pub entries_pruned: u64,
    /// Entries currently tracked.
    pub live_entries: usize,
}

#[derive(Clone, Copy, Debug)]
struct LossySlot {
    count: i64,
    delta: i32,
    seen: bool,
}

/// Streaming Lossy-Counting collector over rows of a text column.
pub struct TopGramCollector {
    target: usize,
    bucket_width: i64,
    b_current: i64,
    tokens: i64,
    rows: i64,
    null_rows: i64,
    total_width: u64,
    map: AHashMap<Box<[u8]>, u32>,
    slots: Vec<LossySlot>,
    free: Vec<u32>,
    touched: Vec<u32>,
    boundaries: Vec<usize>,
    pruned: u64,
    buckets_crossed: i64,
}

impl TopGramCollector {
    /// Creates a collector targeting at most `target` MCELEM entries.
    ///
    /// The bucket width `(target + 10) * 1000 / 7` comes from assuming a
    /// Zipfian gram distribution with the top ten entries acting as
    /// stopwords; it bounds the tracking table at roughly
    /// `1000 * (target + 10)` entries.
    #[must_use]
    pub fn new(target: usize) -> Self {
        let target = target.max(1);
        Self {
            target,
            bucket_width: (target as i64 + 10) * 1000 / 7,
            b_current: 1,
            tokens: 0,
            rows: 0,
            null_rows: 0,
            total_width: 0,
            map: AHashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            touched: Vec::new(),
            boundaries: Vec::new(),
            pruned: 0,
            buckets_crossed: 0,
        }
    }

    /// Current counter snapshot.
    #[must_use]
    pub fn stats(&self) -> LossyStats {
        LossyStats {
            bucket_width: self.bucket_width,
            tokens: self.tokens,
            buckets_crossed: self.buckets_crossed,
            entries_pruned: self.pruned,
            live_entries: self.map.len(),
        }
    }

    /// Feeds one sampled row (or NULL) into the collector.
    pub fn push_row(&mut self, row: Option<&[u8]>) {
        self.rows += 1;
        let Some(row) = row else {
            self.null_rows += 1;
            return;
        };
        self.total_width += row.len() as u64;

        let prev_tokens = self.tokens;
        let mut boundaries = std::mem::take(&mut self.boundaries);
        for_each_qgram(row, 1, MAX_STAT_Q, &mut boundaries, |gram| self.observe(gram));
        self.boundaries = boundaries;

        for &slot in &self.touched {
            self.slots[slot as usize].seen = false;
        }
        self.touched.clear();

        let crossed = self.tokens / self.bucket_width - prev_tokens / self.bucket_width;
        if crossed != 0 {
            self.prune();
            self.b_current += crossed;
            self.buckets_crossed += crossed;
        }
    }

    fn observe(&mut self, gram: &[u8]) {
        if let Some(&slot) = self.map.get(gram) {
            let entry = &mut self.slots[slot as usize];
            if !entry.seen {
                entry.count += 1;
                entry.seen = true;
                self.touched.push(slot);
                self.tokens += 1;
            }
            return;
        }
        let fresh = LossySlot {
            count: 1,
            delta: (self.b_current - 1) as i32,
            seen: true,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = fresh;
                slot
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(fresh);
                slot
            }
        };
        self.map.insert(gram.into(), slot);
        self.touched.push(slot);
        self.tokens += 1;
    }

    /// Removes every entry with `count + delta <= b_current`, returning its
    /// slot to the free list.
    fn prune(&mut self) {
        let slots = &self.slots;
        let free = &mut self.free;
        let pruned = &mut self.pruned;
        let b_current = self.b_current;
        self.map.retain(|_, &mut slot| {
            let entry = slots[slot as usize];
            let keep = entry.count + entry.delta as i64 > b_current;
            if !keep {
                free.push(slot);
                *pruned += 1;
            }
            keep
        });
    }

    /// Finalizes the analyze pass into column statistics.
    ///
    /// All-null (or empty) samples produce statistics with a null fraction
    /// of 1.0 and no MCELEM table.
    #[must_use]
    pub fn finish(self) -> ColumnStats {
        let Self {
            target,
            bucket_width,
            tokens,
            rows,
            null_rows,
            total_width,
            map,
            slots,
            ..
        } = self;

        let nonnull = rows - null_rows;
        if nonnull <= 0 {
            return ColumnStats {
                null_frac: 1.0,
                avg_width: 0.0,
                mcelem: None,
            };
        }
        let null_frac = null_rows as f32 / rows as f32;
        let avg_width = total_width as f32 / nonnull as f32;

        // Cutoff (s - epsilon) * N with epsilon = s / 10 and w = 1 / epsilon.
        let cutoff = 9 * tokens / bucket_width;
        let mut track: Vec<(Box<[u8]>, i64)> = map
            .into_iter()
            .map(|(gram, slot)| (gram, slots[slot as usize].count))
            .filter(|&(_, count)| count > cutoff)
            .collect();
        if track.is_empty() {
            return ColumnStats {
                null_frac,
                avg_width,
                mcelem: None,
            };
        }

        let mut min_count = i64::MAX;
        let mut max_count = 0i64;
        for &(_, count) in &track {
            min_count = min_count.min(count);
            max_count = max_count.max(count);
        }

        if track.len() > target {
            track.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            min_count = track[target - 1].1;
            track.truncate(target);
        }
        track.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let freqs = track
            .iter()
            .map(|&(_, count)| count as f32 / nonnull as f32)
            .collect();
        let grams = track.into_iter().map(|(gram, _)| gram).collect();

        ColumnStats {
            null_frac,
            avg_width,
            mcelem: Some(McelemStats::new(
                grams,
                freqs,
                min_count as f32 / nonnull as f32,
                max_count as f32 / nonnull as f32,
            )),
        }
    }
}
