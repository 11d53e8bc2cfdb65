//! Exact-threshold frequent-gram aggregate.
//!
//! Streams documents and counts, for every q-gram of every word, the number
//! of documents containing it (document frequency, not term frequency).
//! Finalization keeps the grams whose count reaches
//! `floor(threshold * total_docs)` and returns them in ascending byte order,
//! ready for [`GramTable::build`](crate::gram_table::GramTable::build).
//!
//! # Counting discipline
//! A gram's count moves at most once per document. The first observation in
//! a document marks the gram's slot `seen` and records it on a touched list;
//! repeat observations in the same document are ignored; after the document,
//! only touched slots have their mark cleared.
//!
//! NULL documents participate in `total_docs` (the threshold is a fraction
//! of all input rows) but contribute no grams.

use ahash::AHashMap;

use crate::errors::StatsError;
use crate::extract::sort_unique;
use crate::gram_table::GramBounds;
use crate::stats::for_each_qgram;

/// Whether the statistics call runs inside an aggregate.
///
/// The collector's transition function is an aggregate transition: invoking
/// it to create fresh state outside an aggregate is a usage error, mirrored
/// from the host contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallContext {
    Aggregate,
    Direct,
}

#[derive(Clone, Copy, Debug)]
struct DocFreq {
    count: i64,
    seen: bool,
}

/// Streaming exact document-frequency collector.
pub struct FrequentGramCollector {
    bounds: GramBounds,
    threshold: f64,
    total_docs: i64,
    map: AHashMap<Box<[u8]>, u32>,
    slots: Vec<DocFreq>,
    touched: Vec<u32>,
    boundaries: Vec<usize>,
}

impl FrequentGramCollector {
    /// Creates a collector, validating bounds and threshold eagerly.
    pub fn new(bounds: GramBounds, threshold: f64) -> Result<Self, StatsError> {
        bounds.validate()?;
        if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
            return Err(StatsError::ThresholdOutOfRange { value: threshold });
        }
        Ok(Self {
            bounds,
            threshold,
            total_docs: 0,
            map: AHashMap::new(),
            slots: Vec::new(),
            touched: Vec::new(),
            boundaries: Vec::new(),
        })
    }

    /// Number of documents pushed so far, NULLs included.
    #[inline]
    #[must_use]
    pub fn total_docs(&self) -> i64 {
        self.total_docs
    }

    /// Number of distinct grams tracked so far.
    #[inline]
    #[must_use]
    pub fn distinct_grams(&self) -> usize {
        self.map.len()
    }

    /// Feeds one document (or NULL) into the aggregate.
    pub fn push(&mut self, doc: Option<&[u8]>) {
        self.total_docs += 1;
        let Some(doc) = doc else { return };

        let mut boundaries = std::mem::take(&mut self.boundaries);
        let (min_q, max_q) = (self.bounds.min_q as usize, self.bounds.max_q as usize);
        for_each_qgram(doc, min_q, max_q, &mut boundaries, |gram| self.observe(gram));
        self.boundaries = boundaries;

        for &slot in &self.touched {
            self.slots[slot as usize].seen = false;
        }
        self.touched.clear();
    }

    fn observe(&mut self, gram: &[u8]) {
        if let Some(&slot) = self.map.get(gram) {
            let entry = &mut self.slots[slot as usize];
            if !entry.seen {
                entry.count += 1;
                entry.seen = true;
                self.touched.push(slot);
            }
        } else {
            let slot = self.slots.len() as u32;
            self.map.insert(gram.into(), slot);
            self.slots.push(DocFreq { count: 1, seen: true });
            self.touched.push(slot);
        }
    }

    /// Finalizes the aggregate: grams with document frequency at or above
    /// `floor(threshold * total_docs)`, in ascending byte order.
    #[must_use]
    pub fn finish(self) -> Vec<Vec<u8>> {
        let limit = (self.total_docs as f64 * self.threshold) as i64;
        let slots = self.slots;
        let mut out: Vec<Vec<u8>> = self
            .map
            .into_iter()
            .filter(|&(_, slot)| slots[slot as usize].count >= limit)
            .map(|(gram, _)| gram.into_vec())
            .collect();
        sort_unique(&mut out);
        out
    }
}

/// Aggregate transition: creates the state on first call, then folds `doc`
/// into it.
///
/// Fresh state may only be created inside an aggregate context; any other
/// invocation is the host calling the transition function directly.
pub fn transition(
    state: Option<FrequentGramCollector>,
    ctx: CallContext,
    doc: Option<&[u8]>,
    bounds: GramBounds,
    threshold: f64,
) -> Result<FrequentGramCollector, StatsError> {
    let mut state = match state {
        Some(state) => state,
        None => {
            if ctx != CallContext::Aggregate {
                return Err(StatsError::NotInAggregate);
            }
            FrequentGramCollector::new(bounds, threshold)?
        }
    };
    state.push(doc);
    Ok(state)
}

/// Runs the whole aggregate over an iterator of documents.
pub fn collect_frequent<'a, I>(
    docs: I,
    bounds: GramBounds,
    threshold: f64,
) -> Result<Vec<Vec<u8>>, StatsError>
where
    I: IntoIterator<Item = Option<&'a [u8]>>,
{
    let mut collector = FrequentGramCollector::new(bounds, threshold)?;
    for doc in docs {
        collector.push(doc);
    }
    Ok(collector.finish())
}
