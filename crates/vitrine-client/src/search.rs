//! Fuzzy search over the image catalog.
//!
//! [`SearchIndex`] is the capability the feed controller needs; [`FuzzyIndex`]
//! is the skim-matcher implementation used by default. Whatever matcher sits
//! behind the trait, two rules hold:
//!
//! - a term equal (ignoring case) to an image's code yields that image alone;
//! - fuzzy hits are ranked by confidence and those under
//!   [`MIN_CONFIDENCE`](vitrine_shared::constants::MIN_CONFIDENCE) are dropped.

use std::cmp::Ordering;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use vitrine_shared::constants::MIN_CONFIDENCE;
use vitrine_shared::ImageRecord;

pub trait SearchIndex: Send + Sync + 'static {
    /// Build an index over `records`. Called whenever the catalog changes.
    fn build(records: &[ImageRecord]) -> Self
    where
        Self: Sized;

    /// Ranked matches for `term`, or `None` when the term is blank and the
    /// caller should show the unfiltered list.
    fn query(&self, term: &str) -> Option<Vec<ImageRecord>>;
}

struct Entry {
    record: ImageRecord,
    number: String,
}

pub struct FuzzyIndex {
    entries: Vec<Entry>,
    matcher: SkimMatcherV2,
    min_confidence: f64,
}

impl FuzzyIndex {
    pub fn with_min_confidence(records: &[ImageRecord], min_confidence: f64) -> Self {
        let entries = records
            .iter()
            .map(|record| Entry {
                number: record.number.to_string(),
                record: record.clone(),
            })
            .collect();

        Self {
            entries,
            matcher: SkimMatcherV2::default().ignore_case(),
            min_confidence,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Confidence in `0.0..=1.0` that `field` is what `term` means, relative
    /// to the score `term` gets against itself.
    fn confidence(&self, field: &str, term: &str, perfect: i64) -> Option<f64> {
        let score = self.matcher.fuzzy_match(field, term)?;
        if perfect <= 0 {
            return Some(1.0);
        }
        Some((score as f64 / perfect as f64).clamp(0.0, 1.0))
    }
}

impl SearchIndex for FuzzyIndex {
    fn build(records: &[ImageRecord]) -> Self {
        Self::with_min_confidence(records, MIN_CONFIDENCE)
    }

    fn query(&self, term: &str) -> Option<Vec<ImageRecord>> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        let lowered = term.to_lowercase();
        if let Some(exact) = self
            .entries
            .iter()
            .find(|e| e.record.code.to_lowercase() == lowered)
        {
            return Some(vec![exact.record.clone()]);
        }

        let perfect = self.matcher.fuzzy_match(term, term).unwrap_or(0);

        let mut hits: Vec<(f64, &ImageRecord)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let by_code = self.confidence(&entry.record.code, term, perfect);
                let by_number = self.confidence(&entry.number, term, perfect);
                let best = match (by_code, by_number) {
                    (Some(a), Some(b)) => a.max(b),
                    (Some(a), None) | (None, Some(a)) => a,
                    (None, None) => return None,
                };
                (best >= self.min_confidence).then_some((best, &entry.record))
            })
            .collect();

        // Stable: equal confidence keeps catalog order.
        hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        tracing::trace!(term, hits = hits.len(), "fuzzy query");
        Some(hits.into_iter().map(|(_, r)| r.clone()).collect())
    }
}
