//! Bounded top-K accumulator (spec §4.8): a min-heap over `(score,
//! docId)` capped at K entries, so pushing the K+1th candidate evicts the
//! current weakest one in `O(log K)`. Drained in descending-score order
//! at the end of a query via heapsort.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct ScoredDoc {
    score: f64,
    doc_id: u32,
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.doc_id == other.doc_id
    }
}
impl Eq for ScoredDoc {}
impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then(self.doc_id.cmp(&other.doc_id))
    }
}

pub struct TopKHeap {
    k: usize,
    heap: BinaryHeap<std::cmp::Reverse<ScoredDoc>>,
}

impl TopKHeap {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    pub fn push(&mut self, doc_id: u32, score: f64) {
        let candidate = ScoredDoc { score, doc_id };
        if self.heap.len() < self.k {
            self.heap.push(std::cmp::Reverse(candidate));
        } else if let Some(std::cmp::Reverse(weakest)) = self.heap.peek()
            && candidate > *weakest
        {
            self.heap.pop();
            self.heap.push(std::cmp::Reverse(candidate));
        }
    }

    /// Drains into `(docId, score)` pairs sorted by descending score.
    pub fn into_sorted_results(self) -> Vec<(u32, f64)> {
        let mut items: Vec<ScoredDoc> = self.heap.into_iter().map(|r| r.0).collect();
        items.sort_by(|a, b| b.cmp(a));
        items.into_iter().map(|s| (s.doc_id, s.score)).collect()
    }
}
