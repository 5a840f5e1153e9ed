//! Document-at-a-time query evaluation (spec §4.8): conjunctive (AND) and
//! disjunctive (OR) evaluation over one `InvertedList` per query term,
//! driven entirely through `nextGEQ`, with results accumulated in a
//! bounded top-K heap. Scores are already baked into each posting's
//! quantized impact byte at index time, so evaluation here is pure
//! addition — no BM25 recomputation.
//!
//! Grounded in the teacher's `query_processor/query_processor.rs` for the
//! overall shape (build one iterator per query term, then hand off to an
//! evaluation routine), but the routines themselves are spec's plain DAAT
//! AND/OR rather than the teacher's WAND-family algorithms.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::EngineResult;
use crate::lexicon::table::LexiconTable;
use crate::query::heap::TopKHeap;
use crate::query::list_iterator::InvertedList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    And,
    Or,
}

pub struct QueryEvaluator<'a> {
    index_dir: &'a Path,
    lexicon: &'a LexiconTable,
    top_k: usize,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(index_dir: &'a Path, lexicon: &'a LexiconTable, top_k: usize) -> Self {
        Self {
            index_dir,
            lexicon,
            top_k,
        }
    }

    /// Evaluates `terms` in `mode`, returning `(docId, score)` pairs in
    /// descending score order, capped at `top_k`. Duplicate terms are
    /// dropped before any list is opened (spec §4.8, §8), preserving the
    /// order of each term's first occurrence.
    pub fn evaluate(&self, terms: &[String], mode: QueryMode) -> EngineResult<Vec<(u32, f64)>> {
        let mut seen = FxHashSet::default();
        let deduped: Vec<&String> = terms.iter().filter(|t| seen.insert(t.as_str())).collect();

        let mut lists = Vec::new();
        for term in deduped {
            match self.lexicon.lookup(term) {
                Some(range) => {
                    lists.push(InvertedList::open(self.index_dir, range.start_chunk, range.end_chunk)?)
                }
                None if mode == QueryMode::And => return Ok(Vec::new()),
                None => continue,
            }
        }
        if lists.is_empty() {
            return Ok(Vec::new());
        }
        let heap = TopKHeap::new(self.top_k);
        match mode {
            QueryMode::And => and_eval(lists, heap),
            QueryMode::Or => or_eval(lists, heap),
        }
    }
}

fn and_eval(mut lists: Vec<InvertedList>, mut heap: TopKHeap) -> EngineResult<Vec<(u32, f64)>> {
    let mut docs: Vec<Option<u32>> = lists
        .iter_mut()
        .map(|l| l.next_geq(0))
        .collect::<EngineResult<_>>()?;

    loop {
        if docs.iter().any(Option::is_none) {
            break;
        }
        let max_d = docs.iter().map(|d| d.unwrap()).max().unwrap();
        if docs.iter().all(|&d| d == Some(max_d)) {
            let score: f64 = lists.iter().map(|l| l.current_impact().unwrap()).sum();
            heap.push(max_d, score);
            for (i, list) in lists.iter_mut().enumerate() {
                docs[i] = list.next_geq(max_d + 1)?;
            }
        } else {
            for (i, list) in lists.iter_mut().enumerate() {
                if docs[i].unwrap() < max_d {
                    docs[i] = list.next_geq(max_d)?;
                }
            }
        }
    }
    Ok(heap.into_sorted_results())
}

fn or_eval(mut lists: Vec<InvertedList>, mut heap: TopKHeap) -> EngineResult<Vec<(u32, f64)>> {
    let mut docs: Vec<Option<u32>> = lists
        .iter_mut()
        .map(|l| l.next_geq(0))
        .collect::<EngineResult<_>>()?;

    loop {
        let min_d = docs.iter().flatten().min().copied();
        let Some(min_d) = min_d else { break };
        let mut score = 0.0;
        for (i, list) in lists.iter_mut().enumerate() {
            if docs[i] == Some(min_d) {
                score += list.current_impact().unwrap();
                docs[i] = list.next_geq(min_d + 1)?;
            }
        }
        heap.push(min_d, score);
    }
    Ok(heap.into_sorted_results())
}
