//! External k-way merge (spec §4.2): one `IntermediateReader` per
//! intermediate file, drained through a min-heap keyed on `(term,
//! sourceFileId)` with `sourceFileId` ascending as the tie-break. Because
//! each intermediate file covers a disjoint, monotonically increasing
//! docId range (segments partition the corpus in file order), merging a
//! term's postings across files is concatenation in ascending
//! `sourceFileId` order, not a generic merge-by-docId.
//!
//! Grounded in the teacher's heap-based `merge_all_postings` helper
//! (`utils/posting.rs::PostingWithSource`) for the min-heap-of-sources
//! shape, and in `indexer/spimi/spimi_iterator.rs`'s sliding-window reader
//! for keeping only a bounded amount of each file in memory at once.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;

use crate::error::EngineResult;
use crate::index::intermediate::IntermediateReader;
use crate::index::types::Posting;

struct HeapEntry {
    term: String,
    source_id: usize,
    postings: Vec<Posting>,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term && self.source_id == other.source_id
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.term.cmp(&other.term).then(self.source_id.cmp(&other.source_id))
    }
}

pub struct KWayMerger {
    readers: Vec<IntermediateReader>,
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

impl KWayMerger {
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> EngineResult<Self> {
        let mut readers: Vec<IntermediateReader> = paths
            .iter()
            .map(|p| IntermediateReader::open(p.as_ref()))
            .collect::<EngineResult<_>>()?;
        let mut heap = BinaryHeap::new();
        for (source_id, reader) in readers.iter_mut().enumerate() {
            if let Some((term, postings)) = reader.next_term()? {
                heap.push(Reverse(HeapEntry {
                    term,
                    source_id,
                    postings,
                }));
            }
        }
        Ok(Self { readers, heap })
    }

    /// Returns the next term in global ascending order with its fully
    /// merged posting list, or `None` once every reader is exhausted.
    pub fn next_merged_term(&mut self) -> EngineResult<Option<(String, Vec<Posting>)>> {
        let Some(Reverse(first)) = self.heap.pop() else {
            return Ok(None);
        };
        let term = first.term.clone();
        let mut merged = first.postings;
        self.refill(first.source_id)?;

        while let Some(Reverse(top)) = self.heap.peek() {
            if top.term != term {
                break;
            }
            let Reverse(next) = self.heap.pop().unwrap();
            merged.extend(next.postings);
            self.refill(next.source_id)?;
        }
        Ok(Some((term, merged)))
    }

    fn refill(&mut self, source_id: usize) -> EngineResult<()> {
        if let Some((term, postings)) = self.readers[source_id].next_term()? {
            self.heap.push(Reverse(HeapEntry {
                term,
                source_id,
                postings,
            }));
        }
        Ok(())
    }
}
