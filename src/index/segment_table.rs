//! The in-memory "segment table" a single SPIMI pass builds up before it
//! is flushed to an intermediate file and discarded (spec §4.1). Grounded
//! in the teacher's `Spmi` dictionary-flushing lifecycle
//! (`indexer/spimi.rs::single_pass_in_memory_indexing`), minus the
//! teacher's mpsc-channel plumbing, which lives one layer up in the
//! builder.

use rustc_hash::FxHashMap;

use crate::index::intermediate::IntermediateWriter;
use crate::index::types::Posting;

#[derive(Default)]
pub struct SegmentTable {
    postings: FxHashMap<String, Vec<Posting>>,
    entry_count: usize,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one document's term-frequency counts. `term_counts` must
    /// already be per-document-deduplicated (one entry per distinct term).
    pub fn add_document(&mut self, doc_id: u32, term_counts: &FxHashMap<String, u32>) {
        for (term, &freq) in term_counts {
            self.postings
                .entry(term.clone())
                .or_default()
                .push(Posting::new(doc_id, freq));
            self.entry_count += 1;
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Writes every term's postings, in ascending lexicographic order, to
    /// `writer` and empties the table.
    pub fn flush(&mut self, writer: &mut IntermediateWriter) -> crate::error::EngineResult<()> {
        let mut terms: Vec<String> = self.postings.keys().cloned().collect();
        terms.sort_unstable();
        for term in terms {
            let postings = self.postings.remove(&term).unwrap();
            writer.write_term(&term, &postings)?;
        }
        self.entry_count = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn flush_writes_terms_in_sorted_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.tmpidx");
        let mut table = SegmentTable::new();
        let mut doc0 = FxHashMap::default();
        doc0.insert("zebra".to_string(), 1u32);
        doc0.insert("apple".to_string(), 2u32);
        table.add_document(0, &doc0);
        assert_eq!(table.entry_count(), 2);

        let mut writer = IntermediateWriter::create(&path).unwrap();
        table.flush(&mut writer).unwrap();
        writer.finish().unwrap();
        assert!(table.is_empty());

        let mut reader = crate::index::intermediate::IntermediateReader::open(&path).unwrap();
        let (t1, _) = reader.next_term().unwrap().unwrap();
        assert_eq!(t1, "apple");
        let (t2, _) = reader.next_term().unwrap().unwrap();
        assert_eq!(t2, "zebra");
    }
}
