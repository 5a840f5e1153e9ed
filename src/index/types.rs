/// A single (docId, term-frequency) pair. `Posting.freq` is the raw count
/// of term occurrences within the document, aggregated by the segment
/// builder before anything reaches disk (spec §3/§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: u32,
    pub freq: u32,
}

impl Posting {
    pub fn new(doc_id: u32, freq: u32) -> Self {
        Self { doc_id, freq }
    }
}
