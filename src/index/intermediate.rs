//! Intermediate file format (spec §6.2): for each term, in ascending byte
//! order within one file, `wordLength: i32 LE`, the word's UTF-8 bytes,
//! `postingCount: i32 LE`, `docIds: i32[] LE` (ascending), `frequencies:
//! i32[] LE` parallel to `docIds`. No compression at this layer — the
//! teacher's `indexer/helper.rs` writes a structurally similar raw-u32
//! record despite its `vb_`-prefixed naming; this is adapted from that
//! shape with the position list dropped (no phrase queries) in favor of a
//! single frequency count per posting.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};
use crate::index::types::Posting;

pub struct IntermediateWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl IntermediateWriter {
    pub fn create(path: &Path) -> EngineResult<Self> {
        let file = File::create(path).map_err(|e| EngineError::OutputIoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Writes one term's record. `postings` must already be sorted
    /// ascending by `doc_id`.
    pub fn write_term(&mut self, term: &str, postings: &[Posting]) -> EngineResult<()> {
        self.write_term_inner(term, postings)
            .map_err(|e| EngineError::OutputIoError {
                path: self.path.clone(),
                source: e,
            })
    }

    fn write_term_inner(&mut self, term: &str, postings: &[Posting]) -> io::Result<()> {
        let bytes = term.as_bytes();
        self.writer.write_all(&(bytes.len() as i32).to_le_bytes())?;
        self.writer.write_all(bytes)?;
        self.writer
            .write_all(&(postings.len() as i32).to_le_bytes())?;
        for p in postings {
            self.writer.write_all(&(p.doc_id as i32).to_le_bytes())?;
        }
        for p in postings {
            self.writer.write_all(&(p.freq as i32).to_le_bytes())?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> EngineResult<()> {
        self.writer.flush().map_err(|e| EngineError::OutputIoError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Sequential reader over one intermediate file, buffering reads so the
/// k-way merger never materializes an entire file in memory (spec §4.2).
pub struct IntermediateReader {
    reader: BufReader<File>,
    path: PathBuf,
    exhausted: bool,
}

impl IntermediateReader {
    pub fn open(path: &Path) -> EngineResult<Self> {
        let file = File::open(path).map_err(|e| EngineError::InputIoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            reader: BufReader::with_capacity(crate::config::MERGE_READ_BUFFER_BYTES, file),
            path: path.to_path_buf(),
            exhausted: false,
        })
    }

    /// Reads the next `(term, postings)` record, or `None` at EOF.
    pub fn next_term(&mut self) -> EngineResult<Option<(String, Vec<Posting>)>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.read_record() {
            Ok(Some(r)) => Ok(Some(r)),
            Ok(None) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => Err(EngineError::InputIoError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn read_record(&mut self) -> io::Result<Option<(String, Vec<Posting>)>> {
        let mut len_buf = [0u8; 4];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }
        let word_len = i32::from_le_bytes(len_buf) as usize;
        let mut word_buf = vec![0u8; word_len];
        self.reader.read_exact(&mut word_buf)?;
        let term = String::from_utf8(word_buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut count_buf = [0u8; 4];
        self.reader.read_exact(&mut count_buf)?;
        let count = i32::from_le_bytes(count_buf) as usize;

        let mut doc_ids = vec![0u32; count];
        for slot in doc_ids.iter_mut() {
            let mut b = [0u8; 4];
            self.reader.read_exact(&mut b)?;
            *slot = i32::from_le_bytes(b) as u32;
        }
        let mut freqs = vec![0u32; count];
        for slot in freqs.iter_mut() {
            let mut b = [0u8; 4];
            self.reader.read_exact(&mut b)?;
            *slot = i32::from_le_bytes(b) as u32;
        }

        let postings = doc_ids
            .into_iter()
            .zip(freqs)
            .map(|(doc_id, freq)| Posting::new(doc_id, freq))
            .collect();
        Ok(Some((term, postings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_back_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg0.tmpidx");
        {
            let mut w = IntermediateWriter::create(&path).unwrap();
            w.write_term("apple", &[Posting::new(1, 2), Posting::new(5, 1)])
                .unwrap();
            w.write_term("banana", &[Posting::new(3, 7)]).unwrap();
            w.finish().unwrap();
        }
        let mut r = IntermediateReader::open(&path).unwrap();
        let (t1, p1) = r.next_term().unwrap().unwrap();
        assert_eq!(t1, "apple");
        assert_eq!(p1, vec![Posting::new(1, 2), Posting::new(5, 1)]);
        let (t2, p2) = r.next_term().unwrap().unwrap();
        assert_eq!(t2, "banana");
        assert_eq!(p2, vec![Posting::new(3, 7)]);
        assert!(r.next_term().unwrap().is_none());
    }

    #[test]
    fn empty_file_yields_no_terms() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.tmpidx");
        IntermediateWriter::create(&path).unwrap().finish().unwrap();
        let mut r = IntermediateReader::open(&path).unwrap();
        assert!(r.next_term().unwrap().is_none());
    }

    #[test]
    fn unicode_terms_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unicode.tmpidx");
        {
            let mut w = IntermediateWriter::create(&path).unwrap();
            w.write_term("café", &[Posting::new(0, 1)]).unwrap();
            w.finish().unwrap();
        }
        let mut r = IntermediateReader::open(&path).unwrap();
        let (t, _) = r.next_term().unwrap().unwrap();
        assert_eq!(t, "café");
    }
}
