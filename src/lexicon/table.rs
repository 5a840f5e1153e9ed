//! Query-time lexicon: the whole lexicon file is read into an owning
//! buffer once, then indexed by a DJB2-hashed chaining hash table sized to
//! a prime slot count (spec §4.5), rather than a general-purpose
//! `HashMap`. The teacher's in-memory term-metadata table
//! (`in_memory_index/in_memory_index_metadata.rs`) uses a `HashMap` for
//! this; spec.md is explicit that the lexicon lookup structure is a
//! hand-rolled DJB2 table, so this is a fresh implementation rather than
//! a port of that file.

use std::fs;
use std::path::Path;

use crate::config::LEXICON_HASH_SLOTS;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy)]
pub struct ChunkRange {
    pub start_chunk: u32,
    pub end_chunk: u32,
}

struct Entry {
    term: String,
    range: ChunkRange,
    next: Option<usize>,
}

pub struct LexiconTable {
    entries: Vec<Entry>,
    buckets: Vec<Option<usize>>,
}

fn djb2(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 5381;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u64);
    }
    hash
}

impl LexiconTable {
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EngineError::InputIoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut table = Self {
            entries: Vec::new(),
            buckets: vec![None; LEXICON_HASH_SLOTS as usize],
        };
        for line in text.lines() {
            let mut parts = line.rsplitn(3, ' ');
            let end_chunk: u32 = parts
                .next()
                .ok_or_else(|| malformed(path, line))?
                .parse()
                .map_err(|_| malformed(path, line))?;
            let start_chunk: u32 = parts
                .next()
                .ok_or_else(|| malformed(path, line))?
                .parse()
                .map_err(|_| malformed(path, line))?;
            let term = parts.next().ok_or_else(|| malformed(path, line))?;
            table.insert(term, ChunkRange { start_chunk, end_chunk });
        }
        Ok(table)
    }

    fn insert(&mut self, term: &str, range: ChunkRange) {
        let slot = (djb2(term.as_bytes()) % self.buckets.len() as u64) as usize;
        let index = self.entries.len();
        self.entries.push(Entry {
            term: term.to_string(),
            range,
            next: self.buckets[slot],
        });
        self.buckets[slot] = Some(index);
    }

    /// Looks up `term`'s chunk range. Absent from the lexicon is not an
    /// error (spec §7: `TermNotFound`) — it is represented by `None`.
    pub fn lookup(&self, term: &str) -> Option<ChunkRange> {
        let slot = (djb2(term.as_bytes()) % self.buckets.len() as u64) as usize;
        let mut cursor = self.buckets[slot];
        while let Some(index) = cursor {
            let entry = &self.entries[index];
            if entry.term == term {
                return Some(entry.range);
            }
            cursor = entry.next;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn malformed(path: &Path, line: &str) -> EngineError {
    EngineError::CorruptIndex {
        reason: format!("{}: malformed lexicon line: {line:?}", path.display()),
    }
}
