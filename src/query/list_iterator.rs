//! Lazy, block-skipping posting list iterator (spec §4.6): `nextGEQ`
//! advances to the first docID `>= target`, skipping whole blocks (via
//! the block header's `lastDocId` array, no decoding) and then whole
//! chunks (via the chunk's own `lastDocId`, no decoding) before finally
//! decoding the one chunk that can contain the answer.
//!
//! The teacher's closest analog, `utils/chunk_iterator.rs::ChunkIterator`,
//! operates over an already fully-decoded `Vec<Chunk>` for one term and
//! has no concept of block-level skip-without-decode at all (its
//! `get_doc_score` is even a stub returning `0.0`). This is a fresh
//! implementation against spec's on-disk layout, keeping only the
//! teacher's iterator-state-machine vocabulary (current chunk / current
//! posting index).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::compressor::impact::dequantize;
use crate::error::{EngineError, EngineResult};
use crate::index::block::{BlockHeader, HEADER_BYTES};
use crate::index::chunk::decode_chunk;

fn index_file_path(index_dir: &Path, file_id: u32) -> PathBuf {
    index_dir.join(format!("index_{file_id}.bin"))
}

struct LoadedBlock {
    header: BlockHeader,
    payload_start: u64,
}

pub struct InvertedList {
    index_dir: PathBuf,
    end_chunk: u32,
    file_id: u32,
    file: File,
    block_start_global_chunk: u32,
    block: LoadedBlock,
    local_index: usize,
    current_chunk: Option<Vec<(u32, u8)>>,
    posting_idx: usize,
    done: bool,
}

impl InvertedList {
    /// Opens the list for the chunk range `[start_chunk, end_chunk]`
    /// (inclusive, global, 0-based), locating the starting block by
    /// walking index files and block headers from the beginning.
    pub fn open(index_dir: &Path, start_chunk: u32, end_chunk: u32) -> EngineResult<Self> {
        let mut file_id = 0u32;
        let mut file = Self::open_file(index_dir, file_id)?;
        let mut global_cursor = 0u32;

        loop {
            let header = match Self::read_header(&mut file, index_dir, file_id)? {
                Some(h) => h,
                None => {
                    file_id += 1;
                    file = Self::open_file(index_dir, file_id)?;
                    continue;
                }
            };
            let payload_start = file.stream_position().map_err(|e| EngineError::CorruptIndex {
                reason: format!("seek failed while scanning {}: {e}", index_file_path(index_dir, file_id).display()),
            })?;
            let occupied = header.occupied() as u32;
            if global_cursor + occupied <= start_chunk {
                let skip = header.payload_len() as i64;
                file.seek(SeekFrom::Current(skip)).map_err(|e| EngineError::CorruptIndex {
                    reason: format!("seek failed while skipping block: {e}"),
                })?;
                global_cursor += occupied;
                continue;
            }

            let local_index = (start_chunk - global_cursor) as usize;
            return Ok(Self {
                index_dir: index_dir.to_path_buf(),
                end_chunk,
                file_id,
                file,
                block_start_global_chunk: global_cursor,
                block: LoadedBlock { header, payload_start },
                local_index,
                current_chunk: None,
                posting_idx: 0,
                done: false,
            });
        }
    }

    fn open_file(index_dir: &Path, file_id: u32) -> EngineResult<File> {
        let path = index_file_path(index_dir, file_id);
        File::open(&path).map_err(|e| EngineError::InputIoError { path, source: e })
    }

    /// Reads the next block header from `file`, or `None` at EOF.
    fn read_header(file: &mut File, index_dir: &Path, file_id: u32) -> EngineResult<Option<BlockHeader>> {
        let mut buf = [0u8; HEADER_BYTES];
        match file.read_exact(&mut buf) {
            Ok(()) => Ok(Some(BlockHeader::parse(&buf))),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(EngineError::InputIoError {
                path: index_file_path(index_dir, file_id),
                source: e,
            }),
        }
    }

    fn advance_to_next_file(&mut self) -> EngineResult<bool> {
        let next_id = self.file_id + 1;
        let path = index_file_path(&self.index_dir, next_id);
        if !path.exists() {
            return Ok(false);
        }
        self.file_id = next_id;
        self.file = Self::open_file(&self.index_dir, next_id)?;
        Ok(true)
    }

    /// Loads the next block's header without decoding any chunk in it.
    fn load_next_block(&mut self) -> EngineResult<bool> {
        self.block_start_global_chunk += self.block.header.occupied() as u32;
        loop {
            match Self::read_header(&mut self.file, &self.index_dir, self.file_id)? {
                Some(header) => {
                    let payload_start = self.file.stream_position().map_err(|e| EngineError::CorruptIndex {
                        reason: format!("seek failed loading next block: {e}"),
                    })?;
                    self.block = LoadedBlock { header, payload_start };
                    self.local_index = 0;
                    self.current_chunk = None;
                    self.posting_idx = 0;
                    return Ok(true);
                }
                None => {
                    if !self.advance_to_next_file()? {
                        return Ok(false);
                    }
                }
            }
        }
    }

    fn skip_current_block_payload(&mut self) -> EngineResult<()> {
        // Absolute seek: prior chunk decodes leave the file cursor at an
        // arbitrary offset within this block's payload, not necessarily
        // where sequential reads would.
        let end = self.block.payload_start + self.block.header.payload_len() as u64;
        self.file.seek(SeekFrom::Start(end)).map_err(|e| EngineError::CorruptIndex {
            reason: format!("seek failed skipping block payload: {e}"),
        })?;
        Ok(())
    }

    fn last_owned_local(&self) -> usize {
        let occupied = self.block.header.occupied();
        let by_range = (self.end_chunk - self.block_start_global_chunk) as usize;
        occupied.saturating_sub(1).min(by_range)
    }

    fn decode_local_chunk(&mut self, local_index: usize) -> EngineResult<()> {
        let offset = self.block.payload_start + self.block.header.chunk_offset(local_index) as u64;
        let size = self.block.header.byte_size[local_index] as usize;
        let mut buf = vec![0u8; size];
        self.file.seek(SeekFrom::Start(offset)).map_err(|e| EngineError::CorruptIndex {
            reason: format!("seek failed decoding chunk: {e}"),
        })?;
        self.file.read_exact(&mut buf).map_err(|e| EngineError::InputIoError {
            path: index_file_path(&self.index_dir, self.file_id),
            source: e,
        })?;
        let last_doc_id = self.block.header.last_doc_id[local_index] as u32;
        self.current_chunk = Some(decode_chunk(&buf, last_doc_id));
        self.posting_idx = 0;
        Ok(())
    }

    /// Advances to the first docID `>= target`, or returns `None` once the
    /// list's chunk range is exhausted.
    pub fn next_geq(&mut self, target: u32) -> EngineResult<Option<u32>> {
        if self.done {
            return Ok(None);
        }
        // Phase 1: block-level skip, no decoding.
        loop {
            let last_owned_local = self.last_owned_local();
            let last_owned_global = self.block_start_global_chunk + last_owned_local as u32;
            let last_doc_id = self.block.header.last_doc_id[last_owned_local] as u32;
            if last_owned_global < self.end_chunk && last_doc_id < target {
                self.skip_current_block_payload()?;
                if !self.load_next_block()? {
                    self.done = true;
                    return Ok(None);
                }
                continue;
            }
            break;
        }

        // Phase 2: chunk-level skip within the loaded block, no decoding.
        // Bounded by `last_owned_local`: phase 1 already established the
        // answer (if any) lies at or before that chunk, and indices past it
        // may belong to the next term or be unfilled header slots.
        let last_owned_local = self.last_owned_local();
        loop {
            let last_doc_id = self.block.header.last_doc_id[self.local_index] as u32;
            if last_doc_id < target && self.local_index < last_owned_local {
                self.local_index += 1;
                self.current_chunk = None;
                continue;
            }
            break;
        }

        if self.current_chunk.is_none() {
            self.decode_local_chunk(self.local_index)?;
        }

        // Phase 3: in-chunk linear scan.
        let chunk = self.current_chunk.as_ref().unwrap();
        while self.posting_idx < chunk.len() && chunk[self.posting_idx].0 < target {
            self.posting_idx += 1;
        }
        if self.posting_idx < chunk.len() {
            return Ok(Some(chunk[self.posting_idx].0));
        }

        // Phase 2 guarantees this chunk's lastDocId >= target unless it is
        // the list's final chunk, so reaching here with no matching
        // posting means the list is exhausted.
        debug_assert!(self.block_start_global_chunk + self.local_index as u32 >= self.end_chunk);
        self.done = true;
        Ok(None)
    }

    /// The docID the iterator is currently positioned on (after a
    /// successful `next_geq`).
    pub fn current_doc_id(&self) -> Option<u32> {
        self.current_chunk
            .as_ref()
            .and_then(|c| c.get(self.posting_idx))
            .map(|&(doc_id, _)| doc_id)
    }

    /// The dequantized BM25 impact score for the current posting.
    pub fn current_impact(&self) -> Option<f64> {
        self.current_chunk
            .as_ref()
            .and_then(|c| c.get(self.posting_idx))
            .map(|&(_, impact)| dequantize(impact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::encoder::IndexEncoder;
    use crate::index::types::Posting;
    use crate::scoring::bm25::Bm25Params;
    use tempfile::tempdir;

    /// Builds a one-term index whose postings span two chunks (`chunk_size
    /// = 2`) and two blocks (64 chunks each, so 128 postings fill the
    /// first block), then opens an `InvertedList` over the whole range.
    fn build_spanning_list(num_postings: u32) -> (tempfile::TempDir, InvertedList) {
        let dir = tempdir().unwrap();
        let mut enc = IndexEncoder::create(dir.path(), 24_000, 2).unwrap();
        let postings: Vec<Posting> = (0..num_postings).map(|d| Posting::new(d, 1)).collect();
        let params = Bm25Params::new(1.2, 0.75, num_postings + 1);
        let (start, end) = enc
            .write_term(&postings, |_| 10, 10.0, &params)
            .unwrap();
        enc.finish().unwrap();
        let list = InvertedList::open(dir.path(), start, end).unwrap();
        (dir, list)
    }

    #[test]
    fn next_geq_crosses_a_chunk_boundary_within_a_block() {
        // chunk_size = 2: chunk 0 holds docIds {0,1}, chunk 1 holds {2,3}.
        // lastDocId of chunk 0 is 1, so nextGEQ(2) must advance one chunk.
        let (_dir, mut list) = build_spanning_list(10);
        assert_eq!(list.next_geq(0).unwrap(), Some(0));
        assert_eq!(list.next_geq(2).unwrap(), Some(2));
        assert_eq!(list.current_doc_id(), Some(2));
    }

    #[test]
    fn next_geq_crosses_a_block_boundary() {
        // chunk_size = 2, 64 chunks/block => the first block holds docIds
        // 0..=127. docId 128 starts chunk 64 in the second block, so
        // nextGEQ(128) must skip the entire first block without decoding.
        let (_dir, mut list) = build_spanning_list(130);
        let found = list.next_geq(128).unwrap();
        assert_eq!(found, Some(128));
        assert_eq!(list.current_doc_id(), Some(128));
    }

    #[test]
    fn next_geq_past_the_final_posting_returns_none() {
        let (_dir, mut list) = build_spanning_list(10);
        assert_eq!(list.next_geq(0).unwrap(), Some(0));
        assert_eq!(list.next_geq(1_000).unwrap(), None);
    }

    #[test]
    fn next_geq_of_zero_returns_the_first_posting() {
        let (_dir, mut list) = build_spanning_list(5);
        assert_eq!(list.next_geq(0).unwrap(), Some(0));
    }

    #[test]
    fn next_geq_is_idempotent_on_an_already_satisfied_target() {
        // Asking for a target at or behind the current position must not
        // regress the iterator (DAAT never calls `nextGEQ` backwards, but
        // requesting the same docId again should return it unchanged).
        let (_dir, mut list) = build_spanning_list(10);
        assert_eq!(list.next_geq(4).unwrap(), Some(4));
        assert_eq!(list.next_geq(4).unwrap(), Some(4));
    }
}
