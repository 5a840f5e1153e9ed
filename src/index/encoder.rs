//! Orchestrates chunking and block/file packing for the merged posting
//! stream (spec §4.3): splits each term's postings into chunks of up to
//! 128, packs chunks into blocks of up to 64, and blocks into index files
//! of up to 24000 blocks, rolling to a new file when the cap is hit.
//! Chunk numbers are assigned globally and monotonically, so a chunk
//! range recorded in the lexicon still identifies its chunk uniquely after
//! a file boundary. Grounded in the teacher's block/chunk-rollover loop
//! (`indexer/spimi/spimi_merge_writer.rs::SpimiMergeWriter::add_term`),
//! rewritten against spec's fixed-header block layout instead of the
//! teacher's variable-term-per-block one.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{EngineError, EngineResult};
use crate::index::block::BlockBuilder;
use crate::index::chunk::{encode_chunk, MAX_POSTINGS_PER_CHUNK};
use crate::index::types::Posting;
use crate::scoring::bm25::Bm25Params;

fn index_file_name(file_id: u32) -> String {
    format!("index_{file_id}.bin")
}

pub struct IndexEncoder {
    index_dir: PathBuf,
    max_blocks_per_file: u32,
    chunk_size: usize,
    current_file_id: u32,
    current_file_blocks: u32,
    current_writer: BufWriter<File>,
    current_block: BlockBuilder,
    global_chunk_count: u32,
}

impl IndexEncoder {
    pub fn create(index_dir: &Path, max_blocks_per_file: u32, chunk_size: usize) -> EngineResult<Self> {
        std::fs::create_dir_all(index_dir).map_err(|e| EngineError::OutputIoError {
            path: index_dir.to_path_buf(),
            source: e,
        })?;
        let writer = Self::open_file(index_dir, 0)?;
        Ok(Self {
            index_dir: index_dir.to_path_buf(),
            max_blocks_per_file,
            chunk_size: chunk_size.min(MAX_POSTINGS_PER_CHUNK),
            current_file_id: 0,
            current_file_blocks: 0,
            current_writer: writer,
            current_block: BlockBuilder::new(),
            global_chunk_count: 0,
        })
    }

    fn open_file(index_dir: &Path, file_id: u32) -> EngineResult<BufWriter<File>> {
        let path = index_dir.join(index_file_name(file_id));
        let file = File::create(&path).map_err(|e| EngineError::OutputIoError { path, source: e })?;
        Ok(BufWriter::new(file))
    }

    /// Encodes one term's merged postings, returning its `(startChunk,
    /// endChunk)` global range (0-based, inclusive) for the lexicon.
    pub fn write_term(
        &mut self,
        postings: &[Posting],
        doc_len: impl Fn(u32) -> u32,
        avg_doc_len: f64,
        params: &Bm25Params,
    ) -> EngineResult<(u32, u32)> {
        let n_t = postings.len() as u32;
        let start_chunk = self.global_chunk_count;
        for group in postings.chunks(self.chunk_size) {
            let doc_ids: Vec<u32> = group.iter().map(|p| p.doc_id).collect();
            let impact_bytes: Vec<u8> = group
                .iter()
                .map(|p| {
                    let score =
                        params.score(p.freq, doc_len(p.doc_id), avg_doc_len, params.n, n_t);
                    crate::compressor::impact::quantize(score)
                })
                .collect();
            let (bytes, last_doc_id) = encode_chunk(&doc_ids, &impact_bytes);
            self.push_chunk(bytes, last_doc_id)?;
        }
        let end_chunk = self.global_chunk_count - 1;
        Ok((start_chunk, end_chunk))
    }

    fn push_chunk(&mut self, bytes: Vec<u8>, last_doc_id: u32) -> EngineResult<()> {
        if self.current_block.is_full() {
            self.flush_block()?;
        }
        self.current_block.push_chunk(bytes, last_doc_id);
        self.global_chunk_count += 1;
        Ok(())
    }

    fn flush_block(&mut self) -> EngineResult<()> {
        if self.current_block.is_empty() {
            return Ok(());
        }
        let bytes = self.current_block.encode();
        self.current_writer
            .write_all(&bytes)
            .map_err(|e| EngineError::OutputIoError {
                path: self.index_dir.join(index_file_name(self.current_file_id)),
                source: e,
            })?;
        self.current_block = BlockBuilder::new();
        self.current_file_blocks += 1;
        if self.current_file_blocks >= self.max_blocks_per_file {
            self.roll_file()?;
        }
        Ok(())
    }

    fn roll_file(&mut self) -> EngineResult<()> {
        self.current_writer
            .flush()
            .map_err(|e| EngineError::OutputIoError {
                path: self.index_dir.join(index_file_name(self.current_file_id)),
                source: e,
            })?;
        self.current_file_id += 1;
        self.current_file_blocks = 0;
        self.current_writer = Self::open_file(&self.index_dir, self.current_file_id)?;
        info!("rolled to index file {}", self.current_file_id);
        Ok(())
    }

    pub fn finish(mut self) -> EngineResult<()> {
        self.flush_block()?;
        self.current_writer
            .flush()
            .map_err(|e| EngineError::OutputIoError {
                path: self.index_dir.join(index_file_name(self.current_file_id)),
                source: e,
            })?;
        info!(
            "index build finished: {} chunk(s) across {} file(s)",
            self.global_chunk_count,
            self.current_file_id + 1
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::bm25::Bm25Params;
    use tempfile::tempdir;

    #[test]
    fn single_term_under_chunk_size_yields_one_chunk() {
        let dir = tempdir().unwrap();
        let mut enc = IndexEncoder::create(dir.path(), 24_000, 128).unwrap();
        let postings = vec![Posting::new(0, 1), Posting::new(1, 2)];
        let params = Bm25Params::new(1.2, 0.75, 10);
        let (start, end) = enc
            .write_term(&postings, |_| 5, 5.0, &params)
            .unwrap();
        assert_eq!(start, 0);
        assert_eq!(end, 0);
        enc.finish().unwrap();
        assert!(dir.path().join("index_0.bin").exists());
    }

    #[test]
    fn term_spanning_multiple_chunks_gets_contiguous_range() {
        let dir = tempdir().unwrap();
        let mut enc = IndexEncoder::create(dir.path(), 24_000, 128).unwrap();
        let postings: Vec<Posting> = (0..300).map(|i| Posting::new(i, 1)).collect();
        let params = Bm25Params::new(1.2, 0.75, 1000);
        let (start, end) = enc.write_term(&postings, |_| 10, 10.0, &params).unwrap();
        assert_eq!(start, 0);
        assert_eq!(end, 2); // ceil(300/128) - 1
        enc.finish().unwrap();
    }

    #[test]
    fn file_rolls_over_when_block_cap_reached() {
        let dir = tempdir().unwrap();
        let mut enc = IndexEncoder::create(dir.path(), 2, 128).unwrap();
        let params = Bm25Params::new(1.2, 0.75, 1000);
        // Each term uses exactly one chunk; pushing enough terms forces
        // more than 2 blocks' worth of chunks (128 per block).
        for t in 0..(64 * 3) {
            let postings = vec![Posting::new(t as u32, 1)];
            enc.write_term(&postings, |_| 10, 10.0, &params).unwrap();
        }
        enc.finish().unwrap();
        assert!(dir.path().join("index_0.bin").exists());
        assert!(dir.path().join("index_1.bin").exists());
    }
}
