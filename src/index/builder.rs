//! End-to-end offline build: scans the corpus, builds SPIMI segment
//! tables, spills them to intermediate files, k-way merges those files,
//! and encodes the merged postings into the final chunk/block/index-file
//! layout plus the lexicon, document-length file, and document store.
//!
//! The tokenizing main thread feeds a background SPIMI-writer thread over
//! an `mpsc` channel (spec.md §5's ambient note): this mirrors the
//! teacher's `indexer/indexer.rs` spawning `Spmi::single_pass_in_memory_
//! indexing` on its own thread and streaming `Term` values to it, which is
//! a faithful expression of spec §4.1's "segment table is destroyed, a
//! fresh one is built for the next slice" lifecycle rather than a new
//! feature.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use log::info;
use rustc_hash::FxHashMap;

use crate::config::BuildConfig;
use crate::corpus::docstore::DocStoreWriter;
use crate::corpus::doclen::DocLengthWriter;
use crate::corpus::segment::{for_each_line, CorpusFile};
use crate::error::{EngineError, EngineResult};
use crate::index::encoder::IndexEncoder;
use crate::index::intermediate::IntermediateWriter;
use crate::index::merger::KWayMerger;
use crate::index::segment_table::SegmentTable;
use crate::lexicon::writer::LexiconWriter;
use crate::scoring::bm25::Bm25Params;
use crate::tokenizer::Tokenizer;

struct DocumentTerms {
    doc_id: u32,
    term_counts: FxHashMap<String, u32>,
}

/// Runs the whole offline build, writing `index_*.bin`, `lexicon.txt`,
/// `doc_lengths.bin`, `docstore.bin`, and `docstore.idx` into
/// `output_dir`.
pub fn build_index(corpus_path: &Path, output_dir: &Path, config: &BuildConfig) -> EngineResult<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| EngineError::OutputIoError {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let corpus = CorpusFile::open(corpus_path)?;
    let tmp_dir = output_dir.join("tmp");
    std::fs::create_dir_all(&tmp_dir).map_err(|e| EngineError::OutputIoError {
        path: tmp_dir.clone(),
        source: e,
    })?;

    let (tx, rx) = mpsc::channel::<DocumentTerms>();
    let tmp_dir_clone = tmp_dir.clone();
    let writer_handle = thread::spawn(move || spimi_writer_thread(rx, &tmp_dir_clone));

    let mut doc_lengths = DocLengthWriter::create(&output_dir.join("doc_lengths.bin"), config.num_docs_hint)?;
    let mut docstore = DocStoreWriter::create(&output_dir.join("docstore.bin"), &output_dir.join("docstore.idx"))?;
    let tokenizer = Tokenizer::new();
    let mut in_memory_lengths = vec![0u32; config.num_docs_hint as usize];

    for &(start, end) in &corpus.windows() {
        for_each_line(corpus.path(), corpus.bytes(), start, end, |line| {
            let tokens = tokenizer.tokenize(line.body);
            let mut counts: FxHashMap<String, u32> = FxHashMap::default();
            for t in &tokens {
                *counts.entry(t.clone()).or_insert(0) += 1;
            }
            let length = tokens.len() as u32;
            let _ = doc_lengths.set(line.doc_id, length);
            let _ = docstore.append(line.body);
            if (line.doc_id as usize) < in_memory_lengths.len() {
                in_memory_lengths[line.doc_id as usize] = length;
            }
            let _ = tx.send(DocumentTerms {
                doc_id: line.doc_id,
                term_counts: counts,
            });
        });
    }
    drop(tx);
    doc_lengths.finish()?;
    docstore.finish()?;

    let intermediate_paths = writer_handle
        .join()
        .map_err(|_| EngineError::CorruptIndex {
            reason: "SPIMI writer thread panicked".to_string(),
        })??;
    info!("segment building produced {} intermediate file(s)", intermediate_paths.len());

    let avg_doc_len = {
        let non_zero: Vec<u32> = in_memory_lengths.iter().copied().filter(|&l| l > 0).collect();
        if non_zero.is_empty() {
            0.0
        } else {
            non_zero.iter().map(|&l| l as u64).sum::<u64>() as f64 / non_zero.len() as f64
        }
    };
    info!("average document length: {avg_doc_len}");

    let mut merger = KWayMerger::open(&intermediate_paths)?;
    let mut encoder = IndexEncoder::create(output_dir, config.max_blocks_per_file, config.chunk_size)?;
    let mut lexicon_writer = LexiconWriter::create(&output_dir.join("lexicon.txt"))?;
    let params = Bm25Params::new(crate::config::BM25_K1, crate::config::BM25_B, config.num_docs_hint);

    while let Some((term, postings)) = merger.next_merged_term()? {
        let (start, end) = encoder.write_term(
            &postings,
            |doc_id| in_memory_lengths.get(doc_id as usize).copied().unwrap_or(0),
            avg_doc_len.max(1.0),
            &params,
        )?;
        lexicon_writer.write_entry(&term, start, end)?;
    }
    encoder.finish()?;
    lexicon_writer.finish()?;

    let _ = std::fs::remove_dir_all(&tmp_dir);
    Ok(())
}

fn spimi_writer_thread(
    rx: mpsc::Receiver<DocumentTerms>,
    tmp_dir: &Path,
) -> EngineResult<Vec<PathBuf>> {
    let mut table = SegmentTable::new();
    let mut paths = Vec::new();
    let mut segment_id = 0u32;

    let mut flush = |table: &mut SegmentTable, segment_id: &mut u32| -> EngineResult<()> {
        if table.is_empty() {
            return Ok(());
        }
        let path = tmp_dir.join(format!("seg_{segment_id}.tmpidx"));
        let mut writer = IntermediateWriter::create(&path)?;
        table.flush(&mut writer)?;
        writer.finish()?;
        paths.push(path);
        *segment_id += 1;
        Ok(())
    };

    for doc in rx {
        table.add_document(doc.doc_id, &doc.term_counts);
        if table.entry_count() >= crate::config::SEGMENT_TABLE_FLUSH_ENTRIES {
            flush(&mut table, &mut segment_id)?;
        }
    }
    flush(&mut table, &mut segment_id)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builds_a_queryable_index_from_a_tiny_corpus() {
        let dir = tempdir().unwrap();
        let corpus_path = dir.path().join("collection.tsv");
        std::fs::write(
            &corpus_path,
            "0\tthe quick brown fox\n1\tthe lazy dog sleeps\n2\tfox and dog play\n",
        )
        .unwrap();
        let output_dir = dir.path().join("index");
        let config = BuildConfig {
            num_docs_hint: 3,
            ..BuildConfig::default()
        };
        build_index(&corpus_path, &output_dir, &config).unwrap();

        assert!(output_dir.join("lexicon.txt").exists());
        assert!(output_dir.join("index_0.bin").exists());
        assert!(output_dir.join("doc_lengths.bin").exists());
        assert!(output_dir.join("docstore.bin").exists());

        let lexicon = crate::lexicon::table::LexiconTable::load(&output_dir.join("lexicon.txt")).unwrap();
        let range = lexicon.lookup("fox").unwrap();
        let list = crate::query::list_iterator::InvertedList::open(&output_dir, range.start_chunk, range.end_chunk).unwrap();
        let mut list = list;
        let first = list.next_geq(0).unwrap();
        assert_eq!(first, Some(0));
    }
}
