//! Index-build and query-time constants, overridable from the CLI so the
//! same binary can run against a full 8.8M-document corpus or a handful of
//! lines in a test fixture.

/// Default document count for the shipped `collection.tsv` (spec §1).
pub const DEFAULT_N: u32 = 8_841_822;

/// Postings per chunk before it is sealed (spec §3).
pub const CHUNK_SIZE: usize = 128;

/// Chunks per block before it is sealed (spec §3).
pub const BLOCK_SIZE: usize = 64;

/// Blocks per index file before a new one is started (spec §3).
pub const MAX_BLOCKS_PER_FILE: u32 = 24_000;

/// Results returned per query (spec §4.8).
pub const TOP_K: usize = 20;

/// BM25 k1 (spec §4.7).
pub const BM25_K1: f64 = 1.2;

/// BM25 b (spec §4.7).
pub const BM25_B: f64 = 0.75;

/// Size in bytes of the sliding read buffer each intermediate-file reader
/// keeps in memory during the k-way merge (spec §4.2).
pub const MERGE_READ_BUFFER_BYTES: usize = 48 * 1024 * 1024;

/// Size in bytes of a segment builder's input slice (spec §4.1).
pub const SEGMENT_SLICE_BYTES: usize = 384 * 1024 * 1024;

/// Size in entries of the SPIMI in-memory segment table before it is
/// flushed to an intermediate file (spec §4.1).
pub const SEGMENT_TABLE_FLUSH_ENTRIES: usize = 1_000_000;

/// Constant baked into the log-quantized impact codec (spec §4.4). Part of
/// the on-disk format: changing it invalidates every existing index file.
pub const IMPACT_QUANTIZE_SCALE: f64 = 36.06;

/// Number of slots in the lexicon's DJB2 hash table (spec §4.5): a prime
/// comfortably larger than the expected distinct-term count so probe chains
/// stay short without wasting much memory.
pub const LEXICON_HASH_SLOTS: u64 = 2_000_003;

/// Build-time knobs. `block_size` (the 64-slot header arrays) is not among
/// them: those arrays are fixed-size on disk, part of the wire format
/// itself, not a soft cap like `chunk_size` or `max_blocks_per_file`.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub num_docs_hint: u32,
    pub chunk_size: usize,
    pub max_blocks_per_file: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            num_docs_hint: DEFAULT_N,
            chunk_size: CHUNK_SIZE,
            max_blocks_per_file: MAX_BLOCKS_PER_FILE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub top_k: usize,
    pub k1: f64,
    pub b: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            k1: BM25_K1,
            b: BM25_B,
        }
    }
}
