//! Compressed chunk encoding (spec §3/§6.3): up to 128 postings for one
//! term, stored as a varbyte stream of docID gaps (baseline reset to 0 at
//! the start of every chunk) immediately followed by one quantized impact
//! byte per posting. There is no length or count prefix inside the chunk
//! itself — `postingCount` is recovered by decoding gaps until the running
//! absolute docID equals the block header's `lastDocId` for that chunk.
//!
//! The teacher's `utils/chunk.rs::Chunk` embeds its own size/count/
//! max-doc-id header per chunk; this format intentionally has none of
//! that, since that bookkeeping lives in the block's fixed-size header
//! arrays instead (see `block.rs`). Only the general "separate the gap
//! stream from the per-posting payload" vocabulary carries over.

use crate::compressor::varbyte;

pub const MAX_POSTINGS_PER_CHUNK: usize = crate::config::CHUNK_SIZE;

/// Encodes `doc_ids` (ascending, len <= 128) and their parallel
/// `impact_bytes` into one chunk's bytes. Returns the encoded bytes and
/// the chunk's last (highest) docId, for the caller to record in the
/// owning block's header.
pub fn encode_chunk(doc_ids: &[u32], impact_bytes: &[u8]) -> (Vec<u8>, u32) {
    assert_eq!(doc_ids.len(), impact_bytes.len());
    assert!(doc_ids.len() <= MAX_POSTINGS_PER_CHUNK);
    let mut out = Vec::new();
    let mut prev = 0u32;
    for &doc_id in doc_ids {
        varbyte::encode_u32(doc_id - prev, &mut out);
        prev = doc_id;
    }
    out.extend_from_slice(impact_bytes);
    (out, prev)
}

/// Decodes a chunk given its raw bytes and the `lastDocId` recorded for it
/// in the block header. Gaps are decoded (accumulating from a zero
/// baseline) until the running docID equals `last_doc_id`; the remaining
/// bytes are exactly one impact byte per decoded posting.
pub fn decode_chunk(bytes: &[u8], last_doc_id: u32) -> Vec<(u32, u8)> {
    let mut doc_ids = Vec::new();
    let mut offset = 0usize;
    let mut running = 0u32;
    loop {
        let (gap, next_offset) = varbyte::decode_u32(bytes, offset);
        running += gap;
        offset = next_offset;
        doc_ids.push(running);
        if running == last_doc_id {
            break;
        }
    }
    let impacts = &bytes[offset..offset + doc_ids.len()];
    doc_ids.into_iter().zip(impacts.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrips_single_posting() {
        let (bytes, last) = encode_chunk(&[42], &[7]);
        assert_eq!(last, 42);
        assert_eq!(decode_chunk(&bytes, last), vec![(42, 7)]);
    }

    #[test]
    fn encode_decode_roundtrips_many_postings() {
        let doc_ids = vec![1, 2, 10, 10_000, 10_005];
        let impacts = vec![1, 2, 3, 4, 5];
        let (bytes, last) = encode_chunk(&doc_ids, &impacts);
        assert_eq!(last, 10_005);
        let decoded = decode_chunk(&bytes, last);
        let expected: Vec<(u32, u8)> = doc_ids.into_iter().zip(impacts).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn gap_baseline_resets_to_zero_per_chunk() {
        let (bytes, _) = encode_chunk(&[5], &[1]);
        let mut out = Vec::new();
        varbyte::encode_u32(5, &mut out);
        assert_eq!(&bytes[..out.len()], &out[..]);
    }

    #[test]
    fn full_sized_chunk_roundtrips() {
        let doc_ids: Vec<u32> = (0..MAX_POSTINGS_PER_CHUNK as u32).map(|i| i * 3 + 1).collect();
        let impacts: Vec<u8> = (0..MAX_POSTINGS_PER_CHUNK as u32).map(|i| (i % 256) as u8).collect();
        let (bytes, last) = encode_chunk(&doc_ids, &impacts);
        let decoded = decode_chunk(&bytes, last);
        assert_eq!(decoded.len(), MAX_POSTINGS_PER_CHUNK);
        assert_eq!(decoded.last().unwrap().0, last);
    }
}
