//! Splits the input TSV (`docId '\t' body`, one document per line) into
//! memory-bounded windows and parses the lines within each window. The
//! corpus file is memory-mapped once; windows are byte ranges into that
//! mapping aligned to line boundaries so no document is split across two
//! windows (spec §4.1).

use std::fs::File;
use std::path::Path;

use log::warn;
use memmap2::Mmap;

use crate::config::SEGMENT_SLICE_BYTES;
use crate::error::{EngineError, EngineResult};

pub struct CorpusFile {
    mmap: Mmap,
    path: std::path::PathBuf,
}

impl CorpusFile {
    pub fn open(path: &Path) -> EngineResult<Self> {
        let file = File::open(path).map_err(|e| EngineError::InputIoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| EngineError::InputIoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            mmap,
            path: path.to_path_buf(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Byte ranges `[start, end)` covering the whole file, each no larger
    /// than `SEGMENT_SLICE_BYTES` and ending exactly on a `\n` (or at EOF).
    pub fn windows(&self) -> Vec<(usize, usize)> {
        windows_of(self.bytes(), SEGMENT_SLICE_BYTES)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn windows_of(data: &[u8], slice_bytes: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let len = data.len();
    while start < len {
        let tentative_end = (start + slice_bytes).min(len);
        let end = if tentative_end == len {
            len
        } else {
            match data[start..tentative_end].iter().rposition(|&b| b == b'\n') {
                Some(rel) => start + rel + 1,
                None => tentative_end,
            }
        };
        if end == start {
            break;
        }
        out.push((start, end));
        start = end;
    }
    out
}

/// A parsed document line: `docId`, then a tab, then the body text.
pub struct ParsedLine<'a> {
    pub doc_id: u32,
    pub body: &'a str,
}

/// Parses every line in `data[start..end]`, calling `on_line` for each
/// well-formed one. Lines missing a tab separator or a numeric docId are
/// logged and skipped (spec §7: `MalformedLine` is recoverable, not
/// fatal during a bulk build).
pub fn for_each_line<'a>(
    path: &Path,
    data: &'a [u8],
    start: usize,
    end: usize,
    mut on_line: impl FnMut(ParsedLine<'a>),
) {
    let mut offset = start;
    for line in data[start..end].split(|&b| b == b'\n') {
        if line.is_empty() {
            offset += 1;
            continue;
        }
        let line = if line.last() == Some(&b'\r') {
            &line[..line.len() - 1]
        } else {
            line
        };
        match parse_line(line) {
            Some(parsed) => on_line(parsed),
            None => warn!(
                "{}: malformed line at byte offset {}, skipping",
                path.display(),
                offset
            ),
        }
        offset += line.len() + 1;
    }
}

fn parse_line(line: &[u8]) -> Option<ParsedLine<'_>> {
    let tab = line.iter().position(|&b| b == b'\t')?;
    let doc_id_str = std::str::from_utf8(&line[..tab]).ok()?;
    let doc_id: u32 = doc_id_str.trim().parse().ok()?;
    let body = std::str::from_utf8(&line[tab + 1..]).ok()?;
    Some(ParsedLine { doc_id, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_split_on_line_boundaries() {
        let data = b"aaa\nbbb\nccc\n";
        let w = windows_of(data, 5);
        for &(s, e) in &w {
            assert!(data[s..e].is_empty() || data[..e].ends_with(b"\n") || e == data.len());
        }
        let rejoined: Vec<u8> = w.iter().flat_map(|&(s, e)| data[s..e].to_vec()).collect();
        assert_eq!(rejoined, data);
    }

    #[test]
    fn single_window_when_smaller_than_slice() {
        let data = b"one\ntwo\n";
        let w = windows_of(data, 1024);
        assert_eq!(w, vec![(0, data.len())]);
    }

    #[test]
    fn parse_line_splits_on_first_tab() {
        let parsed = parse_line(b"42\thello\tworld").unwrap();
        assert_eq!(parsed.doc_id, 42);
        assert_eq!(parsed.body, "hello\tworld");
    }

    #[test]
    fn parse_line_rejects_missing_tab() {
        assert!(parse_line(b"no tab here").is_none());
    }

    #[test]
    fn for_each_line_skips_malformed_and_keeps_well_formed() {
        let data = b"1\tfoo\nbroken\n2\tbar\n";
        let mut seen = Vec::new();
        for_each_line(Path::new("x"), data, 0, data.len(), |p| {
            seen.push((p.doc_id, p.body.to_string()))
        });
        assert_eq!(seen, vec![(1, "foo".to_string()), (2, "bar".to_string())]);
    }
}
