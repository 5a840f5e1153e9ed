//! Document store (spec §6.6, `[AMBIENT/SUPPLEMENT]`): an append-only flat
//! file of document bodies plus a `(offset, len)` index, both memory-mapped
//! for lookup. Grounded in `motedb`'s use of `memmap2` for its on-disk
//! readers; this crate's own corpus/index readers use the same crate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::error::{EngineError, EngineResult};

pub struct DocStoreWriter {
    body_writer: BufWriter<File>,
    idx_writer: BufWriter<File>,
    offset: u64,
    body_path: std::path::PathBuf,
    idx_path: std::path::PathBuf,
}

impl DocStoreWriter {
    pub fn create(body_path: &Path, idx_path: &Path) -> EngineResult<Self> {
        let body = File::create(body_path).map_err(|e| EngineError::OutputIoError {
            path: body_path.to_path_buf(),
            source: e,
        })?;
        let idx = File::create(idx_path).map_err(|e| EngineError::OutputIoError {
            path: idx_path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            body_writer: BufWriter::new(body),
            idx_writer: BufWriter::new(idx),
            offset: 0,
            body_path: body_path.to_path_buf(),
            idx_path: idx_path.to_path_buf(),
        })
    }

    /// Appends `body`'s UTF-8 bytes and records its `(offset, len)` pair.
    /// Must be called once per docId in ascending docId order.
    pub fn append(&mut self, body: &str) -> EngineResult<()> {
        let bytes = body.as_bytes();
        self.body_writer
            .write_all(bytes)
            .map_err(|e| EngineError::OutputIoError {
                path: self.body_path.clone(),
                source: e,
            })?;
        self.idx_writer
            .write_all(&self.offset.to_le_bytes())
            .map_err(|e| EngineError::OutputIoError {
                path: self.idx_path.clone(),
                source: e,
            })?;
        self.idx_writer
            .write_all(&(bytes.len() as u64).to_le_bytes())
            .map_err(|e| EngineError::OutputIoError {
                path: self.idx_path.clone(),
                source: e,
            })?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    pub fn finish(mut self) -> EngineResult<()> {
        self.body_writer.flush().map_err(|e| EngineError::OutputIoError {
            path: self.body_path.clone(),
            source: e,
        })?;
        self.idx_writer.flush().map_err(|e| EngineError::OutputIoError {
            path: self.idx_path.clone(),
            source: e,
        })
    }
}

/// Read-only, memory-mapped lookup from docId to body text.
pub struct DocStore {
    body: Mmap,
    idx: Mmap,
}

impl DocStore {
    pub fn open(body_path: &Path, idx_path: &Path) -> EngineResult<Self> {
        let open_mmap = |p: &Path| -> EngineResult<Mmap> {
            let f = File::open(p).map_err(|e| EngineError::InputIoError {
                path: p.to_path_buf(),
                source: e,
            })?;
            unsafe { Mmap::map(&f) }.map_err(|e| EngineError::InputIoError {
                path: p.to_path_buf(),
                source: e,
            })
        };
        Ok(Self {
            body: open_mmap(body_path)?,
            idx: open_mmap(idx_path)?,
        })
    }

    pub fn lookup(&self, doc_id: u32) -> Option<String> {
        let entry_offset = doc_id as usize * 16;
        if entry_offset + 16 > self.idx.len() {
            return None;
        }
        let offset = u64::from_le_bytes(self.idx[entry_offset..entry_offset + 8].try_into().unwrap());
        let len = u64::from_le_bytes(self.idx[entry_offset + 8..entry_offset + 16].try_into().unwrap());
        let (offset, len) = (offset as usize, len as usize);
        self.body
            .get(offset..offset + len)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_lookup_roundtrips() {
        let dir = tempdir().unwrap();
        let body_path = dir.path().join("docstore.bin");
        let idx_path = dir.path().join("docstore.idx");
        {
            let mut w = DocStoreWriter::create(&body_path, &idx_path).unwrap();
            w.append("hello world").unwrap();
            w.append("second document").unwrap();
            w.finish().unwrap();
        }
        let store = DocStore::open(&body_path, &idx_path).unwrap();
        assert_eq!(store.lookup(0).as_deref(), Some("hello world"));
        assert_eq!(store.lookup(1).as_deref(), Some("second document"));
        assert_eq!(store.lookup(2), None);
    }
}
