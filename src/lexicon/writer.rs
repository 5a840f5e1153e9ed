//! Lexicon file writer (spec §6.4): one ASCII line per term, `term SP
//! startChunk SP endChunk LF`, emitted in the same ascending order the
//! k-way merger produces terms in (so the file itself ends up sorted
//! without a separate sort pass).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

pub struct LexiconWriter {
    writer: BufWriter<File>,
    path: std::path::PathBuf,
}

impl LexiconWriter {
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

    pub fn write_entry(&mut self, term: &str, start_chunk: u32, end_chunk: u32) -> EngineResult<()> {
        writeln!(self.writer, "{term} {start_chunk} {end_chunk}").map_err(|e| {
            EngineError::OutputIoError {
                path: self.path.clone(),
                source: e,
            }
        })
    }

    pub fn finish(mut self) -> EngineResult<()> {
        self.writer.flush().map_err(|e| EngineError::OutputIoError {
            path: self.path.clone(),
            source: e,
        })
    }
}
