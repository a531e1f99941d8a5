//! Line-oriented input for manual-entry sources
//!
//! Manual sources never touch the terminal themselves; they read through a
//! [`LineReader`] supplied by the caller. The CLI provides a terminal-backed
//! reader, tests use [`BufLineReader`] over an in-memory buffer.

use crate::error::Result;
use std::io::BufRead;

/// A source of text lines
pub trait LineReader: Send {
    /// Show `prompt` (if the reader has a display) and read one line
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))`: A line without its trailing newline
    /// - `Ok(None)`: Input is exhausted (EOF)
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Tell the operator why an entry was refused
    fn reject(&mut self, _input: &str, _reason: &str) {}
}

/// [`LineReader`] over any buffered reader, ignoring prompts
pub struct BufLineReader<R> {
    inner: R,
}

impl<R: BufRead + Send> BufLineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead + Send> LineReader for BufLineReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
