//! Newline framing across reads.
//!
//! A [`LineAssembler`] owns the partial line carried between reads. Each call
//! to [`LineAssembler::feed`] consumes one chunk and returns the lines it
//! completed. A line that reaches `max_message_size - 1` bytes without a
//! newline is emitted as-is; the byte that hit the cap is consumed as the
//! split point and scanning continues in a fresh line. A line of `len >=
//! max_message_size` bytes therefore yields `ceil(len / max_message_size)`
//! messages, each strictly under the cap.

/// Splits raw chunks into newline-terminated messages.
#[derive(Debug, Clone)]
pub struct LineAssembler {
    line: Vec<u8>,
    cap: usize,
    /// The current line was started by a forced split and has no bytes yet.
    split: bool,
}

impl LineAssembler {
    /// `max_message_size` must be at least 2 (config validation enforces it).
    pub fn new(max_message_size: usize) -> Self {
        let cap = max_message_size.saturating_sub(1).max(1);
        Self {
            line: Vec::with_capacity(cap),
            cap,
            split: false,
        }
    }

    /// Feed one chunk, returning every message it completes in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut completed = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                // A newline right after a split closes the split line, not a new empty one.
                if !(self.split && self.line.is_empty()) {
                    completed.push(self.take_line());
                }
                self.split = false;
            } else if self.line.len() == self.cap {
                completed.push(self.take_line());
                self.split = true;
            } else {
                self.line.push(byte);
                self.split = false;
            }
        }
        completed
    }

    /// Length of the in-progress line.
    pub fn cursor(&self) -> usize {
        self.line.len()
    }

    /// Bytes of the in-progress line.
    pub fn pending(&self) -> &[u8] {
        &self.line
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        line
    }
}
