//! Line framing for hub responses.
//!
//! The hub has no length prefix or end-of-message marker. A reply is read line
//! by line and a [`ResponseFramer`] decides, after each line, whether the
//! reply is complete.

use serde::{Deserialize, Serialize};

/// Legacy one-word success reply.
pub const OK: &str = "OK";

/// How the end of a reply is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    /// Brace blocks, closing parenthesis, `Failed...` and `OK`.
    #[default]
    Auto,
    /// Exactly one line, whatever it contains.
    Line,
}

/// Outcome of feeding one line to a [`ResponseFramer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Continue,
    Complete,
}

/// Accumulates reply lines until the terminator rule fires.
#[derive(Debug, Clone)]
pub struct ResponseFramer {
    terminator: Terminator,
    lines: Vec<String>,
    in_block: bool,
    complete: bool,
}

impl ResponseFramer {
    #[must_use]
    pub fn new(terminator: Terminator) -> Self {
        Self {
            terminator,
            lines: Vec::new(),
            in_block: false,
            complete: false,
        }
    }

    /// Feed one line, without its line ending.
    ///
    /// Lines pushed after completion are ignored.
    pub fn push(&mut self, line: &str) -> Frame {
        if self.complete {
            return Frame::Complete;
        }
        let frame = self.classify(line);
        if line == OK && self.terminator == Terminator::Auto {
            self.lines.clear();
        }
        self.lines.push(line.to_string());
        if frame == Frame::Complete {
            self.complete = true;
        }
        frame
    }

    fn classify(&mut self, line: &str) -> Frame {
        if self.terminator == Terminator::Line || line == OK {
            return Frame::Complete;
        }
        if line.contains('{') {
            self.in_block = true;
        }
        if line.contains('}') {
            return Frame::Complete;
        }
        if !self.in_block && (line.ends_with(')') || line.starts_with("Failed")) {
            return Frame::Complete;
        }
        Frame::Continue
    }

    /// The newline-joined reply.
    #[must_use]
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}
