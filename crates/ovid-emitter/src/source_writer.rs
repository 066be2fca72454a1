//! Output buffer with line/column accounting and checkpoint restore.
//!
//! The writer owns the only mutable emission state: one growable text
//! buffer plus the current line, column and indentation. A [`Position`]
//! taken with [`SourceWriter::position`] is a checkpoint; truncating back
//! to it restores buffer length, line and column exactly, which is what the
//! printer's speculative emission is built on.
//!
//! In line-preserving mode the logical newline [`SourceWriter::write_line`]
//! emits a single space — real newlines are owned exclusively by the
//! printer's per-node line adjustment, so that output line numbers track
//! source line numbers.

use ovid_common::Position;

const INDENT: &str = "    ";

#[derive(Debug)]
pub struct SourceWriter {
    out: String,
    /// 1-based current line.
    line: u32,
    /// 0-based column on the current line, in characters.
    column: u32,
    indent: u32,
    preserve_lines: bool,
}

impl SourceWriter {
    pub fn new(preserve_lines: bool) -> Self {
        Self {
            out: String::new(),
            line: 1,
            column: 0,
            indent: 0,
            preserve_lines,
        }
    }

    pub fn preserve_lines(&self) -> bool {
        self.preserve_lines
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn current_line(&self) -> u32 {
        self.line
    }

    pub fn current_column(&self) -> u32 {
        self.column
    }

    /// The current end of the buffer as a checkpoint.
    pub fn position(&self) -> Position {
        Position::new(self.out.len() as u32, self.line, self.column)
    }

    /// Append text. Newlines are not allowed here — they go through
    /// [`write_line`](Self::write_line) or [`newline`](Self::newline) so the
    /// line accounting stays exact.
    pub fn write(&mut self, text: &str) {
        debug_assert!(!text.contains('\n'), "raw newline in write: {text:?}");
        self.out.push_str(text);
        self.column += text.chars().count() as u32;
    }

    pub fn write_char(&mut self, ch: char) {
        debug_assert!(ch != '\n');
        self.out.push(ch);
        self.column += 1;
    }

    pub fn space(&mut self) {
        self.write(" ");
    }

    /// A logical line break: a real newline, or a space when the printer is
    /// preserving source line numbers.
    pub fn write_line(&mut self) {
        if self.preserve_lines {
            self.space();
        } else {
            self.newline();
        }
    }

    /// An unconditional newline. Used by the per-node line adjustment.
    pub fn newline(&mut self) {
        self.out.push('\n');
        self.line += 1;
        self.column = 0;
    }

    pub fn last_char(&self) -> Option<char> {
        self.out.chars().next_back()
    }

    /// Remove the last character, keeping line/column exact.
    pub fn remove_last_char(&mut self) {
        let Some(ch) = self.out.pop() else { return };
        if ch == '\n' {
            self.line -= 1;
            let tail_start = self.out.rfind('\n').map(|i| i + 1).unwrap_or(0);
            self.column = self.out[tail_start..].chars().count() as u32;
        } else {
            self.column = self.column.saturating_sub(1);
        }
    }

    pub fn remove_last_chars(&mut self, count: usize) {
        for _ in 0..count {
            self.remove_last_char();
        }
    }

    /// Drop a trailing newline if one is present. Returns whether it did.
    pub fn trim_trailing_newline(&mut self) -> bool {
        if self.last_char() == Some('\n') {
            self.remove_last_char();
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Indentation
    // =========================================================================

    pub fn print_indent(&mut self) {
        for _ in 0..self.indent {
            self.write(INDENT);
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    // =========================================================================
    // Checkpoint restore
    // =========================================================================

    /// Roll the buffer back to a checkpoint taken earlier with
    /// [`position`](Self::position). Buffer length, line and column are
    /// restored exactly.
    pub fn truncate_to(&mut self, checkpoint: &Position) {
        self.out.truncate(checkpoint.pos as usize);
        self.line = checkpoint.line;
        self.column = checkpoint.column;
    }
}
