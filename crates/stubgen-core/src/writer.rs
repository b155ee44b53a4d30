//! Source-text assembly with explicit indentation tracking.
//!
//! Indentation is a counter threaded through the rendering traversal,
//! incremented and decremented symmetrically around each nested construct.
//! It is never inferred from the output text and never global, so emission
//! stays correct no matter how many lines a formatter fragment produces.

const INDENT_UNIT: &str = "    ";

/// Accumulates generated source text at a tracked nesting level.
#[derive(Debug, Default)]
pub struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting level.
    pub fn indent_level(&self) -> usize {
        self.indent
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "unbalanced dedent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write one line at the current indentation. Empty input produces a
    /// blank line without trailing whitespace.
    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str(INDENT_UNIT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Write each line of the slice at the current indentation.
    pub fn lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        for l in lines {
            self.line(l.as_ref());
        }
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write a pre-indented block verbatim, as returned by formatter
    /// fragments that manage their own indentation (doc blocks).
    pub fn raw(&mut self, block: &str) {
        self.out.push_str(block);
    }

    /// Open a brace-delimited construct: header line, `{`, indent.
    pub fn open(&mut self, header: &str) {
        self.line(header);
        self.line("{");
        self.indent();
    }

    /// Close a construct opened with [`SourceWriter::open`].
    pub fn close(&mut self) {
        self.dedent();
        self.line("}");
    }

    pub fn into_string(self) -> String {
        self.out
    }
}
