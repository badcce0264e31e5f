use std::cell::RefCell;

/// Caret position inside the host buffer: line index plus character column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Caret {
    pub line: usize,
    pub column: usize,
}

impl Caret {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Buffer capability injected into the rewriting and expansion machinery.
/// The buffer and caret are owned by the host editor; this crate reads them
/// once per invocation, proposes new values, and never holds a reference
/// across invocations.
pub trait BufferHost {
    /// Text of the line at `index`, without its line terminator. `None` when
    /// the index is out of range.
    fn line(&self, index: usize) -> Option<String>;

    /// Replaces the whole line at `index`. Out-of-range indices are ignored.
    fn set_line(&mut self, index: usize, text: &str);

    fn caret(&self) -> Caret;

    fn set_caret(&mut self, caret: Caret);

    /// Transient, non-blocking user notice. Fire and forget.
    fn notify(&self, message: &str);
}

/// Plain in-memory buffer host. Backs the batch tooling and the test suites;
/// notices are recorded so callers can drain and display them.
#[derive(Debug, Default)]
pub struct MemoryHost {
    lines: Vec<String>,
    caret: Caret,
    notices: RefCell<Vec<String>>,
}

impl MemoryHost {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            caret: Caret::default(),
            notices: RefCell::new(Vec::new()),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Removes and returns every notice recorded so far.
    pub fn drain_notices(&self) -> Vec<String> {
        self.notices.borrow_mut().drain(..).collect()
    }
}

impl BufferHost for MemoryHost {
    fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).cloned()
    }

    fn set_line(&mut self, index: usize, text: &str) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = text.to_string();
        }
    }

    fn caret(&self) -> Caret {
        self.caret
    }

    fn set_caret(&mut self, caret: Caret) {
        self.caret = caret;
    }

    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_line_ignores_out_of_range_indices() {
        let mut host = MemoryHost::from_text("one\ntwo");
        host.set_line(5, "ghost");
        assert_eq!(host.lines(), ["one", "two"]);
    }

    #[test]
    fn notices_accumulate_until_drained() {
        let host = MemoryHost::default();
        host.notify("first");
        host.notify("second");
        assert_eq!(host.drain_notices(), vec!["first", "second"]);
        assert!(host.drain_notices().is_empty());
    }
}
