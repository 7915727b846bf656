//! Scanner states recorded per line, for re-tokenizing only what changed.

use std::ops::Range;

use fgl_syntax::{LineState, ScannedLine};

/// Result of [`LineStates::retokenize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Retokenized {
    /// Lines that were scanned. It extends past the requested range while a
    /// line's state differed from the recorded one.
    pub lines: Range<usize>,
    /// Scan result of each line in [`Self::lines`].
    pub scanned: Vec<ScannedLine>,
}

impl Retokenized {
    /// Lines scanned beyond the requested range.
    #[must_use]
    pub fn overflow(&self, requested_last: usize) -> Range<usize> {
        (requested_last + 1).min(self.lines.end)..self.lines.end
    }
}

/// The scanner state at the end of every line of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStates {
    states: Vec<LineState>,
}

impl LineStates {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines with a recorded state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no line has been scanned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State at the end of `line`, if recorded.
    #[must_use]
    pub fn state_after(&self, line: usize) -> Option<LineState> {
        self.states.get(line).copied()
    }

    /// State a scan of `line` starts in.
    #[must_use]
    pub fn state_before(&self, line: usize) -> LineState {
        line.checked_sub(1)
            .and_then(|previous| self.state_after(previous))
            .unwrap_or(LineState::NEUTRAL)
    }

    /// Forgets the states of `line` and every line after it, for edits that
    /// insert or remove lines.
    pub fn invalidate_from(&mut self, line: usize) {
        self.states.truncate(line);
    }

    /// Scans lines `first..=last` of `lines` and records their states. Scanning
    /// continues after `last` until a line ends in the state recorded for it
    /// before, since only then are the following lines unaffected.
    ///
    /// States of lines past the end of `lines` are dropped.
    pub fn retokenize<S: AsRef<str>>(
        &mut self,
        lines: &[S],
        first: usize,
        last: usize,
    ) -> Retokenized {
        self.states.truncate(lines.len());
        let first = first.min(self.states.len()).min(lines.len());
        let mut scanned = Vec::new();
        let mut line = first;
        while line < lines.len() {
            let result = fgl_syntax::scan_line(lines[line].as_ref(), self.state_before(line));
            let previous = self.state_after(line);
            let state = result.state;
            if line < self.states.len() {
                self.states[line] = state;
            } else {
                self.states.push(state);
            }
            scanned.push(result);
            line += 1;
            if line > last && previous == Some(state) {
                break;
            }
        }
        if line > last.saturating_add(1) {
            tracing::debug!(first, last, end = line, "line states propagated");
        }
        Retokenized {
            lines: first..line,
            scanned,
        }
    }
}
