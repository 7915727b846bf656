//! Fixed-width terminal sets.

use crate::grammar::TerminalId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TerminalSet {
    words: Box<[u64]>,
}

impl TerminalSet {
    pub(crate) fn new(terminals: usize) -> Self {
        Self {
            words: vec![0; terminals.div_ceil(64)].into_boxed_slice(),
        }
    }

    pub(crate) fn insert(&mut self, terminal: TerminalId) -> bool {
        let (word, bit) = (terminal.index() / 64, terminal.index() % 64);
        let before = self.words[word];
        self.words[word] |= 1u64 << bit;
        before != self.words[word]
    }

    /// Adds every member of `other`; returns `true` if anything was added.
    pub(crate) fn union_with(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (word, extra) in self.words.iter_mut().zip(other.words.iter()) {
            let merged = *word | extra;
            changed |= merged != *word;
            *word = merged;
        }
        changed
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..64usize)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .filter_map(move |bit| u16::try_from(index * 64 + bit).ok().map(TerminalId))
        })
    }
}
