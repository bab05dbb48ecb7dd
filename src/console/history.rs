//! Command history: a bounded buffer of commands entered at the prompt.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a command, evicting the oldest at capacity. Repeating the
    /// previous command is not recorded twice.
    pub fn push(&mut self, command: impl Into<String>) {
        let command = command.into();
        if self.capacity == 0 || self.entries.back() == Some(&command) {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(command);
    }

    /// The N most recent entries with their 1-based position in the history
    /// (newest last).
    pub fn recent(&self, n: usize) -> Vec<(usize, &str)> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, e)| (i + 1, e.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
