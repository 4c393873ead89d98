#![forbid(unsafe_code)]

//! Submitted-input history.
//!
//! Entries are kept most recent first and are unique: submitting an entry
//! that already exists moves it to the front. Browsing walks an index from
//! "not browsing" through `0..len`.

/// Most-recent-first input history with a browse cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    index: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry`, moving an existing copy to the front. Blank entries
    /// are ignored. Returns whether anything was recorded.
    pub fn push(&mut self, entry: &str) -> bool {
        if entry.trim().is_empty() {
            return false;
        }
        if let Some(at) = self.entries.iter().position(|e| e == entry) {
            let existing = self.entries.remove(at);
            self.entries.insert(0, existing);
        } else {
            self.entries.insert(0, entry.to_string());
        }
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Browse position, `None` when not browsing.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Stop browsing.
    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Step to the next older entry. `None` when there is none.
    pub fn older(&mut self) -> Option<&str> {
        let next = self.index.map_or(0, |i| i + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.index = Some(next);
        Some(&self.entries[next])
    }

    /// Step to the next newer entry. `None` at the newest entry or when not
    /// browsing.
    pub fn newer(&mut self) -> Option<&str> {
        let next = self.index?.checked_sub(1)?;
        self.index = Some(next);
        Some(&self.entries[next])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}
