use crate::view::location;

/// Where the current location identifier lives, e.g. a browser's address bar.
pub trait History {
    fn current(&self) -> &str;

    /// Records a new entry without reloading anything.
    fn push(&mut self, location: String);
}

/// Linear history with back and forward, like a browser tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            index: 0,
        }
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(location::BASE)
    }
}

impl History for MemoryHistory {
    fn current(&self) -> &str {
        &self.entries[self.index]
    }

    fn push(&mut self, location: String) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_discards_forward_entries() {
        let mut history = MemoryHistory::default();
        history.push("/?post=a".to_owned());
        history.push("/?post=b".to_owned());
        assert!(history.back());
        assert_eq!(history.current(), "/?post=a");
        history.push("/?post=c".to_owned());
        assert!(!history.forward());
        assert_eq!(history.len(), 3);
        assert!(history.back());
        assert!(history.back());
        assert!(!history.back());
        assert_eq!(history.current(), "/");
    }
}
