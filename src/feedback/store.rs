//! Feedback storage backends.

use std::sync::RwLock;

use super::Feedback;

/// A newest-first list of feedback entries.
pub trait FeedbackStore: Send + Sync {
    /// Adds `item` at the head of the list.
    fn prepend(&self, item: Feedback) -> Result<(), String>;

    /// Up to `limit` entries, newest first.
    fn list(&self, limit: usize) -> Result<Vec<Feedback>, String>;

    /// Applies `edit` to the entry with `id`. Returns false if there is none.
    fn modify(&self, id: &str, edit: &mut dyn FnMut(&mut Feedback)) -> Result<bool, String>;
}

/// In-process store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryListStore {
    items: RwLock<Vec<Feedback>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackStore for MemoryListStore {
    fn prepend(&self, item: Feedback) -> Result<(), String> {
        let mut items = self.items.write().map_err(|e| e.to_string())?;
        items.insert(0, item);
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<Feedback>, String> {
        let items = self.items.read().map_err(|e| e.to_string())?;
        Ok(items.iter().take(limit).cloned().collect())
    }

    fn modify(&self, id: &str, edit: &mut dyn FnMut(&mut Feedback)) -> Result<bool, String> {
        let mut items = self.items.write().map_err(|e| e.to_string())?;
        match items.iter_mut().find(|f| f.id == id) {
            Some(item) => {
                edit(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
