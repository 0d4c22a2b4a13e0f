use rustc_hash::FxHashMap;

use crate::record::{Category, RecordId};

/// Per-category key to record map. Entries are write-once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReferenceIndex {
    entries: FxHashMap<Category, FxHashMap<String, RecordId>>,
}

impl CrossReferenceIndex {
    /// Register `key`; on collision the existing entry is kept and returned.
    pub fn insert(
        &mut self,
        category: Category,
        key: impl Into<String>,
        id: RecordId,
    ) -> Result<(), RecordId> {
        let keys = self.entries.entry(category).or_default();
        let key = key.into();
        if let Some(existing) = keys.get(&key) {
            return Err(*existing);
        }
        keys.insert(key, id);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, category: Category, key: &str) -> bool {
        self.find(category, key).is_some()
    }

    #[must_use]
    pub fn find(&self, category: Category, key: &str) -> Option<RecordId> {
        self.entries.get(&category)?.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(FxHashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys registered under `category`, sorted for stable output.
    #[must_use]
    pub fn keys(&self, category: Category) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .get(&category)
            .map(|keys| keys.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::CrossReferenceIndex;
    use crate::record::{Category, RecordId};

    #[test]
    fn insert_is_write_once_per_category() {
        let mut index = CrossReferenceIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.insert(Category::Individual, "I1", RecordId(1)), Ok(()));
        assert_eq!(
            index.insert(Category::Individual, "I1", RecordId(2)),
            Err(RecordId(1))
        );
        assert_eq!(index.find(Category::Individual, "I1"), Some(RecordId(1)));
    }

    #[test]
    fn categories_are_independent_namespaces() {
        let mut index = CrossReferenceIndex::default();
        assert!(index.insert(Category::Individual, "X1", RecordId(1)).is_ok());
        assert!(index.insert(Category::Family, "X1", RecordId(2)).is_ok());
        assert_eq!(index.find(Category::Family, "X1"), Some(RecordId(2)));
        assert!(!index.contains(Category::Source, "X1"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn keys_are_sorted() {
        let mut index = CrossReferenceIndex::default();
        for (n, key) in ["I3", "I1", "I2"].into_iter().enumerate() {
            assert!(index.insert(Category::Individual, key, RecordId(n + 1)).is_ok());
        }
        assert_eq!(index.keys(Category::Individual), vec!["I1", "I2", "I3"]);
        assert!(index.keys(Category::Note).is_empty());
    }
}
