//! Tag co-occurrence: which tags have appeared together on a document.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagIndex {
    co_occurring: HashMap<String, BTreeSet<String>>,
}

impl TagIndex {
    pub fn build<'a>(tag_sets: impl IntoIterator<Item = &'a BTreeSet<String>>) -> Self {
        let mut index = TagIndex::default();
        for tags in tag_sets {
            index.add(tags);
        }
        index
    }

    /// Record that all of `tags` occur together.
    pub fn add(&mut self, tags: &BTreeSet<String>) {
        for tag in tags {
            let entry = self.co_occurring.entry(tag.clone()).or_default();
            entry.extend(tags.iter().filter(|t| *t != tag).cloned());
        }
    }

    /// Tags that have appeared together with `tag`.
    pub fn similar(&self, tag: &str) -> BTreeSet<String> {
        self.co_occurring.get(tag).cloned().unwrap_or_default()
    }

    /// Tags that have appeared together with every one of `tags`.
    pub fn associated(&self, tags: &[String]) -> BTreeSet<String> {
        let mut sets = tags.iter().map(|t| self.similar(t));
        let Some(first) = sets.next() else {
            return BTreeSet::new();
        };
        let mut result = sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect());
        for tag in tags {
            result.remove(tag);
        }
        result
    }

    pub fn all_tags(&self) -> BTreeSet<String> {
        self.co_occurring.keys().cloned().collect()
    }

    /// Known tags containing any of `terms`, ignoring case. No terms yields
    /// every tag.
    pub fn available_tags<S: AsRef<str>>(&self, terms: &[S]) -> BTreeSet<String> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self.co_occurring
            .keys()
            .filter(|tag| {
                terms.is_empty() || {
                    let tag = tag.to_lowercase();
                    terms.iter().any(|t| tag.contains(t.as_str()))
                }
            })
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.co_occurring.is_empty()
    }
}
