use std::borrow::Cow;

/// Something that can be matched by free-text search terms.
pub trait Searchable {
    fn search_term(&self) -> Cow<'_, str>;
}

impl Searchable for String {
    fn search_term(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Searchable for &str {
    fn search_term(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// Restrict a listing to one year folder or leave it whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    All,
    Year(String),
}

/// Items whose search term contains every term, case-insensitively, in their
/// original order. Longer terms are applied first since they narrow fastest.
pub fn filter<T, S>(items: &[T], terms: &[S]) -> Vec<T>
where
    T: Searchable + Clone,
    S: AsRef<str>,
{
    let mut terms: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

    let mut candidates: Vec<(&T, String)> = items
        .iter()
        .map(|item| (item, item.search_term().to_lowercase()))
        .collect();
    for term in &terms {
        if candidates.is_empty() {
            break;
        }
        candidates.retain(|(_, haystack)| haystack.contains(term.as_str()));
    }
    candidates.into_iter().map(|(item, _)| item.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_items_containing_every_term() {
        let items = ["apple pie", "banana bread"];
        assert_eq!(filter(&items, &["pie"]), vec!["apple pie"]);
        assert_eq!(filter(&items, &["A", "e"]), vec!["apple pie", "banana bread"]);
        assert!(filter(&items, &["pie", "bread"]).is_empty());
    }

    #[test]
    fn no_terms_keeps_everything_in_order() {
        let items = vec!["b".to_string(), "a".to_string()];
        let none: [&str; 0] = [];
        assert_eq!(filter(&items, &none), items);
        assert_eq!(filter(&items, &["  "]), items);
    }

    #[test]
    fn empty_input() {
        let items: Vec<String> = Vec::new();
        assert!(filter(&items, &["x"]).is_empty());
    }
}
