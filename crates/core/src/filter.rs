//! Active-tag filtering of the registry.
//!
//! Matching is substring containment on the raw annotation, not the parsed
//! tag list: a `cat` filter also keeps `catdog`.

use crate::models::ImageRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    active: Option<String>,
}

impl TagFilter {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, tag: &str) -> bool {
        self.active.as_deref() == Some(tag)
    }

    /// Clicking the active tag clears it; any other tag replaces it.
    pub fn toggle(&mut self, tag: &str) {
        if self.is_active(tag) {
            self.active = None;
        } else {
            self.active = Some(tag.to_string());
        }
    }

    /// Clears the filter if it is exactly `tag`.
    pub fn clear_if(&mut self, tag: &str) -> bool {
        if self.is_active(tag) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn matches(&self, record: &ImageRecord) -> bool {
        match &self.active {
            Some(tag) => record.annotation.contains(tag.as_str()),
            None => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [ImageRecord]) -> Vec<&'a ImageRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ImageRecord> {
        vec![
            ImageRecord::new("a.jpg", "a.txt", "cat, dog"),
            ImageRecord::new("b.jpg", "b.txt", "dog"),
            ImageRecord::new("c.jpg", "c.txt", "catdog"),
            ImageRecord::new("d.jpg", "d.txt", ""),
        ]
    }

    #[test]
    fn no_filter_keeps_everything_in_order() {
        let recs = records();
        let view = TagFilter::default().apply(&recs);
        let paths: Vec<&str> = view.iter().map(|r| r.image_path.as_str()).collect();
        assert_eq!(paths, vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    }

    #[test]
    fn substring_match_preserves_order() {
        let recs = records();
        let mut filter = TagFilter::default();
        filter.toggle("dog");
        let paths: Vec<&str> = filter
            .apply(&recs)
            .iter()
            .map(|r| r.image_path.as_str())
            .collect();
        assert_eq!(paths, vec!["a.jpg", "b.jpg", "c.jpg"]);
        // idempotent for the same registry and filter
        assert_eq!(filter.apply(&recs), filter.apply(&recs));
    }

    #[test]
    fn toggle_clears_or_replaces() {
        let mut filter = TagFilter::default();
        filter.toggle("dog");
        assert_eq!(filter.active(), Some("dog"));
        filter.toggle("cat");
        assert_eq!(filter.active(), Some("cat"));
        filter.toggle("cat");
        assert_eq!(filter.active(), None);
    }

    #[test]
    fn clear_if_only_matches_exact_tag() {
        let mut filter = TagFilter::default();
        filter.toggle("dog");
        assert!(!filter.clear_if("do"));
        assert!(filter.clear_if("dog"));
        assert_eq!(filter.active(), None);
    }
}
