//! Comma-separated tag parsing and the tag-frequency index.

use crate::models::{BatchPosition, ImageRecord};
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 10;

/// Splits an annotation on `,`, trimming each tag and dropping empty ones.
pub fn split_tags(annotation: &str) -> Vec<&str> {
    annotation
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn join_tags<'a, I>(tags: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter().collect::<Vec<_>>().join(",")
}

/// Drops every segment equal to `tag`. Empty segments are kept, so
/// `"cat,,dog"` minus `dog` is `"cat,"`.
pub fn remove_tag(annotation: &str, tag: &str) -> String {
    annotation
        .split(',')
        .map(str::trim)
        .filter(|t| *t != tag)
        .collect::<Vec<_>>()
        .join(",")
}

/// Joins `content` onto the trimmed annotation, skipping the separator when
/// there is nothing to join onto.
pub fn insert_tags(annotation: &str, content: &str, position: BatchPosition) -> String {
    let current = annotation.trim();
    if current.is_empty() {
        return content.to_string();
    }
    match position {
        BatchPosition::Start => format!("{content},{current}"),
        BatchPosition::End => format!("{current},{content}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Most frequent tags across a registry, highest count first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    entries: Vec<TagCount>,
}

impl TagIndex {
    /// Ties keep the order in which tags were first seen.
    pub fn compute<'a, I>(records: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = &'a ImageRecord>,
    {
        let mut entries: Vec<TagCount> = Vec::new();
        let mut slots: HashMap<&'a str, usize> = HashMap::new();
        for record in records {
            for tag in split_tags(&record.annotation) {
                match slots.get(tag) {
                    Some(&slot) => entries[slot].count += 1,
                    None => {
                        slots.insert(tag, entries.len());
                        entries.push(TagCount {
                            tag: tag.to_string(),
                            count: 1,
                        });
                    }
                }
            }
        }
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(limit);
        Self { entries }
    }

    pub fn entries(&self) -> &[TagCount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, tag: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.tag == tag).map(|e| e.count)
    }
}
