//! The scanned image list and the currently previewed image.

use crate::models::{Direction, ImageRecord};
use tracing::warn;

/// Images of the current scan, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    records: Vec<ImageRecord>,
}

impl Registry {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ImageRecord> {
        self.records.get(position)
    }

    pub fn position_of(&self, image_path: &str) -> Option<usize> {
        self.records.iter().position(|r| r.image_path == image_path)
    }

    pub fn find(&self, image_path: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.image_path == image_path)
    }

    /// Updates the first record using `txt_path`. Returns false when none does.
    pub fn set_annotation(&mut self, txt_path: &str, annotation: &str) -> bool {
        match self.records.iter_mut().find(|r| r.txt_path == txt_path) {
            Some(record) => {
                record.annotation = annotation.to_string();
                true
            }
            None => false,
        }
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut ImageRecord> {
        self.records.iter_mut()
    }
}

/// The previewed image. `position` stays `None` after a click until keyboard
/// navigation first needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub record: ImageRecord,
    pub position: Option<usize>,
    pub image_failed: bool,
    /// Editor contents; reset to the record's annotation whenever the preview is redrawn.
    pub draft: String,
}

impl Selection {
    pub fn clicked(record: ImageRecord) -> Self {
        Self {
            draft: record.annotation.clone(),
            record,
            position: None,
            image_failed: false,
        }
    }

    /// Resolves the position lazily, then steps circularly. `None` when the
    /// registry is empty or the selected image is not part of it.
    pub fn advance(&mut self, registry: &Registry, direction: Direction) -> Option<usize> {
        let n = registry.len();
        if n == 0 {
            return None;
        }
        let current = match self.position.filter(|p| *p < n) {
            Some(p) => p,
            None => match registry.position_of(&self.record.image_path) {
                Some(p) => p,
                None => {
                    warn!(
                        image_path = %self.record.image_path,
                        "selected image is not in the registry"
                    );
                    return None;
                }
            },
        };
        let next = step(current, n, direction);
        *self = Self {
            position: Some(next),
            ..Self::clicked(registry.get(next)?.clone())
        };
        Some(next)
    }
}

pub fn step(position: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Previous => (position + len - 1) % len,
        Direction::Next => (position + 1) % len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: usize) -> Registry {
        Registry::new(
            (0..n)
                .map(|i| ImageRecord::new(format!("/img/{i}.jpg"), format!("/img/{i}.txt"), ""))
                .collect(),
        )
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step(0, 3, Direction::Previous), 2);
        assert_eq!(step(2, 3, Direction::Next), 0);
        assert_eq!(step(1, 3, Direction::Next), 2);
        assert_eq!(step(0, 1, Direction::Next), 0);
    }

    #[test]
    fn first_advance_resolves_clicked_position() {
        let reg = registry(4);
        let mut sel = Selection::clicked(reg.get(2).unwrap().clone());
        assert_eq!(sel.position, None);
        assert_eq!(sel.advance(&reg, Direction::Next), Some(3));
        assert_eq!(sel.record.image_path, "/img/3.jpg");
        assert_eq!(sel.advance(&reg, Direction::Next), Some(0));
    }

    #[test]
    fn navigation_replaces_the_draft() {
        let mut reg = registry(2);
        reg.set_annotation("/img/1.txt", "cat");
        let mut sel = Selection::clicked(reg.get(0).unwrap().clone());
        sel.draft = "unsaved".into();
        sel.advance(&reg, Direction::Next).unwrap();
        assert_eq!(sel.draft, "cat");
    }

    #[test]
    fn n_steps_return_to_start() {
        for n in 1..6 {
            let reg = registry(n);
            let mut sel = Selection::clicked(reg.get(n / 2).unwrap().clone());
            let start = sel.record.image_path.clone();
            for _ in 0..n {
                sel.advance(&reg, Direction::Next).unwrap();
            }
            assert_eq!(sel.record.image_path, start);
        }
    }

    #[test]
    fn unknown_or_empty_is_noop() {
        let reg = registry(3);
        let stray = ImageRecord::new("/elsewhere.jpg", "/elsewhere.txt", "x");
        let mut sel = Selection::clicked(stray.clone());
        assert_eq!(sel.advance(&reg, Direction::Previous), None);
        assert_eq!(sel.record, stray);
        assert_eq!(sel.advance(&Registry::default(), Direction::Next), None);
    }

    #[test]
    fn set_annotation_by_txt_path() {
        let mut reg = registry(2);
        assert!(reg.set_annotation("/img/1.txt", "cat"));
        assert_eq!(reg.find("/img/1.jpg").unwrap().annotation, "cat");
        assert!(!reg.set_annotation("/nope.txt", "cat"));
    }
}
