//! Client state and its transitions. Nothing here performs I/O; the session
//! pairs these transitions with server calls.

use crate::editor;
use crate::filter::TagFilter;
use crate::models::{BatchPosition, Direction, ImageRecord, SaveRequest};
use crate::registry::{Registry, Selection};
use crate::tags::{TagIndex, DEFAULT_TOP_N};
use crate::view::{Frame, Preview, TagChip, Tile};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TaggerState {
    registry: Registry,
    selection: Option<Selection>,
    filter: TagFilter,
    tag_index: TagIndex,
    top_n: usize,
}

impl Default for TaggerState {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl TaggerState {
    pub fn new(top_n: usize) -> Self {
        Self {
            registry: Registry::default(),
            selection: None,
            filter: TagFilter::default(),
            tag_index: TagIndex::default(),
            top_n,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<&ImageRecord> {
        self.selection.as_ref().map(|s| &s.record)
    }

    /// What the annotation editor currently holds for the preview.
    pub fn draft(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.draft.as_str())
    }

    pub fn set_draft(&mut self, content: &str) {
        if let Some(selection) = self.selection.as_mut() {
            selection.draft = content.to_string();
        }
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.filter.active()
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }

    /// Registry records passing the active filter, in registry order.
    pub fn visible(&self) -> Vec<&ImageRecord> {
        self.filter.apply(self.registry.records())
    }

    /// Replaces the registry with a fresh scan. The preview stays open but its
    /// position must be resolved again.
    pub fn load_images(&mut self, images: Vec<ImageRecord>) {
        debug!(count = images.len(), "registry replaced");
        self.registry = Registry::new(images);
        if let Some(selection) = self.selection.as_mut() {
            selection.position = None;
        }
        self.refresh();
    }

    pub fn select_by_click(&mut self, record: ImageRecord) {
        self.selection = Some(Selection::clicked(record));
    }

    /// Selects a registry record by path, as a click on its tile would.
    pub fn select_path(&mut self, image_path: &str) -> Option<&ImageRecord> {
        let record = self.registry.find(image_path)?.clone();
        self.select_by_click(record);
        self.selected()
    }

    pub fn advance(&mut self, direction: Direction) -> Option<&ImageRecord> {
        let selection = self.selection.as_mut()?;
        selection.advance(&self.registry, direction)?;
        self.selected()
    }

    pub fn toggle_filter(&mut self, tag: &str) {
        self.filter.toggle(tag);
        self.refresh();
    }

    /// Records a confirmed single save.
    pub fn apply_saved(&mut self, txt_path: &str, content: &str) {
        self.registry.set_annotation(txt_path, content);
        if let Some(selection) = self.selection.as_mut() {
            if selection.record.txt_path == txt_path {
                selection.record.annotation = content.to_string();
            }
        }
        self.refresh();
    }

    /// Optimistically rewrites every record and returns the saves to send.
    pub fn add_batch(&mut self, content: &str, position: BatchPosition) -> Vec<SaveRequest> {
        let saves = editor::add_to_all(&mut self.registry, content, position);
        self.refresh();
        saves
    }

    pub fn delete_tag(&mut self, tag: &str) -> Vec<SaveRequest> {
        let saves = editor::delete_from_all(&mut self.registry, tag);
        self.filter.clear_if(tag);
        self.refresh();
        saves
    }

    pub fn mark_preview_failed(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            selection.image_failed = true;
        }
    }

    pub fn frame(&self) -> Frame {
        Frame {
            tiles: self
                .visible()
                .into_iter()
                .map(|r| Tile {
                    name: r.file_name().to_string(),
                    image_path: r.image_path.clone(),
                })
                .collect(),
            tags: self
                .tag_index
                .entries()
                .iter()
                .map(|e| TagChip {
                    tag: e.tag.clone(),
                    count: e.count,
                    active: self.filter.is_active(&e.tag),
                })
                .collect(),
            active_tag: self.filter.active().map(str::to_string),
            preview: self.selection.as_ref().map(|s| Preview {
                name: s.record.file_name().to_string(),
                image_path: s.record.image_path.clone(),
                annotation: s.draft.clone(),
                position: s.position,
                image_available: !s.image_failed,
            }),
            total: self.registry.len(),
        }
    }

    /// Re-derives the tag index and redraws the preview from its record,
    /// discarding any unsaved draft.
    fn refresh(&mut self) {
        self.tag_index = TagIndex::compute(self.registry.records(), self.top_n);
        if let Some(selection) = self.selection.as_mut() {
            if let Some(current) = self.registry.find(&selection.record.image_path) {
                selection.record = current.clone();
            }
            selection.draft = selection.record.annotation.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TaggerState {
        let mut state = TaggerState::default();
        state.load_images(vec![
            ImageRecord::new("/s/a.jpg", "/s/a.txt", "cat, dog"),
            ImageRecord::new("/s/b.jpg", "/s/b.txt", "dog"),
        ]);
        state
    }

    #[test]
    fn load_computes_tag_index() {
        let s = state();
        let chips: Vec<(String, usize)> = s
            .frame()
            .tags
            .into_iter()
            .map(|c| (c.tag, c.count))
            .collect();
        assert_eq!(chips, vec![("dog".into(), 2), ("cat".into(), 1)]);
        assert_eq!(s.frame().total, 2);
    }

    #[test]
    fn filter_toggle_marks_chip_and_narrows_tiles() {
        let mut s = state();
        s.toggle_filter("dog");
        assert_eq!(s.visible().len(), 2);
        assert!(s.frame().tags.iter().any(|c| c.tag == "dog" && c.active));
        s.toggle_filter("cat");
        assert_eq!(s.frame().tiles.len(), 1);
        assert_eq!(s.frame().tiles[0].name, "a.jpg");
        s.toggle_filter("cat");
        assert_eq!(s.active_tag(), None);
        assert_eq!(s.visible().len(), 2);
    }

    #[test]
    fn delete_clears_matching_filter_and_updates_preview() {
        let mut s = state();
        s.select_path("/s/b.jpg").unwrap();
        s.toggle_filter("dog");
        let saves = s.delete_tag("dog");
        assert_eq!(saves.len(), 2);
        assert_eq!(s.active_tag(), None);
        assert_eq!(s.selected().unwrap().annotation, "");
        assert_eq!(s.tag_index().entries().len(), 1);
    }

    #[test]
    fn batch_add_ignores_filter() {
        let mut s = state();
        s.toggle_filter("cat");
        let saves = s.add_batch("new", BatchPosition::Start);
        assert_eq!(saves.len(), 2);
        assert_eq!(s.registry().records()[1].annotation, "new,dog");
        assert_eq!(s.tag_index().count_of("new"), Some(2));
        assert_eq!(s.active_tag(), Some("cat"));
    }

    #[test]
    fn saved_annotation_updates_registry_and_selection() {
        let mut s = state();
        s.select_path("/s/a.jpg").unwrap();
        s.apply_saved("/s/a.txt", "bird");
        assert_eq!(s.registry().records()[0].annotation, "bird");
        assert_eq!(s.frame().preview.unwrap().annotation, "bird");
        assert_eq!(s.tag_index().count_of("cat"), None);
    }

    #[test]
    fn draft_shows_in_preview_until_redrawn() {
        let mut s = state();
        s.select_path("/s/a.jpg").unwrap();
        s.set_draft("cat, bird");
        assert_eq!(s.draft(), Some("cat, bird"));
        assert_eq!(s.frame().preview.unwrap().annotation, "cat, bird");
        assert_eq!(s.registry().records()[0].annotation, "cat, dog");
        s.toggle_filter("dog");
        assert_eq!(s.draft(), Some("cat, dog"));
    }

    #[test]
    fn reload_resets_position_and_keeps_preview() {
        let mut s = state();
        s.select_path("/s/a.jpg").unwrap();
        s.advance(Direction::Next).unwrap();
        assert_eq!(s.selection().unwrap().position, Some(1));
        s.load_images(vec![
            ImageRecord::new("/s/b.jpg", "/s/b.txt", "dog"),
            ImageRecord::new("/s/c.jpg", "/s/c.txt", ""),
        ]);
        assert_eq!(s.selection().unwrap().position, None);
        let next = s.advance(Direction::Next).unwrap();
        assert_eq!(next.image_path, "/s/c.jpg");
    }

    #[test]
    fn failed_preview_is_blank_until_next_selection() {
        let mut s = state();
        s.select_path("/s/a.jpg").unwrap();
        s.mark_preview_failed();
        assert!(!s.frame().preview.unwrap().image_available);
        s.advance(Direction::Previous).unwrap();
        assert!(s.frame().preview.unwrap().image_available);
    }
}
