use serde::Serialize;

/// Inline image shown in place of a thumbnail that could not be fetched.
pub const THUMBNAIL_PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="150" height="150"><rect width="100%" height="100%" fill="#ddd"/><text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" fill="#666">Failed to load</text></svg>"##;

/// Everything a front end needs to draw the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub tiles: Vec<Tile>,
    pub tags: Vec<TagChip>,
    pub active_tag: Option<String>,
    pub preview: Option<Preview>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub name: String,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChip {
    pub tag: String,
    pub count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub name: String,
    pub image_path: String,
    pub annotation: String,
    pub position: Option<usize>,
    /// False once the full-size image failed to load.
    pub image_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_serializes_for_json_output() {
        let frame = Frame {
            tiles: vec![Tile {
                name: "a.jpg".into(),
                image_path: "/s/a.jpg".into(),
            }],
            tags: vec![TagChip {
                tag: "cat".into(),
                count: 1,
                active: true,
            }],
            active_tag: Some("cat".into()),
            preview: None,
            total: 3,
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["tiles"][0]["name"], "a.jpg");
        assert_eq!(value["tags"][0]["active"], true);
        assert_eq!(value["active_tag"], "cat");
        assert!(value["preview"].is_null());
        assert_eq!(value["total"], 3);
    }
}
