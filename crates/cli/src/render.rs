use std::fmt::{self, Write};
use tagger_core::view::{Frame, TagChip};

pub fn tags_line(tags: &[TagChip]) -> String {
    if tags.is_empty() {
        return "(no tags)".to_string();
    }
    tags.iter()
        .map(|c| {
            if c.active {
                format!("[{} {}]", c.tag, c.count)
            } else {
                format!("{} {}", c.tag, c.count)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Plain-text rendering of a frame. Tiles are numbered from 1.
pub fn frame_text(frame: &Frame, theme_marker: &str) -> String {
    let mut out = String::new();
    match write_frame(&mut out, frame, theme_marker) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

fn write_frame(out: &mut impl Write, frame: &Frame, theme_marker: &str) -> fmt::Result {
    let filter = frame
        .active_tag
        .as_deref()
        .map(|t| format!(" (filter: {t})"))
        .unwrap_or_default();
    writeln!(
        out,
        "{theme_marker}  {} of {} images{filter}",
        frame.tiles.len(),
        frame.total
    )?;
    writeln!(out, "tags: {}", tags_line(&frame.tags))?;
    for (i, tile) in frame.tiles.iter().enumerate() {
        writeln!(out, "{:>4}. {}", i + 1, tile.name)?;
    }
    if let Some(preview) = &frame.preview {
        let position = preview
            .position
            .map(|p| format!(" #{}", p + 1))
            .unwrap_or_default();
        writeln!(out, "---")?;
        writeln!(out, "preview{position}: {}", preview.image_path)?;
        if !preview.image_available {
            writeln!(out, "(image unavailable)")?;
        }
        writeln!(out, "annotation: {}", preview.annotation)?;
    }
    Ok(())
}
