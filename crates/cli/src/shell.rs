//! Interactive session: one command per line, keyboard-style navigation.

use crate::render;
use anyhow::Result;
use std::io::Write;
use tagger_core::editor::{BatchHandle, BatchSummary};
use tagger_core::error::TaggerError;
use tagger_core::models::{BatchPosition, Direction};
use tagger_core::session::TaggerSession;
use tagger_core::theme::{PreferenceStore, ThemePreference};
use tracing::debug;

pub const HELP: &str = "\
commands:
  ls                     list visible images
  tags                   show the most frequent tags
  scan <folder>          rescan a folder
  open <n|path>          preview image n of the list (or by path)
  n | next, p | prev     step through all images
  filter <tag>           toggle the tag filter
  edit <text>            live-edit the annotation (saved after a pause)
  save [text]            save now (defaults to the editor contents)
  add <start|end> <text> add text to every image
  del <tag>              delete a tag from every image
  image                  fetch the full-size preview image
  theme                  toggle light/dark
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Tags,
    Scan(String),
    Open(String),
    Next,
    Prev,
    Filter(String),
    Edit(String),
    Save(Option<String>),
    Add(BatchPosition, String),
    Delete(String),
    Image,
    Theme,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }
    let (word, rest) = match trimmed.split_once(' ') {
        Some((w, r)) => (w, r),
        None => (trimmed, ""),
    };
    let arg = rest.trim();
    let need = |name: &str| -> Result<String, String> {
        if arg.is_empty() {
            Err(format!("{name} needs an argument"))
        } else {
            Ok(arg.to_string())
        }
    };
    let cmd = match word {
        "ls" | "list" => ShellCommand::List,
        "tags" => ShellCommand::Tags,
        "scan" => ShellCommand::Scan(need("scan")?),
        "open" => ShellCommand::Open(need("open")?),
        "n" | "next" => ShellCommand::Next,
        "p" | "prev" => ShellCommand::Prev,
        "filter" => ShellCommand::Filter(need("filter")?),
        // Keep the text verbatim: an empty edit clears the annotation.
        "edit" => ShellCommand::Edit(rest.to_string()),
        "save" => ShellCommand::Save((!rest.is_empty()).then(|| rest.to_string())),
        "add" => {
            let (position, text) = arg
                .split_once(' ')
                .ok_or_else(|| "usage: add <start|end> <text>".to_string())?;
            ShellCommand::Add(position.parse()?, text.to_string())
        }
        "del" | "delete" => ShellCommand::Delete(need("del")?),
        "image" => ShellCommand::Image,
        "theme" => ShellCommand::Theme,
        "help" | "?" => ShellCommand::Help,
        "q" | "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command: {other} (try help)")),
    };
    Ok(Some(cmd))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<S> {
    session: TaggerSession,
    theme: ThemePreference<S>,
    pending: Vec<BatchHandle>,
}

impl<S: PreferenceStore> Shell<S> {
    pub fn new(session: TaggerSession, theme: ThemePreference<S>) -> Self {
        Self {
            session,
            theme,
            pending: Vec::new(),
        }
    }

    pub fn session(&self) -> &TaggerSession {
        &self.session
    }

    pub fn theme(&self) -> &ThemePreference<S> {
        &self.theme
    }

    pub fn render(&self) -> String {
        render::frame_text(&self.session.frame(), self.theme.marker())
    }

    pub async fn execute(&mut self, cmd: ShellCommand, out: &mut impl Write) -> Result<Flow> {
        match cmd {
            ShellCommand::List => write!(out, "{}", self.render())?,
            ShellCommand::Tags => {
                writeln!(out, "{}", render::tags_line(&self.session.frame().tags))?
            }
            ShellCommand::Scan(folder) => {
                if self.session.scan_folder(&folder).await.is_ok() {
                    write!(out, "{}", self.render())?;
                }
            }
            ShellCommand::Open(target) => {
                let image_path = match target.parse::<usize>() {
                    Ok(n) if n >= 1 => self
                        .session
                        .frame()
                        .tiles
                        .get(n - 1)
                        .map(|t| t.image_path.clone()),
                    _ => Some(target),
                };
                let opened = image_path
                    .and_then(|p| self.session.select_path(&p).map(|_| ()))
                    .is_some();
                if opened {
                    self.write_preview(out)?;
                } else {
                    writeln!(out, "no such image")?;
                }
            }
            ShellCommand::Next => self.step(Direction::Next, out)?,
            ShellCommand::Prev => self.step(Direction::Previous, out)?,
            ShellCommand::Filter(tag) => {
                self.session.toggle_filter(&tag);
                write!(out, "{}", self.render())?;
            }
            ShellCommand::Edit(text) => {
                if let Err(e) = self.session.edit_live(&text) {
                    writeln!(out, "{e}")?;
                }
            }
            ShellCommand::Save(text) => {
                let content = match text {
                    Some(t) => t,
                    None => match self.session.state().draft() {
                        Some(draft) => draft.to_string(),
                        None => {
                            writeln!(out, "{}", TaggerError::NoSelection)?;
                            return Ok(Flow::Continue);
                        }
                    },
                };
                match self.session.save(&content).await {
                    Ok(()) => writeln!(out, "saved")?,
                    Err(TaggerError::NoSelection) => writeln!(out, "{}", TaggerError::NoSelection)?,
                    Err(e) => debug!(error = %e, "save not applied"),
                }
            }
            ShellCommand::Add(position, text) => {
                if let Ok(Some(handle)) = self.session.add_batch(&text, position) {
                    self.pending.push(handle);
                    write!(out, "{}", self.render())?;
                }
            }
            ShellCommand::Delete(tag) => {
                if let Some(handle) = self.session.delete_tag(&tag) {
                    self.pending.push(handle);
                    write!(out, "{}", self.render())?;
                }
            }
            ShellCommand::Image => match self.session.preview_image().await {
                Ok(bytes) => writeln!(out, "image: {} bytes", bytes.len())?,
                Err(TaggerError::NoSelection) => writeln!(out, "{}", TaggerError::NoSelection)?,
                Err(_) => self.write_preview(out)?,
            },
            ShellCommand::Theme => {
                let theme = self.theme.toggle().await?;
                writeln!(out, "{} theme: {theme}", self.theme.marker())?;
            }
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Waits for outstanding batch saves and the pending live edit.
    pub async fn finish(self) -> BatchSummary {
        let mut total = BatchSummary::default();
        for handle in self.pending {
            let summary = handle.settle().await;
            total.sent += summary.sent;
            total.failed += summary.failed;
        }
        self.session.shutdown().await;
        total
    }

    fn step(&mut self, direction: Direction, out: &mut impl Write) -> Result<()> {
        if self.session.advance(direction).is_some() {
            self.write_preview(out)
        } else {
            writeln!(out, "nothing to navigate")?;
            Ok(())
        }
    }

    fn write_preview(&self, out: &mut impl Write) -> Result<()> {
        if let Some(preview) = self.session.frame().preview {
            let position = preview
                .position
                .map(|p| format!("#{} ", p + 1))
                .unwrap_or_default();
            writeln!(out, "{position}{}", preview.image_path)?;
            if !preview.image_available {
                writeln!(out, "(image unavailable)")?;
            }
            writeln!(out, "annotation: {}", preview.annotation)?;
        }
        Ok(())
    }
}
