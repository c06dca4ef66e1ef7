use std::fmt;
use std::str::FromStr;

pub use providers::{ImageRecord, SaveRequest};

/// Keyboard navigation through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Where batch content goes relative to the existing annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPosition {
    Start,
    #[default]
    End,
}

impl BatchPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchPosition::Start => "start",
            BatchPosition::End => "end",
        }
    }
}

impl fmt::Display for BatchPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(BatchPosition::Start),
            "end" => Ok(BatchPosition::End),
            other => Err(format!("unknown position: {other} (expected start|end)")),
        }
    }
}
