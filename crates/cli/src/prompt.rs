use std::io::{self, BufRead, Write};
use tagger_core::session::Prompt;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Alerts go to stderr; confirmations read a `y`/`n` line from stdin unless
/// `assume_yes` is set.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt {
    pub assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            eprintln!("? {message} [y/N] y");
            return true;
        }
        eprint!("? {message} [y/N] ");
        let _ = io::stderr().flush();
        let read = || {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        };
        let answer = match Handle::try_current() {
            Ok(h) if h.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(read)
            }
            _ => read(),
        };
        is_yes(&answer.unwrap_or_default())
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
