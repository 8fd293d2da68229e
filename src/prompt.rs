//! Terminal prompts used by the command-line front end.

use crate::views::Confirm;
use std::io::{self, BufRead, Write};

/// Interpret a yes/no answer. Anything but an explicit yes is a no.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print `message` and read one trimmed line from stdin.
///
/// # Examples
///
/// ```no_run
/// let notes = moviemate::prompt::prompt_line("Notes: ")?;
/// println!("You wrote: {}", notes);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn prompt_line(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Asks on the terminal with a `[y/N]` suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match prompt_line(&format!("{} [y/N] ", prompt)) {
            Ok(answer) => is_yes(&answer),
            Err(e) => {
                log::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Confirms everything, for `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
