//! Confirmation prompts gating destructive commands.

use std::io::{self, BufRead, Write};

/// Yes/no gate in front of delete, reset and clear.
pub trait Confirm {
    /// Returns `true` to proceed, `false` to abort.
    fn confirm(&self, message: &str) -> bool;
}

/// Always proceeds (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Asks on stderr and reads one line from stdin. Anything but `y`/`yes`
/// (or a read failure) aborts.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{message} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::{is_affirmative, AssumeYes, Confirm};

    #[test]
    fn only_explicit_yes_proceeds() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn assume_yes_always_proceeds() {
        assert!(AssumeYes.confirm("Delete everything?"));
    }
}
