//! Line-oriented command parsing.
//!
//! The player reads whole lines from stdin; this module maps them to
//! [`Input`] so the app loop never looks at raw text.

/// High-level outcome of parsing one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Finish the current beat and follow its selected exit.
    Next,
    /// Roll back to the previous beat.
    Prev,
    /// Jump to an already reachable beat by name.
    Jump(String),
    /// Finish the current beat through the named exit.
    Choose(String),
    /// Print position, history and predicted length.
    Status,
    /// Start over from the first beat.
    Restart,
    Help,
    Quit,
    /// Blank line.
    None,
    /// Anything we could not make sense of.
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  n, <enter>   next beat
  p            previous beat
  c <label>    take an exit at a branch (a bare label works too)
  j <name>     jump to a beat you have reached before
  s            status
  r            restart
  q            quit";

impl Input {
    /// Parses a line. `branch_labels` are the exits of the current beat, so
    /// that typing a bare label at a branch chooses it.
    pub fn parse(line: &str, branch_labels: &[&str]) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        if let Some(label) = branch_labels.iter().find(|label| **label == line) {
            return Input::Choose((*label).to_owned());
        }

        match (head.to_ascii_lowercase().as_str(), rest) {
            ("", _) => {
                if branch_labels.is_empty() {
                    Input::Next
                } else {
                    Input::None
                }
            }
            ("n" | "next", "") => Input::Next,
            ("p" | "prev" | "back", "") => Input::Prev,
            ("s" | "status", "") => Input::Status,
            ("r" | "restart", "") => Input::Restart,
            ("h" | "help" | "?", "") => Input::Help,
            ("q" | "quit" | "exit", "") => Input::Quit,
            ("j" | "jump", target) if !target.is_empty() => Input::Jump(target.to_owned()),
            ("c" | "choose", label) if !label.is_empty() => Input::Choose(label.to_owned()),
            _ => Input::Unknown(line.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_commands() {
        assert_eq!(Input::parse("n", &[]), Input::Next);
        assert_eq!(Input::parse("  P ", &[]), Input::Prev);
        assert_eq!(Input::parse("j gate", &[]), Input::Jump("gate".into()));
        assert_eq!(Input::parse("jump old mill", &[]), Input::Jump("old mill".into()));
        assert_eq!(Input::parse("q", &[]), Input::Quit);
    }

    #[test]
    fn enter_advances_only_outside_branches() {
        assert_eq!(Input::parse("", &[]), Input::Next);
        assert_eq!(Input::parse("", &["A", "B"]), Input::None);
    }

    #[test]
    fn bare_label_chooses_exit_at_branch() {
        assert_eq!(Input::parse("B", &["A", "B"]), Input::Choose("B".into()));
        assert_eq!(Input::parse("c A", &["A", "B"]), Input::Choose("A".into()));
        // Labels shadow commands only while the branch is showing.
        assert_eq!(Input::parse("n", &["n"]), Input::Choose("n".into()));
        assert_eq!(Input::parse("n", &[]), Input::Next);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(Input::parse("j", &[]), Input::Unknown("j".into()));
        assert_eq!(Input::parse("next please", &[]), Input::Unknown("next please".into()));
    }
}
