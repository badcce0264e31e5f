//! Single-shot trigger rewriting for whole file-name strings.
//!
//! File names carry no caret and are expected to contain at most one
//! trigger, so only the first valid occurrence of the winning literal
//! trigger is replaced. The escape rule is the same as for buffer lines and
//! likewise consumes the whole cycle. Issuing the actual rename is the
//! caller's job; a failed rename is reported there and never retried here.

use crate::pattern::{self, PatternSet};

/// Result of rewriting a file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameEdit {
    pub text: String,
    pub changed: bool,
}

/// Rewrites a file name in one pass: escape stripping first, then the first
/// valid occurrence of the highest-priority literal trigger.
pub fn rewrite_name(name: &str, replacement: &str) -> NameEdit {
    let patterns = PatternSet::standard();

    for trigger in patterns.literal_triggers() {
        let Some(escaped) = trigger.escaped() else {
            continue;
        };
        if let Some(found) = escaped.find(name) {
            let mut text = String::with_capacity(name.len().saturating_sub(1));
            text.push_str(&name[..found.start()]);
            text.push_str(&name[found.start() + 1..]);
            return NameEdit {
                text,
                changed: true,
            };
        }
    }

    for trigger in patterns.literal_triggers() {
        let found = trigger
            .bare()
            .find_iter(name)
            .find(|found| !pattern::is_escaped(name, found.start()));
        if let Some(found) = found {
            let mut text = String::with_capacity(name.len() + replacement.len());
            text.push_str(&name[..found.start()]);
            text.push_str(replacement);
            text.push_str(&name[found.end()..]);
            return NameEdit {
                text,
                changed: true,
            };
        }
    }

    NameEdit {
        text: name.to_string(),
        changed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_occurrence_changes() {
        let edit = rewrite_name("a {{today()}} b {{today()}} c.md", "2025-09-01");
        assert!(edit.changed);
        assert_eq!(edit.text, "a 2025-09-01 b {{today()}} c.md");
    }

    #[test]
    fn priority_matches_the_line_rewriter() {
        let edit = rewrite_name("@today {{today()}}.md", "2025-09-01");
        assert_eq!(edit.text, "@today 2025-09-01.md");
    }

    #[test]
    fn escape_wins_and_strips_one_backslash() {
        let edit = rewrite_name(r"notes \@today.md", "2025-09-01");
        assert!(edit.changed);
        assert_eq!(edit.text, "notes @today.md");
    }

    #[test]
    fn at_tag_in_a_name_is_replaced() {
        let edit = rewrite_name("standup @today.md", "09-01-2025");
        assert_eq!(edit.text, "standup 09-01-2025.md");
    }

    #[test]
    fn untouched_names_are_flagged_unchanged() {
        let edit = rewrite_name("plain-notes.md", "2025-09-01");
        assert!(!edit.changed);
        assert_eq!(edit.text, "plain-notes.md");
    }
}
