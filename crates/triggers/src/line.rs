//! Per-edit-event rewriting of a single buffer line.
//!
//! Each edit event runs three passes in strict order and performs at most one
//! action:
//!
//! 1. escape pass — strip one backslash in front of an escaped literal
//!    trigger and stop;
//! 2. lookup pass — if the caret just closed an unresolved `[[JIRA:…]]`
//!    placeholder, hand it to the expansion protocol and stop;
//! 3. literal pass — replace every valid occurrence of the highest-priority
//!    matching literal trigger with the formatted date.
//!
//! The caret offset is a character offset at this boundary; spans are byte
//! offsets internally and converted on the way in and out.

use crate::pattern::{self, MatchSpan, PatternSet};

/// A proposed full-line replacement together with the recomputed caret
/// column (character offset).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEdit {
    pub text: String,
    pub cursor: usize,
}

/// Outcome of scanning one line for one edit event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineAction {
    /// Apply this text and caret to the buffer.
    Edit(LineEdit),
    /// An unresolved placeholder is ready for asynchronous expansion.
    Lookup { span: MatchSpan, payload: String },
}

/// Scans `line` for one edit event. `cursor` is the caret column in
/// characters; `replacement` is the formatted date substituted for literal
/// triggers. Returns `None` when no pass applies.
pub fn rewrite_line(line: &str, cursor: usize, replacement: &str) -> Option<LineAction> {
    let patterns = PatternSet::standard();
    let cursor_byte = byte_offset(line, cursor);

    // Escape pass. One event strips exactly one backslash; literal matching
    // is skipped for the rest of the cycle.
    for trigger in patterns.literal_triggers() {
        let Some(escaped) = trigger.escaped() else {
            continue;
        };
        if let Some(found) = escaped.find(line) {
            let mut text = String::with_capacity(line.len().saturating_sub(1));
            text.push_str(&line[..found.start()]);
            text.push_str(&line[found.start() + 1..]);
            return Some(LineAction::Edit(LineEdit {
                text,
                cursor: cursor.saturating_sub(1),
            }));
        }
    }

    // Lookup pass. Only fires when the caret sits right after a closing `]`
    // or a space, the signal that the user just finished the token.
    if caret_follows_terminator(line, cursor_byte) {
        if let Some(pending) = patterns.pending_lookups(line).into_iter().next() {
            return Some(LineAction::Lookup {
                span: pending.span,
                payload: pending.payload,
            });
        }
    }

    // Literal pass. The first trigger kind with a valid occurrence wins and
    // every valid occurrence of that kind is replaced, right to left.
    for trigger in patterns.literal_triggers() {
        let spans: Vec<MatchSpan> = trigger
            .bare()
            .find_iter(line)
            .filter(|found| !pattern::is_escaped(line, found.start()))
            .map(|found| MatchSpan {
                start: found.start(),
                end: found.end(),
            })
            .collect();
        if spans.is_empty() {
            continue;
        }

        let mut text = line.to_string();
        for span in spans.iter().rev() {
            text.replace_range(span.start..span.end, replacement);
        }
        let new_cursor_byte = recompute_cursor(cursor_byte, &spans, replacement.len());
        return Some(LineAction::Edit(LineEdit {
            cursor: char_offset(&text, new_cursor_byte),
            text,
        }));
    }

    None
}

/// Caret recomputation over the winning trigger's occurrences, in byte
/// offsets. An occurrence whose span strictly contains the caret pins it to
/// the end of that occurrence's replacement; occurrences ending at or before
/// the caret shift it by the length difference.
fn recompute_cursor(cursor: usize, spans: &[MatchSpan], replacement_len: usize) -> usize {
    let mut adjustment = 0isize;
    let mut containing: Option<&MatchSpan> = None;
    for span in spans {
        if span.start < cursor && cursor < span.end {
            containing = Some(span);
        } else if span.end <= cursor {
            adjustment += replacement_len as isize - span.len() as isize;
        }
    }

    let base = match containing {
        Some(span) => (span.start + replacement_len) as isize,
        None => cursor as isize,
    };
    (base + adjustment).max(0) as usize
}

fn caret_follows_terminator(line: &str, cursor_byte: usize) -> bool {
    line[..cursor_byte]
        .chars()
        .next_back()
        .map_or(false, |ch| ch == ']' || ch == ' ')
}

/// Byte offset of the `cursor`-th character, clamped to the end of the line.
fn byte_offset(line: &str, cursor: usize) -> usize {
    line.char_indices()
        .nth(cursor)
        .map(|(index, _)| index)
        .unwrap_or(line.len())
}

fn char_offset(line: &str, byte: usize) -> usize {
    let byte = byte.min(line.len());
    line[..byte].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(action: Option<LineAction>) -> LineEdit {
        match action {
            Some(LineAction::Edit(edit)) => edit,
            other => panic!("expected an edit, got {other:?}"),
        }
    }

    #[test]
    fn brace_call_is_replaced_with_the_date() {
        let result = edit(rewrite_line("Meeting notes for {{today()}}", 29, "2025-09-01"));
        assert_eq!(result.text, "Meeting notes for 2025-09-01");
        assert_eq!(result.cursor, 28);
    }

    #[test]
    fn at_tag_replacement_pins_caret_inside_the_span() {
        let result = edit(rewrite_line("@today review", 6, "09/01/2025"));
        assert_eq!(result.text, "09/01/2025 review");
        assert_eq!(result.cursor, 10);
    }

    #[test]
    fn bare_call_respects_word_boundaries() {
        assert!(rewrite_line("mytoday() stays", 0, "2025-09-01").is_none());
        let result = edit(rewrite_line("due today()", 0, "2025-09-01"));
        assert_eq!(result.text, "due 2025-09-01");
    }

    #[test]
    fn caret_inside_span_lands_after_replacement() {
        // Caret strictly inside `{{today()}}` (span 4..15).
        let result = edit(rewrite_line("due {{today()}} now", 9, "2025-09-01"));
        assert_eq!(result.text, "due 2025-09-01 now");
        assert_eq!(result.cursor, 14);
    }

    #[test]
    fn caret_before_every_occurrence_is_unchanged() {
        let result = edit(rewrite_line("plan: {{today()}}", 3, "2025-09-01"));
        assert_eq!(result.text, "plan: 2025-09-01");
        assert_eq!(result.cursor, 3);
    }

    #[test]
    fn all_occurrences_of_the_winning_kind_are_replaced() {
        let result = edit(rewrite_line("{{today()}} and {{today()}}!", 28, "2025-09-01"));
        assert_eq!(result.text, "2025-09-01 and 2025-09-01!");
        // Two occurrences of length 11 shrink to 10 each.
        assert_eq!(result.cursor, 26);
    }

    #[test]
    fn brace_call_outranks_at_tag_in_one_cycle() {
        let result = edit(rewrite_line("@today vs {{today()}}", 0, "2025-09-01"));
        assert_eq!(result.text, "@today vs 2025-09-01");
    }

    #[test]
    fn escape_strips_one_backslash_and_suppresses_substitution() {
        let result = edit(rewrite_line(r"note \{{today()}}", 17, "2025-09-01"));
        assert_eq!(result.text, "note {{today()}}");
        assert_eq!(result.cursor, 16);
    }

    #[test]
    fn escape_outranks_literal_matching_on_the_same_line() {
        let result = edit(rewrite_line(r"\@today and @today", 0, "2025-09-01"));
        assert_eq!(result.text, "@today and @today");
        assert_eq!(result.cursor, 0);
    }

    #[test]
    fn escaped_occurrences_are_not_valid_literal_matches() {
        // The only brace occurrence is escaped, so BareCall would be next in
        // line, but the escape pass already consumed the event.
        let result = edit(rewrite_line(r"x \{{today()}}", 14, "2025-09-01"));
        assert_eq!(result.text, "x {{today()}}");
    }

    #[test]
    fn lookup_fires_when_caret_closes_the_placeholder() {
        let line = "fix [[JIRA:login bug]]";
        let action = rewrite_line(line, line.chars().count(), "2025-09-01");
        match action {
            Some(LineAction::Lookup { span, payload }) => {
                assert_eq!(payload, "login bug");
                assert_eq!(&line[span.start..span.end], "[[JIRA:login bug]]");
            }
            other => panic!("expected a lookup, got {other:?}"),
        }
    }

    #[test]
    fn lookup_also_fires_after_a_trailing_space() {
        let action = rewrite_line("[[JIRA:login bug]] ", 19, "2025-09-01");
        assert!(matches!(action, Some(LineAction::Lookup { .. })));
    }

    #[test]
    fn lookup_waits_until_the_caret_leaves_the_payload() {
        // Caret sits inside the payload; nothing should fire yet.
        assert!(rewrite_line("[[JIRA:login bug]]", 12, "2025-09-01").is_none());
    }

    #[test]
    fn resolved_references_are_not_expanded_again() {
        let action = rewrite_line("[[JIRA:MU-123 - Fix user login issue]]", 38, "2025-09-01");
        assert!(action.is_none());
    }

    #[test]
    fn lookup_outranks_the_literal_pass() {
        let line = "[[JIRA:login bug]] due @today";
        // Caret right after the closing brackets.
        let action = rewrite_line(line, 18, "2025-09-01");
        assert!(matches!(action, Some(LineAction::Lookup { .. })));
    }

    #[test]
    fn multibyte_prefixes_keep_caret_arithmetic_in_characters() {
        // "héllo — " has 8 characters; the trigger starts at character 8.
        let line = "héllo — {{today()}}";
        let result = edit(rewrite_line(line, line.chars().count(), "2025-09-01"));
        assert_eq!(result.text, "héllo — 2025-09-01");
        assert_eq!(result.cursor, result.text.chars().count());
    }

    #[test]
    fn untouched_lines_yield_no_action() {
        assert!(rewrite_line("nothing to see", 5, "2025-09-01").is_none());
        assert!(rewrite_line("", 0, "2025-09-01").is_none());
    }
}
