use notelinker_triggers::{rewrite_line, LineAction};

use crate::expansion::{expand_once, ExpansionOutcome};
use crate::host::{BufferHost, Caret};
use crate::lookup::IssueSearcher;

/// What one edit-change notification did to the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// The caret line was rewritten in place (escape strip or literal
    /// substitution) and the caret moved with it.
    Edited,
    /// A placeholder went through the expansion protocol.
    Expanded(ExpansionOutcome),
    /// No trigger applied; the buffer was left alone.
    Ignored,
}

/// Handles one edit event against the caret line: scan, then either apply
/// the proposed edit (exactly one line replace and one caret set) or run the
/// expansion protocol. `replacement` is the pre-formatted date for literal
/// triggers.
pub fn handle_edit_event<H, S>(host: &mut H, searcher: &S, replacement: &str) -> EventOutcome
where
    H: BufferHost,
    S: IssueSearcher + ?Sized,
{
    let caret = host.caret();
    let Some(line) = host.line(caret.line) else {
        return EventOutcome::Ignored;
    };

    match rewrite_line(&line, caret.column, replacement) {
        Some(LineAction::Edit(edit)) => {
            host.set_line(caret.line, &edit.text);
            host.set_caret(Caret::new(caret.line, edit.cursor));
            EventOutcome::Edited
        }
        Some(LineAction::Lookup { span, payload }) => {
            match expand_once(host, searcher, caret.line, span, &payload) {
                Some(outcome) => EventOutcome::Expanded(outcome),
                None => EventOutcome::Ignored,
            }
        }
        None => EventOutcome::Ignored,
    }
}
