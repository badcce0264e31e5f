use notelinker_triggers::MatchSpan;
use tracing::{debug, warn};

use crate::host::BufferHost;
use crate::lookup::{IssueResult, IssueSearcher, LookupError};

/// Terminal state of one expansion run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpansionOutcome {
    /// The placeholder became a resolved ticket reference.
    Resolved { key: String, summary: String },
    /// The lookup returned nothing; the line was reverted.
    Empty,
    /// The lookup failed; the line was reverted.
    Failed,
}

/// An expansion in its `Searching` state: the marker is visible in the
/// buffer and the lookup is outstanding. All terminal writes target the line
/// index captured here; if the user edits that line in the meantime, the
/// terminal write overwrites it (last write wins, no conflict detection).
#[derive(Debug)]
pub struct PendingExpansion {
    line_index: usize,
    original: String,
    marker_line: String,
    marker_span: MatchSpan,
    term: String,
}

/// `Idle → Searching`: snapshots the line, swaps the placeholder span for a
/// visible `(searching...)` marker, and returns the pending half of the
/// protocol. Returns `None` when the line is gone or the span no longer
/// falls on character boundaries of its current text.
pub fn begin_expansion<H: BufferHost>(
    host: &mut H,
    line_index: usize,
    span: MatchSpan,
    payload: &str,
) -> Option<PendingExpansion> {
    let original = host.line(line_index)?;
    if span.end > original.len()
        || !original.is_char_boundary(span.start)
        || !original.is_char_boundary(span.end)
    {
        return None;
    }

    let marker = format!("[[JIRA:{payload} (searching...)]]");
    let mut marker_line =
        String::with_capacity(original.len() - span.len() + marker.len());
    marker_line.push_str(&original[..span.start]);
    marker_line.push_str(&marker);
    marker_line.push_str(&original[span.end..]);

    host.set_line(line_index, &marker_line);
    debug!(line = line_index, term = payload.trim(), "issue lookup started");

    Some(PendingExpansion {
        line_index,
        original,
        marker_span: MatchSpan {
            start: span.start,
            end: span.start + marker.len(),
        },
        marker_line,
        term: payload.trim().to_string(),
    })
}

impl PendingExpansion {
    /// Search term sent to the collaborator (the trimmed payload).
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Applies one of the three terminal transitions. Empty and failed
    /// lookups revert the line and surface a notice; errors stop here.
    pub fn finish<H: BufferHost>(
        self,
        host: &mut H,
        result: Result<Vec<IssueResult>, LookupError>,
    ) -> ExpansionOutcome {
        match result {
            Ok(results) if !results.is_empty() => {
                let chosen = results
                    .iter()
                    .find(|issue| issue.key.eq_ignore_ascii_case(&self.term))
                    .unwrap_or(&results[0]);
                let token = format!("[[JIRA:{} - {}]]", chosen.key, chosen.summary);

                let mut text = String::with_capacity(
                    self.marker_line.len() - self.marker_span.len() + token.len(),
                );
                text.push_str(&self.marker_line[..self.marker_span.start]);
                text.push_str(&token);
                text.push_str(&self.marker_line[self.marker_span.end..]);
                host.set_line(self.line_index, &text);
                debug!(line = self.line_index, key = %chosen.key, "issue reference resolved");

                ExpansionOutcome::Resolved {
                    key: chosen.key.clone(),
                    summary: chosen.summary.clone(),
                }
            }
            Ok(_) => {
                host.set_line(self.line_index, &self.original);
                host.notify(&format!("No matching issue for \"{}\"", self.term));
                ExpansionOutcome::Empty
            }
            Err(err) => {
                warn!(line = self.line_index, error = %err, "issue lookup failed");
                host.set_line(self.line_index, &self.original);
                host.notify(&format!("Issue lookup failed: {err}"));
                ExpansionOutcome::Failed
            }
        }
    }
}

/// Runs the whole protocol in one call: marker in, lookup, terminal
/// transition. Returns `None` when the expansion could not start.
pub fn expand_once<H, S>(
    host: &mut H,
    searcher: &S,
    line_index: usize,
    span: MatchSpan,
    payload: &str,
) -> Option<ExpansionOutcome>
where
    H: BufferHost,
    S: IssueSearcher + ?Sized,
{
    let pending = begin_expansion(host, line_index, span, payload)?;
    let result = searcher.search_issues(pending.term());
    Some(pending.finish(host, result))
}
