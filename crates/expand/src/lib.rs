//! Asynchronous placeholder expansion for issue references.
//!
//! When the line rewriter reports an unresolved `[[JIRA:…]]` placeholder,
//! this crate runs the expansion protocol against an injected buffer
//! capability and an injected issue-search collaborator:
//!
//! ```text
//! Idle → Searching → { Resolved, Empty, Failed }
//! ```
//!
//! `Idle → Searching` swaps the placeholder for a visible "searching" marker
//! synchronously; the lookup call is the only suspension point, and the three
//! terminal transitions write back against the line index captured at start
//! (last write wins, no conflict detection). Lookup failures never propagate
//! past this boundary; the line is reverted and the user gets a notice.

pub mod event;
pub mod expansion;
pub mod host;
pub mod lookup;

pub use event::{handle_edit_event, EventOutcome};
pub use expansion::{begin_expansion, expand_once, ExpansionOutcome, PendingExpansion};
pub use host::{BufferHost, Caret, MemoryHost};
pub use lookup::{IssueResult, IssueSearcher, LookupError, StaticIssueSearcher};
