//! Trigger detection and replacement engine used across NoteLinker components.
//!
//! The implementation recognises short textual triggers inside a single line
//! of buffer text (`{{today()}}`, `today()`, `@today`, `[[JIRA:…]]`) and
//! rewrites the line while keeping the caret meaningful. A backslash in front
//! of a trigger suppresses it for one edit cycle; the rewriter strips the
//! backslash instead of substituting. The same pattern table drives a
//! single-shot rewriter for file names. Everything in this crate is pure
//! string transformation; the asynchronous issue-reference expansion built on
//! top of it lives in `notelinker_expand`.

pub mod date;
pub mod line;
pub mod name;
pub mod pattern;

pub use date::{format_date, today, DateFormat};
pub use line::{rewrite_line, LineAction, LineEdit};
pub use name::{rewrite_name, NameEdit};
pub use pattern::{
    payload_is_resolved, MatchSpan, PatternSet, PendingLookup, ReplacementPolicy, Trigger,
    TriggerKind,
};
