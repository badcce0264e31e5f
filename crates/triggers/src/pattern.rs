use once_cell::sync::Lazy;
use regex::Regex;

/// The four recognised trigger families, listed in priority order. Within one
/// edit cycle the first kind that produces a valid match wins and the
/// remaining kinds are not evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerKind {
    BraceCall,
    BareCall,
    AtTag,
    BracketLookup,
}

/// How a matched trigger is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Substituted locally with the formatted current date.
    LiteralDate,
    /// Resolved through an asynchronous collaborator lookup.
    ExternalLookup,
}

/// Byte span of a match within a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// An unresolved `[[JIRA:…]]` placeholder found on a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingLookup {
    pub span: MatchSpan,
    pub payload: String,
}

/// One trigger definition: the bare matcher, the escaped matcher (a single
/// backslash immediately in front of the bare form) and the replacement
/// policy. Lookup triggers have no escaped form.
#[derive(Debug)]
pub struct Trigger {
    kind: TriggerKind,
    policy: ReplacementPolicy,
    bare: Regex,
    escaped: Option<Regex>,
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    pub fn bare(&self) -> &Regex {
        &self.bare
    }

    pub fn escaped(&self) -> Option<&Regex> {
        self.escaped.as_ref()
    }
}

/// Declarative, priority-ordered table of trigger definitions, compiled once
/// at first use.
#[derive(Debug)]
pub struct PatternSet {
    triggers: Vec<Trigger>,
}

static STANDARD: Lazy<PatternSet> = Lazy::new(|| {
    let compile = |source: &str| Regex::new(source).expect("trigger pattern compiles");
    PatternSet {
        triggers: vec![
            Trigger {
                kind: TriggerKind::BraceCall,
                policy: ReplacementPolicy::LiteralDate,
                bare: compile(r"\{\{today\(\)\}\}"),
                escaped: Some(compile(r"\\\{\{today\(\)\}\}")),
            },
            Trigger {
                kind: TriggerKind::BareCall,
                policy: ReplacementPolicy::LiteralDate,
                bare: compile(r"\btoday\(\)"),
                escaped: Some(compile(r"\\today\(\)")),
            },
            Trigger {
                kind: TriggerKind::AtTag,
                policy: ReplacementPolicy::LiteralDate,
                bare: compile(r"@today\b"),
                escaped: Some(compile(r"\\@today\b")),
            },
            Trigger {
                kind: TriggerKind::BracketLookup,
                policy: ReplacementPolicy::ExternalLookup,
                bare: compile(r"\[\[JIRA:([^\]]+)\]\]"),
                escaped: None,
            },
        ],
    }
});

static RESOLVED_PAYLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+-[0-9]+( - .*)?$").expect("resolved-payload pattern compiles"));

impl PatternSet {
    /// The standard trigger table shared by every rewriter.
    pub fn standard() -> &'static PatternSet {
        &STANDARD
    }

    /// Literal triggers in priority order (BraceCall, BareCall, AtTag).
    pub fn literal_triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers
            .iter()
            .filter(|trigger| trigger.policy == ReplacementPolicy::LiteralDate)
    }

    /// The asynchronous `[[JIRA:…]]` trigger.
    pub fn bracket_lookup(&self) -> &Trigger {
        self.triggers
            .iter()
            .find(|trigger| trigger.policy == ReplacementPolicy::ExternalLookup)
            .expect("standard table contains the lookup trigger")
    }

    /// Every `[[JIRA:…]]` placeholder on the line whose payload does not
    /// already read as a resolved ticket reference.
    pub fn pending_lookups(&self, line: &str) -> Vec<PendingLookup> {
        self.bracket_lookup()
            .bare()
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let payload = caps.get(1)?.as_str();
                if payload_is_resolved(payload.trim()) {
                    return None;
                }
                Some(PendingLookup {
                    span: MatchSpan {
                        start: whole.start(),
                        end: whole.end(),
                    },
                    payload: payload.to_string(),
                })
            })
            .collect()
    }
}

/// An occurrence is valid only when the byte immediately before the match is
/// not a backslash. Matchers run over the whole line, so the look-behind is a
/// plain byte inspection, the same way whole-word checks peek at neighbours.
pub fn is_escaped(line: &str, match_start: usize) -> bool {
    match_start > 0 && line.as_bytes()[match_start - 1] == b'\\'
}

/// Whether a lookup payload already names a resolved ticket reference:
/// uppercase letters, a hyphen, digits, optionally followed by ` - ` and a
/// free-text summary.
pub fn payload_is_resolved(payload: &str) -> bool {
    RESOLVED_PAYLOAD.is_match(payload)
}
