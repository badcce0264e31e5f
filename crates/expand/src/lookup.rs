use thiserror::Error;

/// One issue returned by a search collaborator. The expansion protocol only
/// splices `key` and `summary` into the replacement token; the remaining
/// fields are carried for hosts that render richer previews.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueResult {
    pub key: String,
    pub summary: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub url: Option<String>,
}

impl IssueResult {
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            status: None,
            priority: None,
            url: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Failures surfaced by a search collaborator. An empty result list is not
/// an error.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("issue lookup client is not configured")]
    Unavailable,
    #[error("{0}")]
    Backend(String),
}

/// Search collaborator consumed by the expansion protocol. Implementations
/// wrap whatever backend the host has configured; results come back in the
/// backend's ranking order.
pub trait IssueSearcher {
    fn search_issues(&self, term: &str) -> Result<Vec<IssueResult>, LookupError>;
}

/// In-memory searcher backed by a fixed issue table. Serves as the fixture
/// implementation for tests and for batch tooling that resolves placeholders
/// from a prepared data set.
#[derive(Debug, Default)]
pub struct StaticIssueSearcher {
    issues: Vec<IssueResult>,
}

impl StaticIssueSearcher {
    pub fn new(issues: Vec<IssueResult>) -> Self {
        Self { issues }
    }

    pub fn push(&mut self, issue: IssueResult) {
        self.issues.push(issue);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl IssueSearcher for StaticIssueSearcher {
    fn search_issues(&self, term: &str) -> Result<Vec<IssueResult>, LookupError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .issues
            .iter()
            .filter(|issue| {
                let summary = issue.summary.to_lowercase();
                issue.key.to_lowercase() == needle
                    || summary.contains(&needle)
                    || needle.split_whitespace().any(|word| summary.contains(word))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> StaticIssueSearcher {
        StaticIssueSearcher::new(vec![
            IssueResult::new("MU-123", "Fix user login issue").with_status("Open"),
            IssueResult::new("MU-200", "Login page styling"),
            IssueResult::new("OPS-9", "Rotate credentials"),
        ])
    }

    #[test]
    fn search_matches_keys_case_insensitively() {
        let results = fixture().search_issues("mu-123").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "MU-123");
    }

    #[test]
    fn search_matches_summary_substrings() {
        let results = fixture().search_issues("login").unwrap();
        let keys: Vec<_> = results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["MU-123", "MU-200"]);
    }

    #[test]
    fn multi_word_terms_match_on_any_word() {
        let results = fixture().search_issues("login bug").unwrap();
        let keys: Vec<_> = results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["MU-123", "MU-200"]);
    }

    #[test]
    fn empty_terms_return_no_results() {
        assert!(fixture().search_issues("   ").unwrap().is_empty());
    }
}
