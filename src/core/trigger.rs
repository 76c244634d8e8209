//! Trigger model - decides whether an incoming repository event starts a run

use serde::{Deserialize, Serialize};

/// Kind of repository event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A commit was pushed to a branch
    Push,
    /// A pull request was opened or updated
    PullRequest,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
        }
    }
}

/// An incoming repository event, as delivered by the hosting scheduler
///
/// Immutable once constructed; a run records the event it was created for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoEvent {
    /// Event kind
    pub kind: EventKind,

    /// Branch the event occurred on
    pub branch: String,

    /// Commit SHA the event points at (if known)
    pub commit: Option<String>,
}

impl RepoEvent {
    pub fn new(kind: EventKind, branch: impl Into<String>) -> Self {
        Self {
            kind,
            branch: branch.into(),
            commit: None,
        }
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }
}

/// A configured event/branch filter
///
/// Push and pull-request triggers are configured independently; an event
/// matches when both the kind and the branch watch-list agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    /// Event kind this trigger watches
    pub event: EventKind,

    /// Branches this trigger watches
    pub branches: Vec<String>,
}

impl Trigger {
    /// Check whether an incoming event matches this trigger
    pub fn matches(&self, event: &RepoEvent) -> bool {
        self.event == event.kind && self.branches.iter().any(|b| b == &event.branch)
    }
}
