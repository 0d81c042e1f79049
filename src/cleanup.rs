//! Member cleanup: which members to delete and what happened to each.

use std::fmt;

use ghost_admin_types::Member;

/// Address kept by default when cleaning up members.
pub const DEFAULT_PRESERVED_EMAIL: &str = "jonathan.pares@gmail.com";

/// Members to delete, in server order, skipping the preserved address.
pub fn select_for_deletion<'a>(members: &'a [Member], preserved: &str) -> Vec<&'a Member> {
    let preserved = preserved.to_lowercase();
    members
        .iter()
        .filter(|member| member.email.to_lowercase() != preserved)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFailure {
    /// The server answered with a non-success status.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
}

impl fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Transport(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed(DeleteFailure),
}

/// Result of one member deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDeletion {
    pub id: String,
    pub email: String,
    pub outcome: DeleteOutcome,
}

impl MemberDeletion {
    pub fn is_deleted(&self) -> bool {
        matches!(self.outcome, DeleteOutcome::Deleted)
    }
}

impl fmt::Display for MemberDeletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            DeleteOutcome::Deleted => write!(f, "Member deleted: {}", self.email),
            DeleteOutcome::Failed(failure) => {
                write!(f, "Error deleting {}: {failure}", self.email)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    deletions: Vec<MemberDeletion>,
}

impl CleanupReport {
    pub fn new(deletions: Vec<MemberDeletion>) -> Self {
        Self { deletions }
    }

    pub fn deletions(&self) -> &[MemberDeletion] {
        &self.deletions
    }

    pub fn targeted_count(&self) -> usize {
        self.deletions.len()
    }

    pub fn deleted_count(&self) -> usize {
        self.deletions.iter().filter(|d| d.is_deleted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.targeted_count() - self.deleted_count()
    }
}
