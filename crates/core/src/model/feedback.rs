use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::content::session_limits::MAX_COMMENT_LENGTH;
use crate::model::ids::FeedbackId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("comment too long: {len} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackKind {
    ThumbsUp,
    ThumbsDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackContext {
    Stage,
    Module,
    Quiz,
}

/// One entry in the append-only feedback log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    id: FeedbackId,
    timestamp: DateTime<Utc>,
    kind: FeedbackKind,
    context: FeedbackContext,
    context_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl FeedbackEntry {
    /// Creates a feedback entry, trimming and validating the comment.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::CommentTooLong` if the trimmed comment
    /// exceeds the character limit.
    pub fn new(
        kind: FeedbackKind,
        context: FeedbackContext,
        context_id: impl Into<String>,
        comment: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, FeedbackError> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        if let Some(comment) = comment {
            let len = comment.chars().count();
            if len > MAX_COMMENT_LENGTH {
                return Err(FeedbackError::CommentTooLong { len });
            }
        }

        Ok(Self {
            id: FeedbackId::generate(),
            timestamp,
            kind,
            context,
            context_id: context_id.into(),
            comment: comment.map(str::to_string),
        })
    }

    #[must_use]
    pub fn id(&self) -> FeedbackId {
        self.id
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn kind(&self) -> FeedbackKind {
        self.kind
    }

    #[must_use]
    pub fn context(&self) -> FeedbackContext {
        self.context
    }

    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn test_comment_is_trimmed() {
        let entry = FeedbackEntry::new(
            FeedbackKind::ThumbsUp,
            FeedbackContext::Module,
            "foundations-1",
            Some("  clear explanation  "),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(entry.comment(), Some("clear explanation"));
    }

    #[test]
    fn test_blank_comment_becomes_none() {
        let entry = FeedbackEntry::new(
            FeedbackKind::ThumbsDown,
            FeedbackContext::Quiz,
            "quiz-1",
            Some("   "),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(entry.comment(), None);
    }

    #[test]
    fn test_comment_length_limit() {
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        let err = FeedbackEntry::new(
            FeedbackKind::ThumbsUp,
            FeedbackContext::Stage,
            "foundations",
            Some(&long),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, FeedbackError::CommentTooLong { .. }));

        let at_limit = "x".repeat(MAX_COMMENT_LENGTH);
        assert!(
            FeedbackEntry::new(
                FeedbackKind::ThumbsUp,
                FeedbackContext::Stage,
                "foundations",
                Some(&at_limit),
                fixed_now(),
            )
            .is_ok()
        );
    }
}
