//! Service layer for the learning platform.
//!
//! Services own the rules; state lives in the injected [`storage`]
//! gateway and content lives in an immutable [`learner_core::ContentCatalog`].
//! Nothing in this crate touches globals, so callers can run any number of
//! independent sessions side by side.

#![forbid(unsafe_code)]

mod analytics_service;
mod app_services;
mod error;
mod feedback_service;
mod learner_service;
mod progression;
mod quiz_service;

pub use analytics_service::{
    AnalyticsService, EngagementMetrics, Milestone, QuizPerformance, SessionAnalytics,
    StageAnalytics,
};
pub use app_services::AppServices;
pub use error::{AnalyticsError, FeedbackServiceError, LearnerError, QuizError};
pub use feedback_service::{FeedbackService, FeedbackStats};
pub use learner_service::{LearnerService, ProgressSummary};
pub use progression::ProgressionService;
pub use quiz_service::{AttemptValidation, ConceptTally, QuizService, QuizStats};

pub use learner_core::Clock;

//
// ─── TEST FIXTURES ─────────────────────────────────────────────────────────────
//
