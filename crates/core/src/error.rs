use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::attempt::AttemptError;
use crate::model::content::ContentError;
use crate::model::feedback::FeedbackError;
use crate::model::ids::ParseIdError;

/// Umbrella error for the core domain crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
