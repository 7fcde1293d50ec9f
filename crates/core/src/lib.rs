#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod mastery;
pub mod model;
pub mod time;

pub use catalog::{CatalogError, ContentCatalog};
pub use error::Error;
pub use mastery::{calculate_mastery, MasteryLevel};
pub use time::Clock;
